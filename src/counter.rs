use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error;
use crate::CharsCount;

/// 不计入字数的字符: 所有空白字符和标题记号 `#`.
static IGNORED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s#]").unwrap());
/// ruby 注音范围, 连同括号一起去除.
///
/// # Notice
///
/// `.` 不匹配换行, 但 [`IGNORED_CHARS`] 先去掉了空白,
/// 所以跨行的注音范围到这一步已经被拼起来了, 仍然会被去除.
static RUBY_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"《.+?》").unwrap());
/// ruby 起始记号, 半角和全角两种写法.
static RUBY_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|｜]").unwrap());
/// 汉字: CJK 统一表意文字区, 外加叠字符号 々 和 〻.
static KANJI_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{4E00}-\x{9FFF}\x{3005}\x{303B}]").unwrap());

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub enum Policy {
    /// 去掉空白, `#`, 注音范围和注音记号之后, 统计剩下的字符数.
    #[default]
    Chars,
    /// 逐行统计非 ASCII 字符数, 跳过以 `#` 开头的行.
    NonAscii,
    /// 在 [`Policy::Chars`] 的基础上额外统计汉字数和汉字占比.
    KanjiRatio,
}

impl Policy {
    /// 解析策略名, 用于命令行参数.
    ///
    /// # Errors
    ///
    /// - [`error::Error::UnknownPolicy`]: 名字不在 chars / ascii / kanji 之中.
    pub fn from_name(name: &str) -> error::Result<Policy> {
        match name {
            "chars" => Ok(Policy::Chars),
            "ascii" => Ok(Policy::NonAscii),
            "kanji" => Ok(Policy::KanjiRatio),
            _ => Err(error::Error::UnknownPolicy { name: name.to_string() }),
        }
    }

    /// 对整篇文本执行统计.
    pub fn count(&self, text: &str) -> Count {
        match self {
            Policy::Chars => Count { chars: stripped_chars(text), kanji: None },
            Policy::NonAscii => Count { chars: non_ascii_chars(text), kanji: None },
            Policy::KanjiRatio => Count {
                chars: stripped_chars(text),
                kanji: Some(kanji_chars(text)),
            },
        }
    }
}

/// 一次统计的结果.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Count {
    /// 计入的字符数.
    pub chars: usize,
    /// 汉字数, 只有 [`Policy::KanjiRatio`] 会填.
    pub kanji: Option<usize>,
}

impl Count {
    /// 汉字占比, 四舍五入到整数百分比.
    ///
    /// 字符数为 0 时直接返回 0, 避免除以零.
    pub fn kanji_percent(&self) -> Option<u32> {
        self.kanji.map(|kanji| {
            if self.chars == 0 {
                0
            } else {
                (kanji as f64 / self.chars as f64 * 100.0).round() as u32
            }
        })
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kanji_percent() {
            Some(percent) => write!(f, "{}文字 漢字{}%", self.chars, percent),
            None => write!(f, "{}文字", self.chars),
        }
    }
}

/// 去掉空白, `#`, 注音范围和注音记号之后统计剩下的字符数.
///
/// 三次替换的顺序是有讲究的, 见 [`RUBY_SPAN`].
pub fn stripped_chars(text: &str) -> usize {
    let text = IGNORED_CHARS.replace_all(text, "");
    let text = RUBY_SPAN.replace_all(&text, "");
    let text = RUBY_MARKS.replace_all(&text, "");
    text.chars_count()
}

/// 逐行统计非 ASCII 字符数.
///
/// 首字符是 `#` 的行整行不计, 空行没有首字符, 不跳过 (反正贡献是 0).
pub fn non_ascii_chars(text: &str) -> usize {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.chars().filter(|c| !c.is_ascii()).count())
        .sum()
}

/// 统计全文中的汉字数, 不做任何去除.
pub fn kanji_chars(text: &str) -> usize {
    KANJI_CHARS.find_iter(text).count()
}
