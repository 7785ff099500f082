use std::fmt;
use std::fs;
use std::path::Path;

use crate::error;

/// 文档的内容类型标签, 从文件扩展名推断.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum DocumentKind {
    Markdown,
    PlainText,
    /// 其他类型, 保留扩展名以便日志输出.
    Other(String),
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> DocumentKind {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" => DocumentKind::Markdown,
            "txt" | "text" => DocumentKind::PlainText,
            other => DocumentKind::Other(other.to_string()),
        }
    }
}

/// 文档快照, 加载之后不再变化.
#[derive(Debug)]
pub struct Document {
    name: String,
    kind: DocumentKind,
    lines: Vec<String>,
}

impl Document {
    /// 从文件加载文档, 类型由扩展名决定.
    ///
    /// # Errors
    ///
    /// - [`error::Error::IOError`]: 文件读不出来.
    pub fn load(path: impl AsRef<Path>) -> error::Result<Document> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("(unnamed)")
            .to_string();
        log::info!("loaded document {:?} ({} bytes)", name, text.len());
        Ok(Document::from_text(name, DocumentKind::from_path(path), &text))
    }

    pub fn from_text(name: impl Into<String>, kind: DocumentKind, text: &str) -> Document {
        Document {
            name: name.into(),
            kind,
            lines: text
                .split('\n')
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    #[inline]
    pub fn line(&self, idx: usize) -> Option<&String> {
        self.lines.get(idx)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 全文, 行之间用 `\n` 连接.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a.md")), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_path(Path::new("a.MD")), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_path(Path::new("b.markdown")), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_path(Path::new("c.txt")), DocumentKind::PlainText);
        assert_eq!(
            DocumentKind::from_path(Path::new("d.rs")),
            DocumentKind::Other("rs".to_string())
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("Makefile")),
            DocumentKind::Other(String::new())
        );
    }

    #[test]
    fn lines_split_and_join() {
        let doc = Document::from_text("a.md", DocumentKind::Markdown, "# 表題\r\n本文\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(0).unwrap(), "# 表題");
        assert_eq!(doc.line(1).unwrap(), "本文");
        assert_eq!(doc.line(2).unwrap(), "");
        assert_eq!(doc.text(), "# 表題\n本文\n");
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join("mojibar_document_test.md");
        fs::write(&path, "本日は晴天\n").unwrap();
        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.kind(), &DocumentKind::Markdown);
        assert_eq!(doc.name(), "mojibar_document_test.md");
        assert_eq!(doc.line(0).unwrap(), "本日は晴天");
        fs::remove_file(&path).unwrap();
    }
}
