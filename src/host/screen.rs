use std::fmt::Display;
use std::io;
use std::io::Write;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{queue, Command};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub struct Location {
    /// 列.
    pub x: usize,
    /// 行.
    pub y: usize,
}

impl Location {
    pub fn new(x: usize, y: usize) -> Location {
        Location { x, y }
    }

    /// 截断转换, 终端尺寸不会超过 u16.
    pub fn as_u16(&self) -> (u16, u16) {
        (self.x as u16, self.y as u16)
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub fn new(width: usize, height: usize) -> Size {
        Size { width, height }
    }
}

/// 终端封装: 替代屏幕 + raw mode, 命令先排队, flush 才生效.
pub struct Screen {}

impl Screen {
    pub fn new() -> Screen {
        Screen {}
    }

    fn queue_command(&mut self, com: impl Command) -> io::Result<()> {
        queue!(io::stdout(), com)
    }

    pub fn initialize(&mut self) -> io::Result<()> {
        self.queue_command(EnterAlternateScreen)?;
        enable_raw_mode()?;
        Ok(())
    }

    /// 恢复终端.
    ///
    /// # Notice
    ///
    /// LeaveAlternateScreen 也是排队命令, 必须在 flush 之前入队, 不然不会生效.
    pub fn destruct(&mut self) -> io::Result<()> {
        self.queue_command(LeaveAlternateScreen)?;
        self.flush()?;
        disable_raw_mode()?;
        Ok(())
    }

    pub fn size(&self) -> io::Result<Size> {
        let (width, height) = terminal::size()?;
        Ok(Size::new(width as usize, height as usize))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.queue_command(Clear(ClearType::All))
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        self.queue_command(Hide)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        self.queue_command(Show)
    }

    pub fn move_cursor_to(&mut self, loc: Location) -> io::Result<()> {
        let (x, y) = loc.as_u16();
        self.queue_command(MoveTo(x, y))
    }

    pub fn print(&mut self, s: impl Display) -> io::Result<()> {
        self.queue_command(Print(s))
    }

    /// 阻塞读取一个终端事件, 见 [`event::read`].
    pub fn read_event_blocking(&mut self) -> io::Result<Event> {
        event::read()
    }
}

/// 按终端显示宽度截断字符串, 全角字符占两列.
///
/// 在字符边界截断, 放不下半个全角字符时宁可少占一列.
pub(crate) fn clip_to_width(s: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// 字符串的终端显示宽度.
pub(crate) fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}
