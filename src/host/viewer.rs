use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_width::UnicodeWidthChar;

use crate::counter::Policy;
use crate::error;
use crate::host::commands::CommandRegistry;
use crate::host::document::{Document, DocumentKind};
use crate::host::hub::{EventHub, EventKind, HostEvent};
use crate::host::screen::{clip_to_width, Location, Screen, Size};
use crate::host::statusbar::StatusBar;
use crate::status::{CountReporter, CountWatcher};
use crate::CharsCount;

/// 手动触发一次统计刷新的命令名, 绑在 Ctrl-R 上.
pub const UPDATE_STATUS_COMMAND: &str = "update-status";

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
enum State {
    Running,
    Exiting,
}

/// caret 的各种移动方式.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum CaretMove {
    Up,
    Down,
    Left,
    Right,
    StartOfLine,
    EndOfLine,
}

impl TryFrom<KeyCode> for CaretMove {
    type Error = ();

    fn try_from(value: KeyCode) -> Result<Self, Self::Error> {
        Ok(match value {
            KeyCode::Left => CaretMove::Left,
            KeyCode::Right => CaretMove::Right,
            KeyCode::Up => CaretMove::Up,
            KeyCode::Down => CaretMove::Down,
            KeyCode::Home => CaretMove::StartOfLine,
            KeyCode::End => CaretMove::EndOfLine,
            _ => Err(())?,
        })
    }
}

#[derive(Debug, Default)]
pub struct ViewerBuildConfig {
    /// 要打开的文件, 第一个是初始活动文档, 可以为空.
    pub files: Vec<PathBuf>,
    /// 字数统计策略.
    pub policy: Policy,
    /// 把纯文本文档也纳入统计范围, 默认只统计 markdown.
    pub accept_plain_text: bool,
}

pub struct Viewer {
    screen: Screen,
    documents: Vec<Document>,
    /// 活动文档在 documents 中的下标, 没有活动文档时为 None.
    active: Option<usize>,
    /// caret 位置, x 按字符数而不是显示宽度.
    caret: Location,
    /// 纵向滚动偏移.
    scroll: usize,
    hub: EventHub,
    commands: CommandRegistry,
    reporter: Rc<RefCell<CountReporter<StatusBar>>>,
    _watcher: CountWatcher,
    state: State,
    /// 文本区域尺寸, 最底一行留给状态条.
    text_area: Size,
    need_printing: bool,
}

impl Viewer {
    fn panic_handler(_info: &std::panic::PanicHookInfo) {
        // panic 输出前必须先退出替代屏幕, 否则信息全丢在替代屏幕里看不到.
        let _ = Screen::new().destruct();
        println!("{} error.", crate::CARGO_PKG_NAME);
    }

    pub fn build(config: &ViewerBuildConfig) -> error::Result<Viewer> {
        let raw_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            Viewer::panic_handler(info);
            raw_hook(info);
        }));

        // 加载放在进入 raw mode 之前, 报错还能正常打印出来.
        let mut documents = Vec::new();
        for path in &config.files {
            documents.push(Document::load(path)?);
        }
        let active = if documents.is_empty() { None } else { Some(0) };

        let mut accepted = vec![DocumentKind::Markdown];
        if config.accept_plain_text {
            accepted.push(DocumentKind::PlainText);
        }
        let reporter = Rc::new(RefCell::new(CountReporter::new(
            StatusBar::new(),
            config.policy,
            accepted,
        )));

        let hub = EventHub::new();
        let watcher = CountWatcher::attach(&hub, Rc::clone(&reporter));

        let mut commands = CommandRegistry::new();
        {
            let reporter = Rc::clone(&reporter);
            commands.register(
                UPDATE_STATUS_COMMAND,
                Box::new(move |document| {
                    reporter.borrow_mut().update(document);
                }),
            );
        }

        let mut screen = Screen::new();
        screen.initialize()?;
        let screen_size = screen.size()?;

        let mut viewer = Viewer {
            screen,
            documents,
            active,
            caret: Location::default(),
            scroll: 0,
            hub,
            commands,
            reporter,
            _watcher: watcher,
            state: State::Running,
            text_area: Size::default(),
            need_printing: true,
        };
        viewer.layout(screen_size);
        // 启动时先显示一次, 不等第一个事件.
        let document = active_document(&viewer.documents, viewer.active);
        viewer.reporter.borrow_mut().update(document);
        Ok(viewer)
    }

    pub fn run(&mut self) -> error::Result<()> {
        log::info!("viewer started with {} document(s)", self.documents.len());
        while self.state != State::Exiting {
            if self.need_repaint() {
                self.paint()?;
            }
            self.screen.flush()?;
            self.handle_event()?;
        }
        log::info!("viewer exiting");
        Ok(())
    }

    fn need_repaint(&self) -> bool {
        self.need_printing || self.reporter.borrow().display().need_printing()
    }

    fn paint(&mut self) -> error::Result<()> {
        self.screen.hide_cursor()?;
        if self.need_printing {
            self.screen.clear_screen()?;
            // 整屏清空把状态条也扫掉了.
            self.reporter.borrow_mut().display_mut().set_need_printing();
            for row in 0..self.text_area.height {
                if let Some(document) = active_document(&self.documents, self.active) {
                    if let Some(line) = document.line(row + self.scroll) {
                        self.screen.move_cursor_to(Location::new(0, row))?;
                        self.screen.print(clip_to_width(line, self.text_area.width))?;
                    }
                }
            }
            self.need_printing = false;
        }
        {
            let mut reporter = self.reporter.borrow_mut();
            let bar = reporter.display_mut();
            if bar.need_printing() {
                bar.print_to(&mut self.screen)?;
                bar.unset_need_printing();
            }
        }
        // 把 cursor 放回 caret 的位置, 没有活动文档就不显示 cursor.
        if let Some(document) = active_document(&self.documents, self.active) {
            let column = caret_column(document, self.caret)
                .min(self.text_area.width.saturating_sub(1));
            let row = self
                .caret
                .y
                .saturating_sub(self.scroll)
                .min(self.text_area.height.saturating_sub(1));
            self.screen.move_cursor_to(Location::new(column, row))?;
            self.screen.show_cursor()?;
        }
        Ok(())
    }

    fn handle_event(&mut self) -> error::Result<()> {
        let event = self.screen.read_event_blocking()?;
        match event {
            Event::Key(KeyEvent { code, kind, modifiers, .. }) => {
                if kind != KeyEventKind::Press {
                    return Ok(());
                }
                match code {
                    KeyCode::Char('q') if modifiers == KeyModifiers::CONTROL => {
                        self.state = State::Exiting;
                    }
                    KeyCode::Char('w') if modifiers == KeyModifiers::CONTROL => {
                        self.close_active_document();
                    }
                    KeyCode::Char('r') if modifiers == KeyModifiers::CONTROL => {
                        let document = active_document(&self.documents, self.active);
                        self.commands.execute(UPDATE_STATUS_COMMAND, document)?;
                    }
                    KeyCode::Tab => {
                        self.switch_document();
                    }
                    _ => {
                        if let Ok(caret_move) = CaretMove::try_from(code) {
                            self.move_caret(caret_move);
                        }
                    }
                }
            }
            Event::Resize(columns, rows) => {
                self.layout(Size::new(columns as usize, rows as usize));
            }
            _ => {}
        }
        Ok(())
    }

    /// 更改整体布局, 状态条固定占最底一行.
    fn layout(&mut self, size: Size) {
        self.text_area = Size::new(size.width, size.height.saturating_sub(1));
        self.reporter
            .borrow_mut()
            .display_mut()
            .configure_area(self.text_area.height, 0, size.width);
        self.scroll_to_caret();
        self.need_printing = true;
    }

    fn move_caret(&mut self, caret_move: CaretMove) {
        let moved = match active_document(&self.documents, self.active) {
            Some(document) => moved_caret(document, self.caret, caret_move),
            None => return,
        };
        if moved == self.caret {
            return;
        }
        self.caret = moved;
        self.scroll_to_caret();
        self.emit(EventKind::SelectionChanged);
        self.need_printing = true;
    }

    /// 轮换活动文档.
    fn switch_document(&mut self) {
        let count = self.documents.len();
        if count < 2 {
            return;
        }
        if let Some(idx) = self.active {
            self.active = Some((idx + 1) % count);
            self.caret = Location::default();
            self.scroll = 0;
            self.emit(EventKind::ActiveDocumentChanged);
            self.need_printing = true;
        }
    }

    /// 关掉活动文档, 关掉最后一个之后就没有活动文档了.
    fn close_active_document(&mut self) {
        if let Some(idx) = self.active {
            let closed = self.documents.remove(idx);
            log::info!("closed document {:?}", closed.name());
            self.active = if self.documents.is_empty() {
                None
            } else {
                Some(idx.min(self.documents.len() - 1))
            };
            self.caret = Location::default();
            self.scroll = 0;
            self.emit(EventKind::ActiveDocumentChanged);
            self.need_printing = true;
        }
    }

    fn emit(&self, kind: EventKind) {
        let document = active_document(&self.documents, self.active);
        self.hub.emit(&HostEvent::new(kind, document));
    }

    /// 调整滚动偏移, 让 caret 始终落在文本区域里.
    fn scroll_to_caret(&mut self) {
        if self.caret.y < self.scroll {
            self.scroll = self.caret.y;
        }
        let height = self.text_area.height.max(1);
        if self.caret.y >= self.scroll + height {
            self.scroll = self.caret.y + 1 - height;
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        // panic 的时候也会走到这里, 终端恢复不能少.
        let _ = self.screen.destruct();
        println!("{} closed.", crate::CARGO_PKG_NAME);
    }
}

fn active_document(documents: &[Document], active: Option<usize>) -> Option<&Document> {
    active.and_then(|idx| documents.get(idx))
}

/// caret 在终端上的列位置: caret 之前的字符按显示宽度累加.
fn caret_column(document: &Document, caret: Location) -> usize {
    match document.line(caret.y) {
        Some(line) => line
            .chars()
            .take(caret.x)
            .map(|c| c.width().unwrap_or(0))
            .sum(),
        None => 0,
    }
}

/// 算出 caret 移动之后的位置, 不越过文档边界.
fn moved_caret(document: &Document, caret: Location, caret_move: CaretMove) -> Location {
    let line_chars = |y: usize| document.line(y).map(|line| line.chars_count()).unwrap_or(0);
    let mut caret = caret;
    match caret_move {
        CaretMove::Left => {
            if caret.x > 0 {
                caret.x -= 1;
            } else if caret.y > 0 {
                // 行首继续向左, 回到上一行行末.
                caret.y -= 1;
                caret.x = line_chars(caret.y);
            }
        }
        CaretMove::Right => {
            if caret.x < line_chars(caret.y) {
                caret.x += 1;
            } else if caret.y + 1 < document.line_count() {
                caret.y += 1;
                caret.x = 0;
            }
        }
        CaretMove::Up => {
            if caret.y > 0 {
                caret.y -= 1;
                caret.x = caret.x.min(line_chars(caret.y));
            }
        }
        CaretMove::Down => {
            if caret.y + 1 < document.line_count() {
                caret.y += 1;
                caret.x = caret.x.min(line_chars(caret.y));
            }
        }
        CaretMove::StartOfLine => {
            caret.x = 0;
        }
        CaretMove::EndOfLine => {
            caret.x = line_chars(caret.y);
        }
    }
    caret
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_text("a.md", DocumentKind::Markdown, "# 表題\n本日は晴天\nend")
    }

    #[test]
    fn no_active_document() {
        assert!(active_document(&[], None).is_none());
        let documents = vec![doc()];
        assert!(active_document(&documents, None).is_none());
        assert!(active_document(&documents, Some(0)).is_some());
        assert!(active_document(&documents, Some(1)).is_none());
    }

    #[test]
    fn caret_walks_line_boundaries() {
        let doc = doc();
        // 行首向左回到上一行行末.
        let moved = moved_caret(&doc, Location::new(0, 1), CaretMove::Left);
        assert_eq!(moved, Location::new(4, 0));
        // 行末向右进入下一行行首.
        let moved = moved_caret(&doc, Location::new(5, 1), CaretMove::Right);
        assert_eq!(moved, Location::new(0, 2));
    }

    #[test]
    fn caret_clamps_to_shorter_lines() {
        let doc = doc();
        let moved = moved_caret(&doc, Location::new(5, 1), CaretMove::Up);
        assert_eq!(moved, Location::new(4, 0));
        let moved = moved_caret(&doc, Location::new(5, 1), CaretMove::Down);
        assert_eq!(moved, Location::new(3, 2));
    }

    #[test]
    fn caret_stops_at_document_edges() {
        let doc = doc();
        assert_eq!(
            moved_caret(&doc, Location::new(0, 0), CaretMove::Left),
            Location::new(0, 0)
        );
        assert_eq!(
            moved_caret(&doc, Location::new(3, 2), CaretMove::Right),
            Location::new(3, 2)
        );
        assert_eq!(
            moved_caret(&doc, Location::new(1, 2), CaretMove::Down),
            Location::new(1, 2)
        );
    }

    #[test]
    fn home_and_end() {
        let doc = doc();
        assert_eq!(
            moved_caret(&doc, Location::new(3, 1), CaretMove::StartOfLine),
            Location::new(0, 1)
        );
        assert_eq!(
            moved_caret(&doc, Location::new(0, 1), CaretMove::EndOfLine),
            Location::new(5, 1)
        );
    }

    #[test]
    fn caret_column_uses_display_width() {
        let doc = doc();
        // "本日は晴天" 每个字符占两列.
        assert_eq!(caret_column(&doc, Location::new(0, 1)), 0);
        assert_eq!(caret_column(&doc, Location::new(3, 1)), 6);
        // "# 表題" 混合半角和全角.
        assert_eq!(caret_column(&doc, Location::new(3, 0)), 4);
        // 不存在的行.
        assert_eq!(caret_column(&doc, Location::new(0, 9)), 0);
    }
}
