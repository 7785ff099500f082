use std::io;

use crate::host::screen::{clip_to_width, display_width, Location, Screen};
use crate::status::StatusDisplay;

/// 内容和状态条两端之间留的空白列数.
pub const HORIZONTAL_PADDING: usize = 1;

/// 内容在状态条中的停靠方式.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Packing {
    Left,
    Center,
    Right,
}

/// 单行状态条, 实现了 [`StatusDisplay`], 是查看器里真正的显示面.
///
/// 自己不直接碰终端, 只记住内容和脏标记, 由宿主在重绘阶段调用
/// [`StatusBar::print_to`].
#[derive(Debug)]
pub struct StatusBar {
    /// 显示行在终端中的行号.
    display_line: usize,
    /// 显示区域的起始列.
    display_start: usize,
    /// 显示区域的总宽度, 含两端空白.
    display_width: usize,
    content: String,
    packing: Packing,
    visible: bool,
    need_printing: bool,
}

impl StatusBar {
    pub fn new() -> StatusBar {
        StatusBar {
            display_line: 0,
            display_start: 0,
            display_width: 0,
            content: String::new(),
            packing: Packing::Left,
            visible: false,
            need_printing: false,
        }
    }

    pub fn set_packing(&mut self, packing: Packing) {
        if self.packing != packing {
            self.set_need_printing();
        }
        self.packing = packing;
    }

    /// 配置显示区域: 终端行号, 起始列, 总宽度.
    pub fn configure_area(&mut self, line: usize, start: usize, width: usize) {
        self.display_line = line;
        self.display_start = start;
        self.display_width = width;
        self.set_need_printing();
    }

    pub fn need_printing(&self) -> bool {
        self.need_printing
    }

    pub fn set_need_printing(&mut self) {
        self.need_printing = true;
    }

    /// 重绘完成之后由宿主调用.
    pub fn unset_need_printing(&mut self) {
        self.need_printing = false;
    }

    /// 计算内容的起始列, 内容已按内宽截断.
    fn packed_start(&self, used_width: usize) -> usize {
        match self.packing {
            Packing::Left => self.display_start + HORIZONTAL_PADDING,
            Packing::Center => {
                self.display_start + self.display_width.saturating_sub(used_width) / 2
            }
            Packing::Right => {
                self.display_start
                    + self.display_width.saturating_sub(HORIZONTAL_PADDING + used_width)
            }
        }
    }

    /// 把自己画到终端上, 隐藏状态只清空显示行.
    ///
    /// # Notice
    ///
    /// 画完之后 cursor 停在状态条上, 需要宿主自己挪回去.
    pub fn print_to(&self, screen: &mut Screen) -> io::Result<()> {
        // 先清空整个显示区域.
        screen.move_cursor_to(Location::new(self.display_start, self.display_line))?;
        screen.print(" ".repeat(self.display_width))?;
        if !self.visible {
            return Ok(());
        }

        let inner_width = self.display_width.saturating_sub(2 * HORIZONTAL_PADDING);
        let clipped = clip_to_width(&self.content, inner_width);
        let start = self.packed_start(display_width(clipped));
        screen.move_cursor_to(Location::new(start, self.display_line))?;
        screen.print(clipped)?;
        Ok(())
    }
}

impl StatusDisplay for StatusBar {
    fn set_text(&mut self, text: String) {
        if self.content != text {
            self.set_need_printing();
        }
        self.content = text;
    }

    fn show(&mut self) {
        if !self.visible {
            self.set_need_printing();
        }
        self.visible = true;
    }

    fn hide(&mut self) {
        if self.visible {
            self.set_need_printing();
        }
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(width: usize, packing: Packing) -> StatusBar {
        let mut bar = StatusBar::new();
        bar.configure_area(10, 0, width);
        bar.set_packing(packing);
        bar
    }

    #[test]
    fn packing_positions() {
        // "12文字" 显示宽度是 6.
        assert_eq!(bar(20, Packing::Left).packed_start(6), HORIZONTAL_PADDING);
        assert_eq!(bar(20, Packing::Center).packed_start(6), 7);
        assert_eq!(bar(20, Packing::Right).packed_start(6), 13);
    }

    #[test]
    fn packing_degrades_when_too_narrow() {
        // 区域比内容还窄时不能下溢.
        assert_eq!(bar(4, Packing::Center).packed_start(6), 0);
        assert_eq!(bar(4, Packing::Right).packed_start(6), 0);
    }

    #[test]
    fn dirty_flag_follows_changes() {
        let mut bar = bar(20, Packing::Left);
        bar.unset_need_printing();

        bar.set_text("5文字".to_string());
        assert!(bar.need_printing());
        bar.unset_need_printing();

        // 内容没变就不用重绘.
        bar.set_text("5文字".to_string());
        assert!(!bar.need_printing());

        bar.show();
        assert!(bar.need_printing());
        bar.unset_need_printing();
        bar.show();
        assert!(!bar.need_printing());
        bar.hide();
        assert!(bar.need_printing());
    }
}
