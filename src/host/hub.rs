use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::host::document::Document;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum EventKind {
    /// 光标或选区位置变化.
    SelectionChanged,
    /// 活动文档切换, 包括变成没有活动文档.
    ActiveDocumentChanged,
}

/// 一次宿主事件, 携带发出时刻的活动文档.
pub struct HostEvent<'a> {
    kind: EventKind,
    document: Option<&'a Document>,
}

impl<'a> HostEvent<'a> {
    pub fn new(kind: EventKind, document: Option<&'a Document>) -> HostEvent<'a> {
        HostEvent { kind, document }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn document(&self) -> Option<&'a Document> {
        self.document
    }
}

pub type Handler = Box<dyn FnMut(&HostEvent)>;

struct Entry {
    id: usize,
    kind: EventKind,
    handler: Handler,
}

/// 事件枢纽.
///
/// # Notice
///
/// [`EventHub::emit`] 期间持有内部借用, 处理函数里不能再订阅或者取消订阅,
/// 否则会 panic. 处理函数都是跑完即归的同步调用.
#[derive(Default)]
pub struct EventHub {
    entries: Rc<RefCell<Vec<Entry>>>,
    next_id: Cell<usize>,
}

impl EventHub {
    pub fn new() -> EventHub {
        EventHub::default()
    }

    /// 订阅某一类事件, 返回的句柄 drop 时自动取消订阅.
    pub fn subscribe(&self, kind: EventKind, handler: Handler) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(Entry { id, kind, handler });
        Subscription {
            id,
            entries: Rc::downgrade(&self.entries),
        }
    }

    /// 按订阅顺序同步调用所有匹配的处理函数.
    pub fn emit(&self, event: &HostEvent) {
        log::debug!("emit {:?}", event.kind());
        let mut entries = self.entries.borrow_mut();
        for entry in entries.iter_mut() {
            if entry.kind == event.kind() {
                (entry.handler)(event);
            }
        }
    }

    #[cfg(test)]
    fn handler_count(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// 订阅句柄.
///
/// drop 或者调用 [`Subscription::dispose`] 时把处理函数从枢纽中摘除;
/// 枢纽先没了的话什么也不做.
pub struct Subscription {
    id: usize,
    entries: Weak<RefCell<Vec<Entry>>>,
}

impl Subscription {
    pub fn dispose(self) {
        // drop 就是全部动作.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(entries) = self.entries.upgrade() {
            entries.borrow_mut().retain(|entry| entry.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::document::DocumentKind;

    #[test]
    fn dispatches_only_matching_kind() {
        let hub = EventHub::new();
        let hits = Rc::new(Cell::new(0));
        let hits2 = Rc::clone(&hits);
        let _sub = hub.subscribe(
            EventKind::SelectionChanged,
            Box::new(move |_| hits2.set(hits2.get() + 1)),
        );

        hub.emit(&HostEvent::new(EventKind::SelectionChanged, None));
        hub.emit(&HostEvent::new(EventKind::ActiveDocumentChanged, None));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let hub = EventHub::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (Rc::clone(&order), Rc::clone(&order));
        let _a = hub.subscribe(
            EventKind::SelectionChanged,
            Box::new(move |_| first.borrow_mut().push("a")),
        );
        let _b = hub.subscribe(
            EventKind::SelectionChanged,
            Box::new(move |_| second.borrow_mut().push("b")),
        );

        hub.emit(&HostEvent::new(EventKind::SelectionChanged, None));
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn event_carries_document() {
        let hub = EventHub::new();
        let seen = Rc::new(RefCell::new(None));
        let seen2 = Rc::clone(&seen);
        let _sub = hub.subscribe(
            EventKind::ActiveDocumentChanged,
            Box::new(move |event: &HostEvent| {
                *seen2.borrow_mut() = event.document().map(|d| d.name().to_string());
            }),
        );

        let doc = Document::from_text("a.md", DocumentKind::Markdown, "晴天");
        hub.emit(&HostEvent::new(EventKind::ActiveDocumentChanged, Some(&doc)));
        assert_eq!(seen.borrow().as_deref(), Some("a.md"));
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let hub = EventHub::new();
        let sub = hub.subscribe(EventKind::SelectionChanged, Box::new(|_| {}));
        assert_eq!(hub.handler_count(), 1);
        drop(sub);
        assert_eq!(hub.handler_count(), 0);
    }

    #[test]
    fn dispose_is_drop() {
        let hub = EventHub::new();
        let sub = hub.subscribe(EventKind::SelectionChanged, Box::new(|_| {}));
        sub.dispose();
        assert_eq!(hub.handler_count(), 0);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = EventHub::new();
        let sub = hub.subscribe(EventKind::SelectionChanged, Box::new(|_| {}));
        drop(hub);
        drop(sub);
    }
}
