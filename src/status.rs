use std::cell::RefCell;
use std::rc::Rc;

use crate::counter::{Count, Policy};
use crate::host::{Document, DocumentKind, EventHub, EventKind, HostEvent, Subscription};

/// 状态显示面: 宿主提供的一小块文字显示区域.
///
/// 释放即 [`Drop`], 没有单独的 dispose 方法.
pub trait StatusDisplay {
    fn set_text(&mut self, text: String);
    fn show(&mut self);
    fn hide(&mut self);
}

/// 统计指示的两种状态.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ReportState {
    /// 没有活动文档, 或者活动文档类型不在统计范围内.
    Hidden,
    /// 正常显示统计结果.
    Visible(Count),
}

/// 持有状态显示面, 根据活动文档重算统计并决定显示与否.
pub struct CountReporter<S: StatusDisplay> {
    display: S,
    policy: Policy,
    accepted: Vec<DocumentKind>,
    state: ReportState,
}

impl<S: StatusDisplay> CountReporter<S> {
    pub fn new(display: S, policy: Policy, accepted: Vec<DocumentKind>) -> CountReporter<S> {
        CountReporter {
            display,
            policy,
            accepted,
            state: ReportState::Hidden,
        }
    }

    /// 对照活动文档重新统计一次.
    ///
    /// 同步完成, 不缓存任何文本, 每次都对全文重算.
    pub fn update(&mut self, document: Option<&Document>) -> ReportState {
        let new_state = match document {
            Some(document) if self.accepted.contains(document.kind()) => {
                let count = self.policy.count(&document.text());
                self.display.set_text(count.to_string());
                self.display.show();
                ReportState::Visible(count)
            }
            _ => {
                self.display.hide();
                ReportState::Hidden
            }
        };
        if new_state != self.state {
            log::debug!("status report: {:?} -> {:?}", self.state, new_state);
        }
        self.state = new_state;
        self.state
    }

    pub fn state(&self) -> ReportState {
        self.state
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut S {
        &mut self.display
    }
}

impl<S: StatusDisplay> Drop for CountReporter<S> {
    fn drop(&mut self) {
        // 卸载时让出显示面.
        self.display.hide();
    }
}

/// 把 [`CountReporter`] 挂到宿主事件上: 光标变化和活动文档切换都触发重算.
///
/// drop 掉 watcher 就解除全部订阅.
pub struct CountWatcher {
    _subscriptions: Vec<Subscription>,
}

impl CountWatcher {
    pub fn attach<S: StatusDisplay + 'static>(
        hub: &EventHub,
        reporter: Rc<RefCell<CountReporter<S>>>,
    ) -> CountWatcher {
        let subscriptions = [EventKind::SelectionChanged, EventKind::ActiveDocumentChanged]
            .into_iter()
            .map(|kind| {
                let reporter = Rc::clone(&reporter);
                hub.subscribe(
                    kind,
                    Box::new(move |event: &HostEvent| {
                        reporter.borrow_mut().update(event.document());
                    }),
                )
            })
            .collect();
        CountWatcher { _subscriptions: subscriptions }
    }
}
