//! 变更通知的订阅者集合
//!
//! 分发期间不持有任何借用：订阅者可以回读引擎、再次修改筛选，甚至增删订阅。
//! 分发过程中产生的新事件排队，由最外层的分发循环依次送出。

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::engine::EngineEvent;

/// 订阅令牌
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

type Listener = Box<dyn FnMut(&EngineEvent)>;

#[derive(Default)]
struct Inner {
    entries: Vec<(ListenerId, Listener)>,
    next_id: u64,
    queue: VecDeque<EngineEvent>,
    dispatching: bool,
    /// 分发期间被取消的订阅
    removed: Vec<ListenerId>,
}

#[derive(Default)]
pub struct Listeners {
    inner: RefCell<Inner>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, Box::new(listener)));
        id
    }

    /// 取消订阅；分发期间调用时在本轮结束后生效
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if id.0 >= inner.next_id || inner.removed.contains(&id) {
            return false;
        }
        let before = inner.entries.len();
        inner.entries.retain(|(listener_id, _)| *listener_id != id);
        if inner.entries.len() != before {
            return true;
        }
        if inner.dispatching {
            inner.removed.push(id);
            return true;
        }
        false
    }

    /// 依次把事件送给所有订阅者
    pub fn dispatch<I>(&self, events: I)
    where
        I: IntoIterator<Item = EngineEvent>,
    {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.extend(events);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        loop {
            let (event, mut current) = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.pop_front() {
                    Some(event) => (event, std::mem::take(&mut inner.entries)),
                    None => {
                        inner.dispatching = false;
                        inner.removed.clear();
                        break;
                    }
                }
            };

            for (id, listener) in current.iter_mut() {
                if self.inner.borrow().removed.contains(id) {
                    continue;
                }
                listener(&event);
            }

            let mut inner = self.inner.borrow_mut();
            let removed = std::mem::take(&mut inner.removed);
            current.retain(|(id, _)| !removed.contains(id));
            let added = std::mem::take(&mut inner.entries);
            current.extend(added);
            inner.entries = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let listeners = Listeners::new();
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let id = listeners.subscribe(move |_| sink.set(sink.get() + 1));

        listeners.dispatch([EngineEvent::ResultsChanged]);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.dispatch([EngineEvent::ResultsChanged]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn events_raised_during_dispatch_are_delivered_in_order() {
        let listeners = Rc::new(Listeners::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let weak = Rc::downgrade(&listeners);
        let sink = Rc::clone(&seen);
        listeners.subscribe(move |event| {
            sink.borrow_mut().push(*event);
            if *event == EngineEvent::ResultsChanged {
                if let Some(listeners) = weak.upgrade() {
                    listeners.dispatch([EngineEvent::PageChanged { page: 2, scroll_into_view: true }]);
                }
            }
        });

        listeners.dispatch([EngineEvent::ResultsChanged]);
        assert_eq!(
            *seen.borrow(),
            vec![
                EngineEvent::ResultsChanged,
                EngineEvent::PageChanged { page: 2, scroll_into_view: true },
            ]
        );
    }

    #[test]
    fn listeners_may_unsubscribe_themselves_and_add_others() {
        let listeners = Rc::new(Listeners::new());
        let late = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&listeners);
        let late_sink = Rc::clone(&late);
        let own_id = Rc::new(Cell::new(None));
        let own = Rc::clone(&own_id);
        let id = listeners.subscribe(move |_| {
            let Some(listeners) = weak.upgrade() else { return };
            if let Some(id) = own.take() {
                assert!(listeners.unsubscribe(id));
                let sink = Rc::clone(&late_sink);
                listeners.subscribe(move |_| sink.set(sink.get() + 1));
            }
        });
        own_id.set(Some(id));

        listeners.dispatch([EngineEvent::ResultsChanged]);
        listeners.dispatch([EngineEvent::ResultsChanged, EngineEvent::ResultsChanged]);
        assert_eq!(late.get(), 2);
        assert!(!listeners.unsubscribe(id));
    }
}
