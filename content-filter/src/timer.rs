//! 可取消的定时器抽象与防抖
//!
//! 单线程协作式调度：任务只会在定时器触发时运行，`Debouncer` 保证同一时刻
//! 最多只有一个待执行任务。

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

/// 搜索输入的防抖间隔
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// 已调度任务的取消令牌
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// 定时器：延迟执行任务，并可通过令牌取消
pub trait Timer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle;

    /// 取消尚未执行的任务；已执行或未知的令牌直接忽略
    fn cancel(&self, handle: TimerHandle);
}

impl<T: Timer + ?Sized> Timer for Rc<T> {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: TimerHandle) {
        (**self).cancel(handle)
    }
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Box<dyn FnOnce()>>,
    deadlines: HashMap<u64, Duration>,
}

/// 手动推进的虚拟时钟定时器
///
/// 用于测试和非浏览器环境；克隆后共享同一个时钟。
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前虚拟时间
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// 待执行任务数
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// 推进时钟，依次执行所有到期任务
    ///
    /// 任务执行期间不持有内部借用，因此任务里可以再调度或取消。
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .queue
                    .keys()
                    .next()
                    .copied()
                    .filter(|(deadline, _)| *deadline <= target);
                match due {
                    Some(key) => {
                        inner.now = key.0;
                        inner.deadlines.remove(&key.1);
                        inner.queue.remove(&key)
                    }
                    None => None,
                }
            };
            match task {
                Some(task) => task(),
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = inner.now + delay;
        inner.queue.insert((deadline, id), task);
        inner.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut inner = self.inner.borrow_mut();
        if let Some(deadline) = inner.deadlines.remove(&handle.0) {
            inner.queue.remove(&(deadline, handle.0));
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserTimer;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{Timer, TimerHandle};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    struct Scheduled {
        _callback: Closure<dyn FnMut()>,
        fired: Rc<Cell<bool>>,
    }

    /// 基于 `window.setTimeout` / `clearTimeout` 的定时器
    #[derive(Default)]
    pub struct BrowserTimer {
        scheduled: RefCell<HashMap<i32, Scheduled>>,
    }

    impl BrowserTimer {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Timer for BrowserTimer {
        fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerHandle {
            // 已触发的回调在这里回收；正在执行的回调此时尚未标记，不会被释放
            self.scheduled.borrow_mut().retain(|_, s| !s.fired.get());

            let fired = Rc::new(Cell::new(false));
            let slot = Cell::new(Some(task));
            let fired_flag = Rc::clone(&fired);
            let callback = Closure::wrap(Box::new(move || {
                if let Some(task) = slot.take() {
                    task();
                }
                fired_flag.set(true);
            }) as Box<dyn FnMut()>);

            let id = web_sys::window().and_then(|window| {
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.as_ref().unchecked_ref(),
                        delay.as_millis().min(i32::MAX as u128) as i32,
                    )
                    .ok()
            });

            match id {
                Some(id) => {
                    self.scheduled.borrow_mut().insert(
                        id,
                        Scheduled { _callback: callback, fired },
                    );
                    TimerHandle(id as u32 as u64)
                }
                None => {
                    crate::console_warn!("setTimeout 调用失败，任务被丢弃");
                    TimerHandle(u64::MAX)
                }
            }
        }

        fn cancel(&self, handle: TimerHandle) {
            let Ok(id) = u32::try_from(handle.0) else {
                return;
            };
            let id = id as i32;
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(id);
            }
            self.scheduled.borrow_mut().remove(&id);
        }
    }
}

/// 防抖器：每次调用都会取消上一次尚未执行的任务并重新计时
pub struct Debouncer<T: Timer> {
    timer: T,
    delay: Duration,
    pending: Rc<Cell<Option<TimerHandle>>>,
}

impl<T: Timer> Debouncer<T> {
    pub fn new(timer: T, delay: Duration) -> Self {
        Self {
            timer,
            delay,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// 安排 `task` 在静默 `delay` 之后执行
    pub fn call<F: FnOnce() + 'static>(&self, task: F) {
        self.cancel();
        let pending = Rc::clone(&self.pending);
        let handle = self.timer.schedule(
            self.delay,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(handle));
    }

    /// 取消待执行的任务
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl<T: Timer> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
