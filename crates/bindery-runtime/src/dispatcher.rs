#![forbid(unsafe_code)]

//! UI-thread dispatcher.
//!
//! Any thread may schedule a zero-argument task through a [`DispatchHandle`];
//! the thread owning the [`Dispatcher`] runs the tasks in enqueue order.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──enqueue──▶ Signaled ──drain──▶ Draining ──queue empty──▶ Idle
//!                        ▲                    │
//!                        └──── enqueue ───────┘ (picked up by the same drain)
//! ```
//!
//! # Invariants
//!
//! 1. Every accepted task runs exactly once, in enqueue order.
//! 2. Tasks run only on the thread that owns the `Dispatcher`. The type is
//!    `!Send`, so this holds at compile time.
//! 3. The queue lock is taken for every pop and never held while a task
//!    runs. The empty check and the switch to `Idle` happen under the same
//!    lock as the pop, so an enqueue racing with the end of a drain is either
//!    popped by that drain or leaves the dispatcher `Signaled`.
//! 4. A drain started from inside a running task returns 0; the outer drain
//!    picks the work up. The same holds for [`Dispatcher::wait_and_drain`]
//!    and [`Dispatcher::run_until_closed`], which return without waiting.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Task panics | caught, logged at `error`, drain continues |
//! | Enqueue after [`DispatchHandle::close`] | `Err(DispatchError::Closed)`, task dropped |
//! | Poisoned queue lock | recovered with `into_inner`, queue contents intact |

use std::cell::Cell;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Work scheduled onto the UI thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchState {
    /// Queue empty, no pending wake.
    Idle,
    /// A task was enqueued while idle.
    Signaled,
    /// The UI thread is consuming the queue.
    Draining,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatcher is closed")]
    Closed,
}

struct Queue {
    tasks: VecDeque<Task>,
    state: DispatchState,
    closed: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, task: Task) -> Result<(), DispatchError> {
        let mut queue = self.lock();
        if queue.closed {
            return Err(DispatchError::Closed);
        }
        queue.tasks.push_back(task);
        if queue.state == DispatchState::Idle {
            queue.state = DispatchState::Signaled;
        }
        let pending = queue.tasks.len();
        drop(queue);
        self.wake.notify_one();
        tracing::trace!(pending, "task enqueued");
        Ok(())
    }
}

/// Cross-thread handle for scheduling work on the UI thread.
#[derive(Clone)]
pub struct DispatchHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DispatchHandle {
    /// Schedule `task` on the UI thread.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Closed`] after [`close`](Self::close); the task is
    /// dropped without running.
    pub fn run_on_ui_thread(&self, task: impl FnOnce() + Send + 'static) -> Result<(), DispatchError> {
        self.shared.enqueue(Box::new(task))
    }

    /// Stop accepting tasks and wake the UI thread. Tasks already accepted
    /// still run.
    pub fn close(&self) {
        let mut queue = self.shared.lock();
        if !queue.closed {
            queue.closed = true;
            tracing::debug!(pending = queue.tasks.len(), "dispatcher closed");
        }
        drop(queue);
        self.shared.wake.notify_all();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock().tasks.len()
    }
}

/// Consumer side of the dispatch queue, owned by the UI thread.
pub struct Dispatcher {
    shared: Arc<Shared>,
    draining: Cell<bool>,
    _ui_thread: PhantomData<Rc<()>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}

struct DrainFlag<'a>(&'a Cell<bool>);

impl Drop for DrainFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Dispatcher {
    /// A dispatcher owned by the calling thread.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    tasks: VecDeque::new(),
                    state: DispatchState::Idle,
                    closed: false,
                }),
                wake: Condvar::new(),
            }),
            draining: Cell::new(false),
            _ui_thread: PhantomData,
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Schedule `task` from the UI thread itself. It runs on the next drain.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Closed`] after close.
    pub fn run_on_ui_thread(&self, task: impl FnOnce() + Send + 'static) -> Result<(), DispatchError> {
        self.shared.enqueue(Box::new(task))
    }

    /// Run queued tasks until the queue is empty at the moment of the check.
    /// Returns the number of tasks run.
    pub fn drain(&self) -> usize {
        if self.draining.replace(true) {
            tracing::trace!("nested drain ignored");
            return 0;
        }
        let _flag = DrainFlag(&self.draining);
        let mut ran = 0;
        loop {
            let task = {
                let mut queue = self.shared.lock();
                match queue.tasks.pop_front() {
                    Some(task) => {
                        queue.state = DispatchState::Draining;
                        task
                    }
                    None => {
                        queue.state = DispatchState::Idle;
                        break;
                    }
                }
            };
            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                tracing::error!(index = ran, "dispatched task panicked");
            }
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "drain complete");
        }
        ran
    }

    /// Block until a task arrives, the dispatcher closes, or `timeout`
    /// expires; then drain.
    pub fn wait_and_drain(&self, timeout: Duration) -> usize {
        if self.draining.get() {
            return 0;
        }
        {
            let queue = self.shared.lock();
            let _ = self
                .shared
                .wake
                .wait_timeout_while(queue, timeout, |q| q.tasks.is_empty() && !q.closed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.drain()
    }

    /// Drain as tasks arrive until the dispatcher is closed and the queue is
    /// empty. `idle` bounds each wait. Returns the total number of tasks run.
    ///
    /// Called from inside a running task, returns 0 at once: the enclosing
    /// loop owns the queue and keeps running.
    pub fn run_until_closed(&self, idle: Duration) -> usize {
        if self.draining.get() {
            tracing::trace!("nested dispatch loop ignored");
            return 0;
        }
        let mut total = 0;
        loop {
            total += self.wait_and_drain(idle);
            let queue = self.shared.lock();
            if queue.closed && queue.tasks.is_empty() {
                break;
            }
        }
        tracing::debug!(total, "dispatch loop finished");
        total
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.shared.lock().state
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}
