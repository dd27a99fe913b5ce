//! UI-thread task queue
//!
//! Background work (downloads, file reads) never mutates consumer-visible
//! state directly. Instead it posts a completion task here, and the UI thread
//! drains the queue with [`TaskQueue::run_pending`]. Every task is tagged with
//! the object it targets so that object teardown can drop whatever is still
//! queued for it.

use crate::sync::lock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Identifies the object a queued task operates on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskTarget(u64);

impl TaskTarget {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u64 {
        self.0
    }
}

type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueuedTask {
    target: TaskTarget,
    task: Task,
}

/// Cloneable handle to the shared UI-thread task queue
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<QueuedTask>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task for the given target. Safe to call from any thread.
    pub fn add_task<F>(&self, target: TaskTarget, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        lock(&self.tasks).push_back(QueuedTask {
            target,
            task: Box::new(task),
        });
        tracing::trace!("Queued UI task for target {}", target.id());
    }

    /// Drop every queued task for `target` without running it.
    ///
    /// Returns the number of tasks removed. The removed closures are dropped
    /// after the queue lock is released, so a closure whose captured state
    /// tears down another queue user cannot deadlock the queue.
    pub fn remove_all_tasks_for_object(&self, target: TaskTarget) -> usize {
        let removed: Vec<QueuedTask> = {
            let mut tasks = lock(&self.tasks);
            let (removed, kept): (Vec<_>, Vec<_>) =
                tasks.drain(..).partition(|t| t.target == target);
            tasks.extend(kept);
            removed
        };

        let count = removed.len();
        if count > 0 {
            tracing::debug!(
                "Removed {} pending UI task(s) for target {}",
                count,
                target.id()
            );
        }
        drop(removed);
        count
    }

    /// Run the tasks that were queued when this call started, in FIFO order.
    ///
    /// Tasks queued while draining run on the next call. Returns the number of
    /// tasks executed.
    pub fn run_pending(&self) -> usize {
        let budget = self.len();
        let mut ran = 0;

        while ran < budget {
            let next = lock(&self.tasks).pop_front();
            let Some(queued) = next else {
                break;
            };
            (queued.task)();
            ran += 1;
        }

        ran
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        lock(&self.tasks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued tasks for one target
    pub fn pending_for(&self, target: TaskTarget) -> usize {
        lock(&self.tasks)
            .iter()
            .filter(|t| t.target == target)
            .count()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}
