//! Lumen Core Runtime
//!
//! Foundational primitives shared by the Lumen engine crates:
//!
//! - **Task Queue**: A single UI-thread queue that serializes completions
//!   posted from background work, cancellable per target object
//! - **Color**: Linear RGBA color values
//! - **Locking**: Poison-tolerant mutex access
//!
//! # Example
//!
//! ```rust
//! use lumen_core::{TaskQueue, TaskTarget};
//!
//! let queue = TaskQueue::new();
//! let target = TaskTarget::new(7);
//!
//! queue.add_task(target, || println!("runs on the UI thread"));
//! queue.add_task(target, || println!("never runs"));
//!
//! // Teardown of the target drops everything still queued for it
//! assert_eq!(queue.remove_all_tasks_for_object(target), 2);
//! assert_eq!(queue.run_pending(), 0);
//! ```

pub mod color;
pub mod sync;
pub mod task;

pub use color::Color;
pub use sync::lock;
pub use task::{TaskQueue, TaskTarget};
