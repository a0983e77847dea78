//! Garbage collection of network endpoints whose containers are gone.
//!
//! Two flows share one mutation primitive, [`Cleaner::delete_endpoint`]:
//!
//! - [`Cleaner::reconcile`] runs once at startup and removes endpoints of containers
//!   that exited or vanished while nobody was watching.
//! - [`Cleaner::watch`] then follows the runtime's event stream and removes the endpoints
//!   of pod sandboxes as soon as they are killed, die, stop or get destroyed.
//!
//! Both are safe to race against each other and against the CNI delete path: deleting
//! an endpoint that is already gone is a no-op.
mod delete;
mod reconcile;
mod watch;

#[cfg(test)]
mod fakes;

pub use reconcile::{Orphan, OrphanReason, SweepSummary, find_orphans};
pub use watch::WatchError;

/// Ties the registry, the local runtime and the address allocator together.
#[derive(Debug)]
pub struct Cleaner<R, C, A> {
    registry: R,
    runtime: C,
    allocator: A,
    hostname: String,
}

impl<R, C, A> Cleaner<R, C, A> {
    pub fn new(registry: R, runtime: C, allocator: A, hostname: impl Into<String>) -> Self {
        Self {
            registry,
            runtime,
            allocator,
            hostname: hostname.into(),
        }
    }
}
