//! Multi-worker frame pipeline: dispatch, render in parallel, restore input order.

pub mod cancel;
pub mod scheduler;
