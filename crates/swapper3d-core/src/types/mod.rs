//! Shared type aliases used across the workspace

pub mod aliases;

pub use aliases::{thread_safe_rw, ThreadSafeRw};
