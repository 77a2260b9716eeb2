//! Shared-state wrappers
//!
//! Components of one session share state through `Arc<parking_lot::RwLock<T>>`.
//! Guards are never held across an `.await`.

use parking_lot::RwLock;
use std::sync::Arc;

pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_value() {
        let value = thread_safe_rw(1u32);
        let other = value.clone();
        *other.write() = 2;
        assert_eq!(*value.read(), 2);
    }
}
