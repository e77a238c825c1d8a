//! Lock-free primitives for handing values from the control loop to the
//! audio callback.
//!
//! Each value has exactly one writer. The writing side is documented on the
//! field that owns the primitive, not here.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Cache-line aligned atomic bool.
///
/// Used both as a state mirror (`set`/`get`) and as a one-shot request that the
/// reader consumes with [`take`](AtomicFlag::take).
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFlag {
    value: AtomicBool,
}

impl AtomicFlag {
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }

    /// Clears the flag and returns whether it was set.
    ///
    /// Two requests raised before the reader runs collapse into one.
    #[inline]
    pub fn take(&self) -> bool {
        self.value.swap(false, Ordering::AcqRel)
    }
}

impl Default for AtomicFlag {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Cache-line aligned atomic table index.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicIndex {
    value: AtomicUsize,
}

impl AtomicIndex {
    pub fn new(value: usize) -> Self {
        Self {
            value: AtomicUsize::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: usize) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicIndex {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_flag_take_consumes_once() {
        let flag = AtomicFlag::default();
        assert!(!flag.take());

        flag.set(true);
        flag.set(true);
        assert!(flag.take());
        assert!(!flag.take(), "second take must see the cleared flag");
    }

    #[test]
    fn test_index_cross_thread() {
        let index = Arc::new(AtomicIndex::new(0));
        let writer = Arc::clone(&index);

        thread::spawn(move || writer.set(3))
            .join()
            .expect("writer thread panicked");

        assert_eq!(index.get(), 3);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<AtomicFlag>(), 64);
        assert_eq!(std::mem::align_of::<AtomicIndex>(), 64);
    }
}
