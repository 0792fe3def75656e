use std::ops::Range;

use crate::{Fault, StackKind, Value, fatal};

/// The shared register/local/argument area: a fixed-capacity array of
/// values partitioned into contiguous frames. Frame boundaries live in the
/// call stack; this type only manages the slots themselves.
///
/// Capacity is checked before any slot is touched, so an overflowing
/// reservation leaves no partial frame behind.
#[derive(Debug, Clone)]
pub struct DataStack {
    slots: Vec<Value>,
    top: usize,
}

#[derive(Debug, Clone)]
pub struct DataStackCreateInfo {
    pub size: usize,
}

impl Default for DataStackCreateInfo {
    fn default() -> Self {
        Self { size: 1024 }
    }
}

impl DataStack {
    #[must_use]
    pub fn new(info: &DataStackCreateInfo) -> Self {
        Self {
            slots: vec![Value::zero(); info.size],
            top: 0,
        }
    }

    /// Reserve `n` fresh slots above the current top, initialized to
    /// integer zero. Faults fatally when capacity would be exceeded.
    pub fn reserve(&mut self, n: usize) {
        if self.top + n > self.slots.len() {
            fatal(Fault::StackOverflow { stack: StackKind::Data });
        }
        self.slots[self.top..self.top + n].fill(Value::zero());
        self.top += n;
    }

    pub fn push(&mut self, value: Value) {
        self.reserve(1);
        self.slots[self.top - 1] = value;
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Value {
        debug_assert!(index < self.top, "slot {index} is above the stack top");
        self.slots[index]
    }

    pub fn set(&mut self, index: usize, value: Value) {
        debug_assert!(index < self.top, "slot {index} is above the stack top");
        self.slots[index] = value;
    }

    /// Move a live slot range downwards, overwriting dead slots in place.
    pub fn move_range(&mut self, src: Range<usize>, dest: usize) {
        debug_assert!(src.end <= self.top);
        debug_assert!(dest <= src.start);
        self.slots.copy_within(src, dest);
    }

    /// Release every slot at or above `new_top`.
    pub fn release_to(&mut self, new_top: usize) {
        debug_assert!(new_top <= self.top);
        self.top = new_top;
    }

    #[must_use]
    pub fn top(&self) -> usize {
        self.top
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn mk_stack(size: usize) -> DataStack {
        DataStack::new(&DataStackCreateInfo { size })
    }

    #[test]
    fn reserve_zero_initializes() {
        let mut stack = mk_stack(8);
        stack.reserve(3);
        assert_eq!(stack.top(), 3);
        for i in 0..3 {
            assert_eq!(stack.get(i), Value::zero());
        }
    }

    #[test]
    fn release_reclaims_slots() {
        let mut stack = mk_stack(8);
        stack.reserve(5);
        stack.set(4, Value::from_int(17));
        stack.release_to(2);
        assert_eq!(stack.top(), 2);
        stack.reserve(1);
        // reclaimed slots come back zeroed
        assert_eq!(stack.get(2), Value::zero());
    }

    #[test]
    fn move_range_shifts_live_values_down() {
        let mut stack = mk_stack(8);
        stack.reserve(6);
        stack.set(4, Value::from_int(1));
        stack.set(5, Value::from_int(2));
        stack.move_range(4..6, 0);
        assert_eq!(stack.get(0).as_int(), 1);
        assert_eq!(stack.get(1).as_int(), 2);
    }

    #[test]
    fn overflow_faults_without_partial_mutation() {
        let mut stack = mk_stack(8);
        stack.reserve(4);
        for i in 0..4 {
            stack.set(i, Value::from_int(i as i64 + 1));
        }

        let caught = catch_unwind(AssertUnwindSafe(|| stack.reserve(5)));
        let fault = caught.unwrap_err().downcast::<Fault>().unwrap();
        assert_eq!(*fault, Fault::StackOverflow { stack: StackKind::Data });

        // the failed reservation must not have touched anything
        assert_eq!(stack.top(), 4);
        for i in 0..4 {
            assert_eq!(stack.get(i).as_int(), i as i64 + 1);
        }
    }

    #[test]
    fn reserve_up_to_capacity_succeeds() {
        let mut stack = mk_stack(4);
        stack.reserve(4);
        assert_eq!(stack.top(), 4);
    }
}
