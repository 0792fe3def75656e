//! Value: one machine word, either an inline small integer or a reference
//! to a heap object.
//!
//! Integers carry a low tag bit and are recovered with an arithmetic shift,
//! so sign and zero survive the encoding exactly. Object references are the
//! untagged address itself; allocations are word-aligned, which keeps the
//! low bit free for the integer tag.

use crate::{Fault, Routine, fatal};

#[repr(u8)]
#[derive(Debug, Copy, Clone)]
pub enum ValueTag {
    Reference = 0b0,
    Integer = 0b1,
}

pub const INT_TAG_MASK: u64 = 0b1;
pub const INT_SHIFT: u32 = 1;

/// A generic Value
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Value(u64);

impl Value {
    /// Smallest integer the shifted encoding can hold.
    pub const MIN_INT: i64 = i64::MIN >> INT_SHIFT;
    /// Largest integer the shifted encoding can hold.
    pub const MAX_INT: i64 = i64::MAX >> INT_SHIFT;

    pub fn from_int(value: i64) -> Self {
        if !(Self::MIN_INT..=Self::MAX_INT).contains(&value) {
            fatal(Fault::IntegerRange { value });
        }
        let tagged = (value.cast_unsigned() << INT_SHIFT) | ValueTag::Integer as u64;
        Self(tagged)
    }

    pub fn zero() -> Self {
        Self(ValueTag::Integer as u64)
    }

    pub fn is_int(&self) -> bool {
        self.0 & INT_TAG_MASK == ValueTag::Integer as u64
    }

    pub fn is_object(&self) -> bool {
        self.0 & INT_TAG_MASK == ValueTag::Reference as u64
    }

    /// Decode an integer value. The arithmetic shift restores the sign.
    ///
    /// Not an integer is a code generation defect; only checked in debug.
    pub fn as_int(self) -> i64 {
        debug_assert!(self.is_int(), "value is not an integer");
        self.0.cast_signed() >> INT_SHIFT
    }

    /// # Safety
    /// `ptr` must point at the header slot of a live heap object and stay
    /// valid for the process lifetime.
    pub unsafe fn from_object_ptr(ptr: *mut Value) -> Self {
        let raw = ptr as u64;
        debug_assert_eq!(
            raw & INT_TAG_MASK,
            0,
            "object block must be aligned so the low bit is free"
        );
        Self(raw)
    }

    /// # Safety
    /// caller must make sure this is an object reference
    pub unsafe fn as_object_ptr(self) -> *mut Value {
        debug_assert!(self.is_object(), "value is not an object reference");
        self.0 as *mut Value
    }

    /// Encode a routine entry point as a continuation word. Function
    /// pointers are aligned, so the pattern never reads as an integer.
    pub fn from_routine(routine: Routine) -> Self {
        let raw = routine as usize as u64;
        debug_assert_eq!(raw & INT_TAG_MASK, 0);
        Self(raw)
    }

    /// # Safety
    /// caller must make sure this word was written by [`Value::from_routine`]
    pub unsafe fn as_routine(self) -> Routine {
        // SAFETY: by contract the word is a routine entry point
        unsafe { std::mem::transmute::<usize, Routine>(self.0 as usize) }
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_round_trip() {
        for n in [0, 1, -1, 7, -7, 1 << 40, -(1 << 40), Value::MIN_INT, Value::MAX_INT] {
            assert_eq!(Value::from_int(n).as_int(), n, "round trip of {n}");
        }
    }

    #[test]
    fn zero_is_tagged_integer() {
        let zero = Value::zero();
        assert!(zero.is_int());
        assert!(!zero.is_object());
        assert_eq!(zero.as_int(), 0);
        assert_eq!(zero, Value::from_int(0));
    }

    #[test]
    fn negative_sign_survives_shift() {
        let v = Value::from_int(-1);
        assert_eq!(v.as_int(), -1);
        let v = Value::from_int(Value::MIN_INT);
        assert_eq!(v.as_int(), Value::MIN_INT);
    }

    #[test]
    fn integer_tag_never_aliases_references() {
        let mut block = [Value::zero(); 2];
        // SAFETY: block lives for the duration of the test
        let v = unsafe { Value::from_object_ptr(block.as_mut_ptr()) };
        assert!(v.is_object());
        assert!(!v.is_int());
    }

    #[test]
    fn out_of_range_integer_faults() {
        let caught = std::panic::catch_unwind(|| Value::from_int(i64::MAX));
        let fault = caught.unwrap_err().downcast::<Fault>().unwrap();
        assert_eq!(
            *fault,
            Fault::IntegerRange { value: i64::MAX }
        );
    }
}
