//! Heap object model: fixed-shape records of a class identifier header
//! followed by `fieldc` value slots. Shapes are fixed at link time and
//! objects are never resized or mutated after construction.

use crate::Value;

/// Stable class identifier assigned at link time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// Shape of one class: how many field slots its instances carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub id: ClassId,
    pub fieldc: usize,
}

impl Value {
    /// Read the class identifier from the object header.
    /// # Safety
    /// caller must make sure this is an object reference
    pub unsafe fn class_id(self) -> ClassId {
        // SAFETY: slot 0 of every object is the header
        let header = unsafe { *self.as_object_ptr() };
        ClassId(header.as_int() as u32)
    }

    /// Read field `index` of an object.
    /// # Safety
    /// caller must make sure this is an object reference and `index` is
    /// below the class's `fieldc`
    pub unsafe fn field(self, index: usize) -> Value {
        // SAFETY: fields start one slot past the header
        unsafe { *self.as_object_ptr().add(1 + index) }
    }

    /// Write field `index` of an object. Used once per field during
    /// construction; the runtime never mutates fields afterwards.
    /// # Safety
    /// caller must make sure this is an object reference and `index` is
    /// below the class's `fieldc`
    pub(crate) unsafe fn set_field(self, index: usize, value: Value) {
        // SAFETY: fields start one slot past the header
        unsafe { *self.as_object_ptr().add(1 + index) = value }
    }
}
