use log::trace;

use crate::{ClassDescriptor, Value};

/// Block allocator for heap objects. Each allocation is `1 + fieldc` value
/// slots: the header plus the field area. Blocks are retained for the
/// process lifetime; there is no reclamation at this layer.
#[derive(Debug, Default)]
pub struct Heap {
    blocks: Vec<Box<[Value]>>,
}

impl Heap {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Allocate one object block for `class` and stamp its header. Field
    /// slots start out as integer zero.
    pub fn allocate(&mut self, class: &ClassDescriptor) -> Value {
        let mut block = vec![Value::zero(); 1 + class.fieldc].into_boxed_slice();
        block[0] = Value::from_int(class.id.0 as i64);
        let ptr = block.as_mut_ptr();
        // boxed slices never move once pushed, so the address stays stable
        self.blocks.push(block);
        trace!("allocated class {} object, {} fields", class.id.0, class.fieldc);
        // SAFETY: the block is kept alive in self.blocks until drop
        unsafe { Value::from_object_ptr(ptr) }
    }

    pub fn allocated(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClassId;

    #[test]
    fn header_carries_class_id() {
        let mut heap = Heap::new();
        let class = ClassDescriptor { id: ClassId(9), fieldc: 2 };
        let object = heap.allocate(&class);
        assert!(object.is_object());
        // SAFETY: freshly allocated object
        assert_eq!(unsafe { object.class_id() }, ClassId(9));
        assert_eq!(heap.allocated(), 1);
    }

    #[test]
    fn fields_start_zeroed_and_hold_writes() {
        let mut heap = Heap::new();
        let class = ClassDescriptor { id: ClassId(0), fieldc: 3 };
        let object = heap.allocate(&class);
        // SAFETY: indices below fieldc of a live object
        unsafe {
            for i in 0..3 {
                assert_eq!(object.field(i), Value::zero());
            }
            object.set_field(1, Value::from_int(-4));
            assert_eq!(object.field(1).as_int(), -4);
        }
    }

    #[test]
    fn blocks_stay_stable_as_the_heap_grows() {
        let mut heap = Heap::new();
        let class = ClassDescriptor { id: ClassId(1), fieldc: 1 };
        let first = heap.allocate(&class);
        // SAFETY: live object
        unsafe { first.set_field(0, Value::from_int(11)) };
        for _ in 0..100 {
            heap.allocate(&class);
        }
        // SAFETY: live object
        assert_eq!(unsafe { first.field(0).as_int() }, 11);
    }
}
