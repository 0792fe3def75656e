use crate::{Fault, Process, StackKind, fatal};

/// One compiler-emitted method body. Each invocation runs from the
/// activation's resume index to the next call, tail call, or return, then
/// hands control back to the driver loop.
pub type Routine = fn(&mut Process);

/// Runtime state of one in-progress routine invocation.
///
/// `resume` is an opaque per-routine suspension index: 0 means the start of
/// the body, anything else names the call site being resumed after a nested
/// call returned. `frame_base` and `varc` locate the activation's frame in
/// the data stack; `varc` counts the whole frame, arguments included.
#[derive(Debug, Copy, Clone)]
pub struct Activation {
    pub routine: Routine,
    pub resume: u32,
    pub frame_base: usize,
    pub varc: usize,
}

/// Fixed-capacity stack of activation records. Only the record at the top
/// ever runs or is mutated; everything below it is suspended waiting on the
/// record above.
#[derive(Debug)]
pub struct CallStack {
    records: Vec<Activation>,
    limit: usize,
}

#[derive(Debug, Clone)]
pub struct CallStackCreateInfo {
    pub size: usize,
}

impl Default for CallStackCreateInfo {
    fn default() -> Self {
        Self { size: 1024 }
    }
}

impl CallStack {
    #[must_use]
    pub fn new(info: &CallStackCreateInfo) -> Self {
        Self {
            records: Vec::with_capacity(info.size),
            limit: info.size,
        }
    }

    pub fn push(&mut self, activation: Activation) {
        if self.records.len() == self.limit {
            fatal(Fault::StackOverflow { stack: StackKind::Call });
        }
        self.records.push(activation);
    }

    pub fn pop(&mut self) -> Activation {
        self.records.pop().expect("popping activation")
    }

    #[must_use]
    pub fn current(&self) -> &Activation {
        self.records.last().expect("top most exists")
    }

    pub fn current_mut(&mut self) -> &mut Activation {
        self.records.last_mut().expect("top most exists")
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn noop(_: &mut Process) {}

    fn mk_record(frame_base: usize) -> Activation {
        Activation { routine: noop, resume: 0, frame_base, varc: 0 }
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut calls = CallStack::new(&CallStackCreateInfo { size: 4 });
        calls.push(mk_record(0));
        calls.push(mk_record(8));
        assert_eq!(calls.depth(), 2);
        assert_eq!(calls.current().frame_base, 8);
        assert_eq!(calls.pop().frame_base, 8);
        assert_eq!(calls.pop().frame_base, 0);
        assert!(calls.is_empty());
    }

    #[test]
    fn exceeding_the_limit_faults() {
        let mut calls = CallStack::new(&CallStackCreateInfo { size: 2 });
        calls.push(mk_record(0));
        calls.push(mk_record(1));
        let caught = catch_unwind(AssertUnwindSafe(|| calls.push(mk_record(2))));
        let fault = caught.unwrap_err().downcast::<Fault>().unwrap();
        assert_eq!(*fault, Fault::StackOverflow { stack: StackKind::Call });
        assert_eq!(calls.depth(), 2);
    }
}
