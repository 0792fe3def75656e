//! Driver loop and calling convention.
//!
//! A process owns the two stacks exclusively, so routine code never touches
//! the host call stack across a suspension point: every call, tail call,
//! and return goes through the activation records here.
//!
//! Frame discipline: while a routine is active, the data stack top sits
//! exactly at `frame_base + varc` of the top activation. `prepare_call`
//! saves the caller's continuation (routine word, receiver) in the two
//! slots above the frame before the outgoing arguments are staged; `ret`
//! finds its way back through those slots. A tail call saves nothing and
//! rewrites the top activation in place, so tail-recursive chains run in
//! constant call stack depth.

use std::sync::Arc;

use log::trace;

use crate::{
    Activation, CallStack, CallStackCreateInfo, ClassId, DataStack, DataStackCreateInfo, Env,
    Fault, Heap, MethodId, Value, fatal,
};

#[derive(Debug, Clone)]
pub struct ProcessCreateInfo {
    pub data_stack_size: usize,
    pub call_stack_size: usize,
}

impl Default for ProcessCreateInfo {
    fn default() -> Self {
        Self {
            data_stack_size: 1024,
            call_stack_size: 1024,
        }
    }
}

/// One execution context: data stack, call stack, heap, the receiver
/// register, and the one-slot last-result channel.
#[derive(Debug)]
pub struct Process {
    env: Arc<Env>,
    data: DataStack,
    calls: CallStack,
    heap: Heap,
    recv: Value,
    result: Value,
    staged: usize,
}

impl Process {
    #[must_use]
    pub fn new(env: Arc<Env>, info: &ProcessCreateInfo) -> Self {
        Self {
            env,
            data: DataStack::new(&DataStackCreateInfo { size: info.data_stack_size }),
            calls: CallStack::new(&CallStackCreateInfo { size: info.call_stack_size }),
            heap: Heap::new(),
            recv: Value::zero(),
            result: Value::zero(),
            staged: 0,
        }
    }

    /// Push the entry activation with its empty, zeroed frame. The
    /// bootstrap may write entry frame slots before driving.
    pub fn boot(&mut self) {
        let entry = self.env.entry();
        self.data.reserve(entry.varc);
        self.calls.push(Activation {
            routine: entry.routine,
            resume: 0,
            frame_base: 0,
            varc: entry.varc,
        });
    }

    /// Drive the top routine until the call stack empties. The final
    /// return value is the program's result.
    pub fn drive(&mut self) -> Value {
        while !self.calls.is_empty() {
            let current = *self.calls.current();
            trace!(
                "step: depth={} resume={} frame=[{}, {})",
                self.calls.depth(),
                current.resume,
                current.frame_base,
                current.frame_base + current.varc,
            );
            (current.routine)(self);
        }
        self.result
    }

    /// Boot and drive in one step.
    pub fn run(&mut self) -> Value {
        self.boot();
        self.drive()
    }

    /// Suspension index to re-enter the active routine at; 0 on first entry.
    #[must_use]
    pub fn resume(&self) -> u32 {
        self.calls.current().resume
    }

    /// The active routine's receiver (self).
    #[must_use]
    pub fn receiver(&self) -> Value {
        self.recv
    }

    /// The value delivered by the most recent return.
    #[must_use]
    pub fn last_result(&self) -> Value {
        self.result
    }

    /// Read a slot of the active frame.
    #[must_use]
    pub fn read(&self, offset: usize) -> Value {
        let current = self.calls.current();
        debug_assert!(offset < current.varc, "slot {offset} is outside the frame");
        self.data.get(current.frame_base + offset)
    }

    /// Write a slot of the active frame.
    pub fn write(&mut self, offset: usize, value: Value) {
        let current = self.calls.current();
        debug_assert!(offset < current.varc, "slot {offset} is outside the frame");
        self.data.set(current.frame_base + offset, value);
    }

    /// Argument `index` of the active frame. Arguments occupy the low slots.
    #[must_use]
    pub fn arg(&self, index: usize) -> Value {
        self.read(index)
    }

    /// Save the caller's continuation above its frame, then reserve slots
    /// for the outgoing arguments. Must run before the arguments are
    /// written; the saved slots are what `ret` later restores from.
    pub fn prepare_call(&mut self, argc: usize) {
        let routine = self.calls.current().routine;
        self.data.push(Value::from_routine(routine));
        self.data.push(self.recv);
        self.data.reserve(argc);
        self.staged = argc;
    }

    /// Reserve slots for a tail call's arguments. No continuation is
    /// saved: the call stack must not grow.
    pub fn prepare_tail_call(&mut self, argc: usize) {
        self.data.reserve(argc);
        self.staged = argc;
    }

    /// Write outgoing argument `index` into the slots reserved by the most
    /// recent `prepare_call` or `prepare_tail_call`.
    pub fn write_arg(&mut self, index: usize, value: Value) {
        debug_assert!(index < self.staged, "argument {index} was not reserved");
        let base = self.data.top() - self.staged;
        self.data.set(base + index, value);
    }

    /// Dispatch on the receiver's class and transfer control to the callee.
    /// The caller suspends at `resume_at`; the staged arguments become the
    /// low slots of the callee's fresh frame.
    pub fn call(&mut self, receiver: Value, method: MethodId, resume_at: u32) {
        // SAFETY: receivers are object references by the codegen contract
        let class = unsafe { receiver.class_id() };
        let m = *self.env.lookup(class, method);
        debug_assert_eq!(m.argc, self.staged, "staged argument count mismatch");

        let frame_base = self.data.top() - m.argc;
        self.data.reserve(m.varc - m.argc);

        self.calls.current_mut().resume = resume_at;
        self.calls.push(Activation {
            routine: m.routine,
            resume: 0,
            frame_base,
            varc: m.varc,
        });
        self.recv = receiver;
        self.staged = 0;
        trace!(
            "call: class={} method={} frame=[{}, {})",
            class.0,
            method.0,
            frame_base,
            frame_base + m.varc,
        );
    }

    /// Dispatch like `call`, but replace the current activation instead of
    /// suspending it: the staged arguments move down over the caller's dead
    /// locals and the top record is rewritten in place.
    pub fn tail_call(&mut self, receiver: Value, method: MethodId) {
        // SAFETY: receivers are object references by the codegen contract
        let class = unsafe { receiver.class_id() };
        let m = *self.env.lookup(class, method);
        debug_assert_eq!(m.argc, self.staged, "staged argument count mismatch");

        let top = self.data.top();
        let frame_base = self.calls.current().frame_base;
        self.data.move_range(top - m.argc..top, frame_base);
        self.data.release_to(frame_base + m.argc);
        self.data.reserve(m.varc - m.argc);

        let record = self.calls.current_mut();
        record.routine = m.routine;
        record.resume = 0;
        record.varc = m.varc;
        self.recv = receiver;
        self.staged = 0;
        trace!(
            "tail call: class={} method={} frame=[{}, {})",
            class.0,
            method.0,
            frame_base,
            frame_base + m.varc,
        );
    }

    /// Finish the active routine: release its frame, restore the caller's
    /// continuation from the slots `prepare_call` saved, and deliver
    /// `value` through the last-result channel. Returning from the last
    /// activation completes the program.
    pub fn ret(&mut self, value: Value) {
        let finished = self.calls.pop();
        self.result = value;

        if self.calls.is_empty() {
            self.data.release_to(finished.frame_base);
            trace!("return: program complete");
            return;
        }

        let continuation = finished.frame_base - 2;
        let routine_word = self.data.get(continuation);
        let saved_recv = self.data.get(continuation + 1);
        self.data.release_to(continuation);

        // SAFETY: the slot was written by prepare_call
        self.calls.current_mut().routine = unsafe { routine_word.as_routine() };
        self.recv = saved_recv;
        trace!("return: depth={}", self.calls.depth());
    }

    /// Allocate an object of `class` with the given field values, copied
    /// verbatim. The field count must match the class shape exactly.
    pub fn construct(&mut self, class: ClassId, fields: &[Value]) -> Value {
        let descriptor = *self.env.class(class);
        if descriptor.fieldc != fields.len() {
            fatal(Fault::ArityMismatch {
                class,
                expected: descriptor.fieldc,
                given: fields.len(),
            });
        }
        let object = self.heap.allocate(&descriptor);
        for (index, &value) in fields.iter().enumerate() {
            // SAFETY: freshly allocated object with fieldc slots
            unsafe { object.set_field(index, value) };
        }
        object
    }

    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.calls.depth()
    }

    #[must_use]
    pub fn data_depth(&self) -> usize {
        self.data.top()
    }
}
