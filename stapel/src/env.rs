use std::sync::Arc;

use crate::{
    ClassDescriptor, ClassId, DispatchTable, MethodDescriptor, MethodId, Process,
    ProcessCreateInfo, Routine, Value,
};

/// The distinguished routine a program starts in. It gets an empty
/// argument frame of `varc` local slots.
#[derive(Debug, Copy, Clone)]
pub struct EntryPoint {
    pub routine: Routine,
    pub varc: usize,
}

/// Linkage product of the code generator: class shapes, method bindings,
/// and the entry routine.
#[derive(Debug)]
pub struct EnvCreateInfo {
    pub classes: Vec<ClassDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub entry: EntryPoint,
}

/// The immutable program environment. Built once, then shared by every
/// process that runs the program.
#[derive(Debug)]
pub struct Env {
    classes: Vec<ClassDescriptor>,
    dispatch: DispatchTable,
    entry: EntryPoint,
}

impl Env {
    pub fn new(info: EnvCreateInfo) -> Arc<Self> {
        for (position, class) in info.classes.iter().enumerate() {
            assert_eq!(
                class.id.0 as usize, position,
                "class table must be dense and ordered by id"
            );
        }
        Arc::new(Self {
            classes: info.classes,
            dispatch: DispatchTable::new(info.methods),
            entry: info.entry,
        })
    }

    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDescriptor {
        &self.classes[id.0 as usize]
    }

    pub fn lookup(&self, class: ClassId, method: MethodId) -> &MethodDescriptor {
        self.dispatch.lookup(class, method)
    }

    #[must_use]
    pub fn entry(&self) -> EntryPoint {
        self.entry
    }

    /// Run the program: boot one process with an empty entry frame and
    /// drive it until the call stack empties. Returns the entry routine's
    /// final result.
    pub fn run(self: &Arc<Self>, info: &ProcessCreateInfo) -> Value {
        let mut process = Process::new(self.clone(), info);
        process.run()
    }
}
