use std::collections::HashMap;

use crate::{ClassId, Fault, Routine, fatal};

/// Stable method identifier assigned at link time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MethodId(pub u32);

/// One method implementation as described by the code generator: which
/// routine to run and how its frame is laid out. `argc` arguments occupy
/// the low slots of the `varc`-slot frame.
#[derive(Debug, Copy, Clone)]
pub struct MethodDescriptor {
    pub class: ClassId,
    pub method: MethodId,
    pub argc: usize,
    pub varc: usize,
    pub routine: Routine,
}

/// Immutable `(class, method)` dispatch table, built once at startup from
/// the descriptors the code generator supplies. The runtime only probes it.
#[derive(Debug)]
pub struct DispatchTable {
    entries: HashMap<(ClassId, MethodId), MethodDescriptor>,
}

impl DispatchTable {
    pub fn new(methods: Vec<MethodDescriptor>) -> Self {
        let mut entries = HashMap::with_capacity(methods.len());
        for m in methods {
            assert!(
                m.argc <= m.varc,
                "method {} on class {}: argc {} exceeds frame size {}",
                m.method.0,
                m.class.0,
                m.argc,
                m.varc
            );
            let previous = entries.insert((m.class, m.method), m);
            assert!(
                previous.is_none(),
                "duplicate binding for method {} on class {}",
                m.method.0,
                m.class.0
            );
        }
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, class: ClassId, method: MethodId) -> Option<&MethodDescriptor> {
        self.entries.get(&(class, method))
    }

    /// Probe the table; an absent binding is a code generation defect and
    /// faults fatally.
    pub fn lookup(&self, class: ClassId, method: MethodId) -> &MethodDescriptor {
        match self.get(class, method) {
            Some(descriptor) => descriptor,
            None => fatal(Fault::MethodNotFound { class, method }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Process;
    use std::panic::catch_unwind;

    fn noop(_: &mut Process) {}

    fn mk_table() -> DispatchTable {
        DispatchTable::new(vec![MethodDescriptor {
            class: ClassId(3),
            method: MethodId(1),
            argc: 2,
            varc: 4,
            routine: noop,
        }])
    }

    #[test]
    fn declared_binding_is_found() {
        let table = mk_table();
        let m = table.lookup(ClassId(3), MethodId(1));
        assert_eq!(m.argc, 2);
        assert_eq!(m.varc, 4);
    }

    #[test]
    fn undeclared_binding_faults() {
        let caught = catch_unwind(|| {
            let table = mk_table();
            table.lookup(ClassId(3), MethodId(2));
        });
        let fault = caught.unwrap_err().downcast::<Fault>().unwrap();
        assert_eq!(
            *fault,
            Fault::MethodNotFound { class: ClassId(3), method: MethodId(2) }
        );
    }

    #[test]
    #[should_panic(expected = "argc 3 exceeds frame size 2")]
    fn argc_above_varc_is_rejected() {
        DispatchTable::new(vec![MethodDescriptor {
            class: ClassId(0),
            method: MethodId(0),
            argc: 3,
            varc: 2,
            routine: noop,
        }]);
    }
}
