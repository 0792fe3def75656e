use std::fmt;

use log::error;

use crate::{ClassId, MethodId};

/// Fatal runtime faults: resource exhaustion or a violated code generation
/// contract. Never propagated as values; [`fatal`] aborts the computation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Fault {
    StackOverflow { stack: StackKind },
    MethodNotFound { class: ClassId, method: MethodId },
    ArityMismatch { class: ClassId, expected: usize, given: usize },
    IntegerRange { value: i64 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StackKind {
    Data,
    Call,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::StackOverflow { stack } => {
                write!(f, "{stack} stack overflow")
            }
            Fault::MethodNotFound { class, method } => {
                write!(f, "no method {} on class {}", method.0, class.0)
            }
            Fault::ArityMismatch { class, expected, given } => {
                write!(
                    f,
                    "class {} has {expected} fields, {given} values supplied",
                    class.0
                )
            }
            Fault::IntegerRange { value } => {
                write!(f, "integer {value} exceeds the representable range")
            }
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Data => write!(f, "data"),
            StackKind::Call => write!(f, "call"),
        }
    }
}

/// Raise a fatal fault. Unwinds with the fault as payload so the process
/// boundary can report it; nothing in the runtime catches it.
pub fn fatal(fault: Fault) -> ! {
    error!("fatal runtime fault: {fault}");
    std::panic::panic_any(fault)
}
