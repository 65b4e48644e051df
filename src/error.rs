// construction/load-time failures. runtime faults live in the status byte, not here.

use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum VmError {
    /// memory or code buffer allocation failed
    OutOfMemory,
    /// register_syscall probed every slot without finding a match or an empty one
    SyscallTableFull,
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::OutOfMemory => write!(f, "allocation failure"),
            VmError::SyscallTableFull => write!(f, "syscall table is full"),
        }
    }
}

impl std::error::Error for VmError {}
