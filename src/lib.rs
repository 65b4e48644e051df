// yarnvm: a small embeddable VM executing a custom 32-bit bytecode.
//
// all VM state (the 16 general registers, the flag byte, the status byte) is
// memory-mapped into the tail of the VM's own linear memory, rather than
// kept in a separate register file. a program with enough stack depth can
// walk off the end of its stack and start corrupting its own registers; that
// is a property of this VM, not a bug to be designed away (see DESIGN.md).
//
// a host embeds this crate by creating a `Vm`, loading an assembled code
// buffer into it, and calling `execute` for a bounded or unbounded number of
// opcodes. there is no assembler here; `src/bin/yarnvm.rs` expects already
// assembled bytecode.

mod dispatch;
mod error;
mod memory;
mod opcode;
mod register;
mod syscall;

use std::time::{SystemTime, UNIX_EPOCH};

pub use error::VmError;
pub use register::{register_to_string, status_to_string, Register, Status, FLAG_CONDITIONAL};
pub use syscall::SyscallFn;

use syscall::SyscallTable;

/// number of memory-mapped registers.
pub const NUM_REGISTERS: u32 = Register::COUNT as u32;
/// size in bytes of a VM word and of a register slot.
pub const WORD_BYTES: u32 = 4;
/// default syscall table capacity; must stay a power of two.
pub const DEFAULT_SYSCALL_CAPACITY: u32 = 256;

const BUILTIN_SYSCALL_MEMSIZE: u32 = 0x00;
const BUILTIN_SYSCALL_INSTRUCTION_COUNT: u32 = 0x01;
const BUILTIN_SYSCALL_WALLCLOCK: u32 = 0x02;

#[derive(Debug)]
pub struct Vm {
    code: Vec<u8>,
    pub(crate) memory: Vec<u8>,
    instruction_count: u64,
    syscalls: SyscallTable,
}

impl Vm {
    /// create a VM with `memsize` bytes of linear memory and the default
    /// syscall table capacity (256). Memory is zeroed; `%ins` starts at 0;
    /// `%stk`/`%bse` start just below the register/flag/status block.
    pub fn new(memsize: u32) -> Result<Self, VmError> {
        Self::with_syscall_capacity(memsize, DEFAULT_SYSCALL_CAPACITY)
    }

    /// like `new`, but with a caller-chosen syscall table capacity (must be
    /// a power of two), useful for hosts that register many syscalls, per
    /// the reference implementation's note that the default 256-slot table
    /// has no resize path.
    pub fn with_syscall_capacity(memsize: u32, syscall_capacity: u32) -> Result<Self, VmError> {
        let reserved = (NUM_REGISTERS + 2) * WORD_BYTES;
        if memsize < reserved || !syscall_capacity.is_power_of_two() {
            return Err(VmError::OutOfMemory);
        }

        let mut vm = Vm {
            code: Vec::new(),
            memory: vec![0u8; memsize as usize],
            instruction_count: 0,
            syscalls: SyscallTable::new(syscall_capacity),
        };

        let stack_top = memsize - reserved;
        vm.set_register(Register::Instruction.index(), 0);
        vm.set_register(Register::Stack.index(), stack_top);
        vm.set_register(Register::Base.index(), stack_top);

        vm.register_syscall(BUILTIN_SYSCALL_MEMSIZE, builtin_get_memsize)
            .expect("default syscall table has room for the built-ins");
        vm.register_syscall(BUILTIN_SYSCALL_INSTRUCTION_COUNT, builtin_get_instruction_count)
            .expect("default syscall table has room for the built-ins");
        vm.register_syscall(BUILTIN_SYSCALL_WALLCLOCK, builtin_get_wallclock)
            .expect("default syscall table has room for the built-ins");

        Ok(vm)
    }

    /// replace the code buffer. May be called any number of times; does not
    /// reset memory, registers, or the instruction count.
    pub fn load_code(&mut self, code: &[u8]) -> Result<(), VmError> {
        self.code = code.to_vec();
        Ok(())
    }

    pub fn get_memory_ptr(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_memory_size(&self) -> u32 {
        self.memory.len() as u32
    }

    pub fn get_instruction_count(&self) -> u64 {
        self.instruction_count
    }

    pub fn register_syscall(&mut self, key: u32, callback: SyscallFn) -> Result<(), VmError> {
        self.syscalls.register(key, callback)
    }

    pub fn lookup_syscall(&self, key: u32) -> Option<SyscallFn> {
        self.syscalls.lookup(key)
    }
}

fn builtin_get_memsize(vm: &mut Vm) {
    let size = vm.get_memory_size();
    vm.set_register(Register::Return.index(), size);
}

fn builtin_get_instruction_count(vm: &mut Vm) {
    let count = vm.get_instruction_count();
    vm.set_register(Register::Return.index(), count as u32);
}

fn builtin_get_wallclock(vm: &mut Vm) {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    vm.set_register(Register::Return.index(), secs as u32);
}
