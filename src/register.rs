// register roles, status/flag codes, and their stable textual labels.

/// One of the 16 memory-mapped registers. A 4-bit operand nibble always
/// decodes to a valid variant; there is no invalid register index in the
/// instruction encoding itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Instruction = 0,
    Stack = 1,
    Base = 2,
    Return = 3,
    C1 = 4,
    C2 = 5,
    C3 = 6,
    C4 = 7,
    C5 = 8,
    C6 = 9,
    S1 = 10,
    S2 = 11,
    S3 = 12,
    S4 = 13,
    S5 = 14,
    Null = 15,
}

impl Register {
    pub const COUNT: u8 = 16;

    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Register::*;
        Ok(match value {
            0 => Instruction,
            1 => Stack,
            2 => Base,
            3 => Return,
            4 => C1,
            5 => C2,
            6 => C3,
            7 => C4,
            8 => C5,
            9 => C6,
            10 => S1,
            11 => S2,
            12 => S3,
            13 => S4,
            14 => S5,
            15 => Null,
            _ => return Err(()),
        })
    }
}

/// stable textual label for a register index; `"invalid"` outside `0..=15`.
pub fn register_to_string(reg: u8) -> &'static str {
    match Register::try_from(reg) {
        Ok(Register::Instruction) => "%ins",
        Ok(Register::Stack) => "%stk",
        Ok(Register::Base) => "%bse",
        Ok(Register::Return) => "%ret",
        Ok(Register::C1) => "%C1",
        Ok(Register::C2) => "%C2",
        Ok(Register::C3) => "%C3",
        Ok(Register::C4) => "%C4",
        Ok(Register::C5) => "%C5",
        Ok(Register::C6) => "%C6",
        Ok(Register::S1) => "%S1",
        Ok(Register::S2) => "%S2",
        Ok(Register::S3) => "%S3",
        Ok(Register::S4) => "%S4",
        Ok(Register::S5) => "%S5",
        Ok(Register::Null) => "%null",
        Err(()) => "invalid",
    }
}

/// VM run status. `Ok` is the only state that permits stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    Pause = 1,
    Halt = 2,
    InvalidMemory = 3,
    InvalidInstruction = 4,
    DivByZero = 5,
}

impl Status {
    pub const fn is_runnable(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl TryFrom<u8> for Status {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Status::Ok,
            1 => Status::Pause,
            2 => Status::Halt,
            3 => Status::InvalidMemory,
            4 => Status::InvalidInstruction,
            5 => Status::DivByZero,
            _ => return Err(()),
        })
    }
}

/// stable textual label for a status code. The double space in the
/// divide-by-zero message matches the reference implementation's own
/// observable output and is kept for compatibility.
pub fn status_to_string(status: u8) -> &'static str {
    match Status::try_from(status) {
        Ok(Status::Ok) => "ok",
        Ok(Status::Pause) => "paused",
        Ok(Status::Halt) => "halt",
        Ok(Status::InvalidMemory) => "invalid memory access error",
        Ok(Status::InvalidInstruction) => "invalid instruction error",
        Ok(Status::DivByZero) => "divide by zero  error",
        Err(()) => "invalid",
    }
}

/// bit index of the conditional flag within the flag byte.
pub const FLAG_CONDITIONAL: u8 = 0;
