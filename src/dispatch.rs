// fetch-decode-execute loop. one opcode per `step`; `execute` drives `step`
// for up to `icount` opcodes (or forever, if `icount == -1`) while status
// stays `Ok`.

use crate::opcode::{decode_imm, decode_reg_pair, Opcode};
use crate::register::{Register, Status, FLAG_CONDITIONAL};
use crate::Vm;

impl Vm {
    /// run up to `icount` opcodes (`-1` for unbounded) while status is `Ok`.
    /// returns the status the VM is left in.
    pub fn execute(&mut self, icount: i64) -> Status {
        let mut remaining = icount;
        loop {
            if self.status() != Status::Ok {
                break;
            }
            if icount != -1 && remaining <= 0 {
                break;
            }
            if self.step() && icount != -1 {
                remaining -= 1;
            }
        }
        self.status()
    }

    fn code_readable(&self, ip: u32, len: u32) -> bool {
        let end = ip as u64 + len as u64;
        end <= self.code.len() as u64
    }

    /// fetch, decode, and execute one opcode. Returns `true` if an opcode
    /// was actually dispatched (and thus counted); `false` for a fault that
    /// occurred before dispatch (code pointer unreadable, or not enough
    /// operand bytes for the decoded opcode).
    fn step(&mut self) -> bool {
        let ip = self.get_register(Register::Instruction.index());

        if !self.code_readable(ip, 1) {
            log::debug!("invalid instruction: ip={ip} unreadable");
            self.set_status(Status::InvalidInstruction as u8);
            return false;
        }
        let op_byte = self.code[ip as usize];
        let opcode = match Opcode::try_from(op_byte) {
            Ok(op) => op,
            Err(()) => {
                log::debug!("invalid instruction: unknown opcode {op_byte:#04x} at ip={ip}");
                self.set_status(Status::InvalidInstruction as u8);
                return false;
            }
        };
        if !self.code_readable(ip, opcode.encoded_len()) {
            log::debug!("invalid instruction: {opcode:?} at ip={ip} missing operand bytes");
            self.set_status(Status::InvalidInstruction as u8);
            return false;
        }

        log::trace!("dispatch {opcode:?} at ip={ip}");
        self.dispatch(opcode, ip);
        self.instruction_count += 1;
        true
    }

    fn arith_operand_a(&mut self, r_a: u8, imm: u32) -> u32 {
        if r_a == Register::Null.index() {
            imm
        } else {
            self.get_register(r_a)
        }
    }

    fn move_operand_a(&mut self, r_a: u8) -> u32 {
        if r_a == Register::Null.index() {
            0
        } else {
            self.get_register(r_a)
        }
    }

    fn dispatch(&mut self, opcode: Opcode, ip: u32) {
        use Opcode::*;
        match opcode {
            Halt => {
                self.set_status(Status::Halt as u8);
                self.inc_register(Register::Instruction.index(), 1);
            }
            Pause => {
                self.set_status(Status::Pause as u8);
                self.inc_register(Register::Instruction.index(), 1);
            }
            Nop => {
                self.inc_register(Register::Instruction.index(), 1);
            }

            Add | Sub | Mul | Div | Divs | Lsh | Rsh | Rshs | And | Or | Xor | Not => {
                self.dispatch_arith(opcode, ip);
                self.inc_register(Register::Instruction.index(), 6);
            }

            Ir | Mr | Rr | Rm => {
                self.dispatch_move(opcode, ip);
                self.inc_register(Register::Instruction.index(), 6);
            }

            Push => {
                let pair = decode_reg_pair(self.code[ip as usize + 1]);
                let val = self.get_register(pair.r_a);
                self.push(val);
                self.inc_register(Register::Instruction.index(), 2);
            }
            Pop => {
                let pair = decode_reg_pair(self.code[ip as usize + 1]);
                let val = self.pop();
                self.set_register(pair.r_a, val);
                self.inc_register(Register::Instruction.index(), 2);
            }

            Call => {
                let d = self.decode_branch_imm(ip);
                self.push(ip + 5);
                self.set_register(Register::Instruction.index(), d);
            }
            Ret => {
                let d = self.decode_branch_imm(ip);
                for _ in 0..d {
                    self.pop();
                }
                let ret_addr = self.pop();
                self.set_register(Register::Instruction.index(), ret_addr);
            }
            Jump => {
                let d = self.decode_branch_imm(ip);
                self.set_register(Register::Instruction.index(), d);
            }
            Condjump => {
                let d = self.decode_branch_imm(ip);
                if self.get_flag(FLAG_CONDITIONAL) {
                    self.set_register(Register::Instruction.index(), d);
                } else {
                    self.inc_register(Register::Instruction.index(), 5);
                }
            }
            Syscall => {
                let d = self.decode_branch_imm(ip);
                match self.lookup_syscall(d) {
                    Some(callback) => callback(self),
                    None => {
                        log::debug!("syscall miss for id {d:#x}");
                        self.set_status(Status::InvalidInstruction as u8);
                    }
                }
                self.inc_register(Register::Instruction.index(), 5);
            }

            Lt | Lts | Lte | Ltes | Eq | Neq => {
                self.dispatch_conditional(opcode, ip);
                self.inc_register(Register::Instruction.index(), 2);
            }
        }
    }

    fn decode_branch_imm(&self, ip: u32) -> u32 {
        let bytes = decode_imm(&self.code[ip as usize + 1..ip as usize + 5]);
        u32::from_le_bytes(bytes)
    }

    fn dispatch_arith(&mut self, opcode: Opcode, ip: u32) {
        let pair = decode_reg_pair(self.code[ip as usize + 1]);
        let imm = u32::from_le_bytes(decode_imm(&self.code[ip as usize + 2..ip as usize + 6]));
        let val_b = self.get_register(pair.r_b);
        let val_a = self.arith_operand_a(pair.r_a, imm);

        use Opcode::*;
        match opcode {
            Add => self.set_register(pair.r_b, val_b.wrapping_add(val_a)),
            Sub => self.set_register(pair.r_b, val_b.wrapping_sub(val_a)),
            Mul => self.set_register(pair.r_b, val_b.wrapping_mul(val_a)),
            Div => {
                if val_a == 0 {
                    self.set_status(Status::DivByZero as u8);
                } else {
                    self.set_register(pair.r_b, val_b.wrapping_div(val_a));
                }
            }
            Divs => {
                let (a, b) = (val_a as i32, val_b as i32);
                if a == 0 {
                    self.set_status(Status::DivByZero as u8);
                } else {
                    self.set_register(pair.r_b, b.wrapping_div(a) as u32);
                }
            }
            Lsh => self.set_register(pair.r_b, val_b.wrapping_shl(val_a & 0x1F)),
            Rsh => self.set_register(pair.r_b, val_b.wrapping_shr(val_a & 0x1F)),
            Rshs => {
                let shifted = (val_b as i32).wrapping_shr(val_a & 0x1F);
                self.set_register(pair.r_b, shifted as u32);
            }
            And => self.set_register(pair.r_b, val_b & val_a),
            Or => self.set_register(pair.r_b, val_b | val_a),
            Xor => self.set_register(pair.r_b, val_b ^ val_a),
            Not => self.set_register(pair.r_b, !val_a),
            _ => unreachable!("dispatch_arith called with non-arith opcode"),
        }
    }

    fn dispatch_move(&mut self, opcode: Opcode, ip: u32) {
        let pair = decode_reg_pair(self.code[ip as usize + 1]);
        let d = i32::from_le_bytes(decode_imm(&self.code[ip as usize + 2..ip as usize + 6])) as u32;
        let val_a = self.move_operand_a(pair.r_a);

        use Opcode::*;
        match opcode {
            Ir => self.set_register(pair.r_b, val_a.wrapping_add(d)),
            Mr => {
                let addr = val_a.wrapping_add(d);
                let mut buf = [0u8; 4];
                self.get_memory(addr, &mut buf);
                self.set_register(pair.r_b, u32::from_le_bytes(buf));
            }
            Rr => self.set_register(pair.r_b, val_a),
            Rm => {
                let base = self.get_register(pair.r_b);
                let addr = base.wrapping_add(d);
                self.set_memory(addr, &val_a.to_le_bytes());
            }
            _ => unreachable!("dispatch_move called with non-move opcode"),
        }
    }

    fn dispatch_conditional(&mut self, opcode: Opcode, ip: u32) {
        let pair = decode_reg_pair(self.code[ip as usize + 1]);
        self.clear_flag(FLAG_CONDITIONAL);
        let val_a = self.get_register(pair.r_a);
        let val_b = self.get_register(pair.r_b);

        use Opcode::*;
        let holds = match opcode {
            Lt => val_a < val_b,
            Lte => val_a <= val_b,
            Eq => val_a == val_b,
            Neq => val_a != val_b,
            Lts => (val_a as i32) < (val_b as i32),
            Ltes => (val_a as i32) <= (val_b as i32),
            _ => unreachable!("dispatch_conditional called with non-conditional opcode"),
        };
        if holds {
            self.set_flag(FLAG_CONDITIONAL);
        }
    }
}
