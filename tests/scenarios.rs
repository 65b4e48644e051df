// end-to-end scenarios encoded as literal bytecode, mirroring anyvm's
// `abi_call`/`function_call` tests (literal `Vec<u8>` programs run through
// the public embedding interface and asserted on afterward).

use yarnvm::{Register, Status, Vm};

/// S4 - Call/Return: CALL a subroutine that sets RETURN to 99, pushes a
/// local word, then RET #1 to discard that local and pop the return
/// address, landing back on a trailing HALT. STACK must be back at its
/// initial value.
///
/// RET's discipline (dispatch.rs) is: pop `d` words and discard them, *then*
/// pop the return address. Since CALL pushes the return address on top of
/// whatever the caller already pushed, the `d` discarded words must be
/// pushed by the subroutine itself, above the return address, not by the
/// caller below it; otherwise the first discard pop eats the return address
/// instead of an argument and RET never finds its way back.
#[test]
fn call_and_return_restores_stack_and_sets_return() {
    let mut vm = Vm::new(256).unwrap();
    let initial_sp = vm.get_register(Register::Stack.index());

    // layout:
    //   0: CALL #6           (40 06 00 00 00)    -- call the subroutine at offset 6, pushes return address 5
    //   5: HALT              (00)                -- landed on after RET
    //   6: IR %null,%ret,#99 (20 F3 63 00 00 00)  -- %ret = 99
    //  12: PUSH %ret         (30 30)              -- subroutine pushes one local word on top of the return address
    //  14: RET #1            (41 01 00 00 00)     -- discard the local, pop the return address
    let mut code = vec![0x40, 0x06, 0x00, 0x00, 0x00];
    code.push(0x00);
    code.extend_from_slice(&[0x20, 0xF3, 99, 0x00, 0x00, 0x00]);
    code.extend_from_slice(&[0x30, 0x30]);
    code.extend_from_slice(&[0x41, 0x01, 0x00, 0x00, 0x00]);
    vm.load_code(&code).unwrap();

    let status = vm.execute(-1);
    assert_eq!(status, Status::Halt);
    assert_eq!(vm.get_register(Register::Return.index()), 99);
    assert_eq!(vm.get_register(Register::Stack.index()), initial_sp);
}

/// S5 - Syscall for time: `SYSCALL #0x02; HALT`.
#[test]
fn syscall_wallclock_reports_roughly_now() {
    let mut vm = Vm::new(256).unwrap();
    vm.load_code(&[0x44, 0x02, 0x00, 0x00, 0x00, 0x00]).unwrap();

    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;

    let status = vm.execute(-1);

    assert_eq!(status, Status::Halt);
    let reported = vm.get_register(Register::Return.index());
    assert!(reported >= before && reported <= before + 5);
}

/// S6 - Bounded step: 100 NOPs then HALT, stepped in two calls.
#[test]
fn bounded_then_unbounded_execute_completes_the_program() {
    let mut vm = Vm::new(256).unwrap();
    let mut code = vec![0x02u8; 100];
    code.push(0x00);
    vm.load_code(&code).unwrap();

    assert_eq!(vm.execute(10), Status::Ok);
    assert_eq!(vm.get_instruction_count(), 10);
    assert_eq!(vm.get_register(Register::Instruction.index()), 10);

    assert_eq!(vm.execute(-1), Status::Halt);
    assert_eq!(vm.get_instruction_count(), 101);
}

/// invariant 8 - `icount == 0` with status `Ok` performs zero dispatches.
#[test]
fn zero_icount_is_a_pure_no_op() {
    let mut vm = Vm::new(256).unwrap();
    vm.load_code(&[0x00]).unwrap();
    assert_eq!(vm.execute(0), Status::Ok);
    assert_eq!(vm.get_instruction_count(), 0);
}

/// pause is host-resumable; every other terminal status is not.
#[test]
fn pause_is_resumable_by_clearing_status_back_to_ok() {
    let mut vm = Vm::new(256).unwrap();
    vm.load_code(&[0x01, 0x00]).unwrap(); // PAUSE; HALT
    assert_eq!(vm.execute(-1), Status::Pause);
    assert_eq!(vm.get_instruction_count(), 1);

    vm.set_status_code(Status::Ok as u8);
    assert_eq!(vm.execute(-1), Status::Halt);
    assert_eq!(vm.get_instruction_count(), 2);
}

/// reloading code mid-life does not reset memory, registers, or the counter.
#[test]
fn reloading_code_preserves_memory_and_instruction_count() {
    let mut vm = Vm::new(256).unwrap();
    vm.load_code(&[0x02, 0x00]).unwrap(); // NOP; HALT
    vm.execute(-1);
    assert_eq!(vm.get_instruction_count(), 2);

    vm.set_status_code(Status::Ok as u8);
    vm.set_register(Register::Instruction.index(), 0);
    vm.set_register(Register::C1.index(), 0xABCD);
    vm.load_code(&[0x00]).unwrap(); // just HALT this time
    vm.execute(-1);

    assert_eq!(vm.get_instruction_count(), 3);
    assert_eq!(vm.get_register(Register::C1.index()), 0xABCD);
}
