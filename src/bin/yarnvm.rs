// command-line driver: loads an assembled object file and runs it to
// completion, printing the register file and status after every `execute`
// call. Built entirely on yarnvm's public embedding interface; this binary
// knows nothing about opcodes or memory layout beyond what `Vm` exposes.

use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use yarnvm::{Register, Status, Vm};

/// default linear memory size: 256 words, matching the reference
/// implementation's standalone driver.
const DEFAULT_MEMSIZE: u32 = 256 * 4;

const ALL_REGISTERS: [Register; 16] = [
    Register::Instruction,
    Register::Stack,
    Register::Base,
    Register::Return,
    Register::C1,
    Register::C2,
    Register::C3,
    Register::C4,
    Register::C5,
    Register::C6,
    Register::S1,
    Register::S2,
    Register::S3,
    Register::S4,
    Register::S5,
    Register::Null,
];

/// run an assembled yarnvm object file.
#[derive(Parser)]
#[command(name = "yarnvm", about = "Run an assembled yarnvm bytecode object file")]
struct Args {
    /// path to the assembled object file
    file: PathBuf,

    /// stop after this many instructions on the first `execute` call
    /// (default: run unbounded)
    #[arg(short = 'c', long = "icount")]
    icount: Option<i64>,

    /// dump the VM's raw memory buffer to this path on exit
    #[arg(short = 'm', long = "memdump")]
    memdump: Option<PathBuf>,

    /// linear memory size in bytes
    #[arg(long, default_value_t = DEFAULT_MEMSIZE)]
    memsize: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let code = std::fs::read(&args.file)
        .with_context(|| format!("reading object file {}", args.file.display()))?;

    let mut vm = Vm::new(args.memsize).context("constructing VM")?;
    vm.load_code(&code).context("loading code")?;

    let icount = args.icount.unwrap_or(-1);
    let mut status = Status::Ok;
    while status == Status::Ok {
        status = vm.execute(icount);
        print_program_status(&mut vm, status);

        if status == Status::Pause {
            print!("program paused, hit enter to continue... ");
            io::stdout().flush().ok();
            let mut line = String::new();
            io::stdin().read_line(&mut line).context("reading from stdin")?;
            vm.set_status_code(Status::Ok as u8);
            status = Status::Ok;
        }
    }

    if let Some(path) = &args.memdump {
        std::fs::write(path, vm.get_memory_ptr())
            .with_context(|| format!("writing memory dump to {}", path.display()))?;
        println!("wrote memory dump to {}", path.display());
    }

    Ok(())
}

fn print_program_status(vm: &mut Vm, status: Status) {
    for reg in ALL_REGISTERS {
        println!(
            "{:>5} = {:#010x}",
            yarnvm::register_to_string(reg.index()),
            vm.get_register(reg.index())
        );
    }
    println!(
        "status = {} ({})",
        status as u8,
        yarnvm::status_to_string(status as u8)
    );
    println!("instructions executed = {}", vm.get_instruction_count());
    println!();
}
