use script_component::inst::Inst;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown host operation '{op}' (thread '{thread}', program '{program}', addr {addr}, inst {inst:?})")]
    UnknownHostOp {
        thread: String,
        program: String,
        addr: usize,
        inst: Inst,
        op: String,
    },
    #[error("yield to nonexistent thread {target} (thread '{thread}', program '{program}', addr {addr})")]
    NoSuchThread {
        thread: String,
        program: String,
        addr: usize,
        target: usize,
    },
    #[error("instruction fetch ran off the program (thread '{thread}', program '{program}', addr {addr})")]
    OutOfProgram {
        thread: String,
        program: String,
        addr: usize,
    },
}
