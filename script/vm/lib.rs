pub mod cpu;
pub mod error;
pub mod thread;

pub use cpu::*;
pub use error::*;
pub use thread::*;
