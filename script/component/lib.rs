pub mod host;
pub mod inst;
pub mod program;
pub mod value;
