use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    Nop,
    // control flows
    Label(String), // runtime no-op, kept for trace output
    Pause,
    Resume,
    Halt,
    Repeat,
    Br,
    Jmp,
    Yield,
    YieldTo,
    Sleep,
    // stack operations
    Pop,
    Push,
    Dup,
    Const(Value),
    // arithmetics
    Rand,
    Inv,
    Add,
    Sub,
    Mul,
    Div,
    Abs,
    Norm,
    Normal,
    Rotate,
    // host calls
    Call(String, Vec<Value>),
    Acc,
}

/// Operand of a [`Stmt`], written inline next to its opcode. Marks are
/// label names resolved to addresses at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Val(Value),
    Mark(String),
}

impl Arg {
    pub fn mark(name: &str) -> Self {
        Arg::Mark(name.to_string())
    }
}

impl From<f32> for Arg {
    fn from(n: f32) -> Self {
        Arg::Val(Value::splat(n))
    }
}

impl From<(f32, f32)> for Arg {
    fn from((x, y): (f32, f32)) -> Self {
        Arg::Val(Value::new(x, y))
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Val(v)
    }
}

/// One authored line of a script: an opcode plus inline operands, as
/// written. The assembler expands operands into leading `const`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub inst: Inst,
    pub args: Vec<Arg>,
}

impl Stmt {
    pub fn bare(inst: Inst) -> Self {
        Stmt { inst, args: Vec::new() }
    }

    pub fn with(inst: Inst, args: Vec<Arg>) -> Self {
        Stmt { inst, args }
    }

    pub fn label(name: &str) -> Self {
        Stmt::bare(Inst::Label(name.to_string()))
    }

    pub fn call(op: &str, args: Vec<Value>) -> Self {
        Stmt::bare(Inst::Call(op.to_string(), args))
    }
}
