use std::collections::HashMap;

use script_component::{
    inst::{Arg, Inst, Stmt},
    program::Program,
    value::{self, Value},
};

/// Assembles authored statements into a runnable [`Program`].
///
/// Two passes. The first lays out addresses and records label targets,
/// the second emits instructions and resolves marks. Label targets are
/// the address *after* the label's own slot, so jumping to a label
/// lands on the instruction following it. Inline operands expand into
/// leading `const`s in written order: the first operand lands deepest
/// on the stack and is popped last, so `("sub", a, b)` computes a - b.
///
/// Assembly never fails. An unresolved mark becomes address 0 with a
/// warning, which keeps content bugs visible without killing the game.
pub fn assemble(name: &str, stmts: &[Stmt]) -> Program {
    let mut labels = HashMap::new();
    let mut addr = 0;
    for stmt in stmts.iter() {
        match &stmt.inst {
            Inst::Label(mark) => {
                labels.insert(mark.clone(), addr + 1);
                addr += 1;
            }
            Inst::Const(_) | Inst::Call(_, _) => addr += 1,
            _ => addr += stmt.args.len() + 1,
        }
    }

    let mut insts = Vec::with_capacity(addr);
    for stmt in stmts.iter() {
        match &stmt.inst {
            Inst::Label(_) | Inst::Const(_) | Inst::Call(_, _) => insts.push(stmt.inst.clone()),
            inst => {
                for arg in stmt.args.iter() {
                    insts.push(Inst::Const(resolve(name, arg, &labels)));
                }
                insts.push(inst.clone());
            }
        }
    }

    Program::new(name, insts, labels)
}

fn resolve(program: &str, arg: &Arg, labels: &HashMap<String, usize>) -> Value {
    match arg {
        Arg::Val(v) => *v,
        Arg::Mark(mark) => match labels.get(mark) {
            Some(addr) => Value::splat(*addr as f32),
            None => {
                log::warn!("'{}': unresolved mark '{}', assembling to 0", program, mark);
                value::ZERO
            }
        },
    }
}
