use std::collections::HashMap;
use std::rc::Rc;

use script_component::{
    inst::{Arg, Inst, Stmt},
    program::Program,
    value::Value,
};
use script_compiler::assemble;

use crate::constant;

/// Every behavior the arena can hand to an enemy, assembled once at boot.
pub struct Scripts {
    by_name: HashMap<String, Rc<Program>>,
}

impl Scripts {
    pub fn assemble_all() -> Self {
        let mut by_name = HashMap::new();
        for (name, stmts) in [
            ("weave", weave()),
            ("strafe", strafe()),
            ("gunner", gunner()),
        ] {
            by_name.insert(name.to_string(), Rc::new(assemble(name, &stmts)));
        }
        Scripts { by_name }
    }

    pub fn get(&self, name: &str) -> Rc<Program> {
        self.by_name[name].clone()
    }
}

/// Drifts side to side while sinking, retuning course every 1.5s.
fn weave() -> Vec<Stmt> {
    vec![
        Stmt::with(Inst::Rand, vec![(-100.0, 0.0).into(), (100.0, 0.0).into()]),
        Stmt::bare(Inst::Acc),
        Stmt::with(Inst::Sleep, vec![1.5.into()]),
        Stmt::with(Inst::Rand, vec![(0.0, -15.0).into(), (0.0, 75.0).into()]),
        Stmt::bare(Inst::Acc),
        Stmt::with(Inst::Sleep, vec![1.5.into()]),
    ]
}

/// Steers away from the screen center, then hands the body to the gunner.
fn strafe() -> Vec<Stmt> {
    vec![
        Stmt::label("scan"),
        Stmt::call("pos", vec![]),
        Stmt::bare(Inst::Push),
        Stmt::with(Inst::Sub, vec![(constant::WIDTH * 0.5, 0.0).into()]),
        Stmt::with(Inst::Br, vec![Arg::mark("left")]),
        Stmt::call("set_vel", vec![Value::new(90.0, 45.0)]),
        Stmt::with(Inst::Jmp, vec![Arg::mark("wait")]),
        Stmt::label("left"),
        Stmt::call("set_vel", vec![Value::new(-90.0, 45.0)]),
        Stmt::label("wait"),
        Stmt::with(Inst::Sleep, vec![0.8.into()]),
        Stmt::with(Inst::YieldTo, vec![1.0.into()]),
        Stmt::with(Inst::Jmp, vec![Arg::mark("scan")]),
    ]
}

/// Sleeps until the strafe thread yields, fires a volley, yields back.
fn gunner() -> Vec<Stmt> {
    vec![
        Stmt::bare(Inst::Pause),
        Stmt::label("aim"),
        Stmt::call("fire", vec![Value::new(0.0, constant::ENEMY_SHOT_SPEED)]),
        Stmt::with(Inst::Sleep, vec![0.6.into()]),
        Stmt::with(Inst::YieldTo, vec![0.0.into()]),
        Stmt::with(Inst::Jmp, vec![Arg::mark("aim")]),
    ]
}
