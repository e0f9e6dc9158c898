use std::{collections::VecDeque, rc::Rc};

use rand::{rngs::SmallRng, SeedableRng};

use script_component::{
    host::{Host, Seconds},
    inst::Inst,
    program::Program,
    value::{self, Value},
};

use crate::error::RuntimeError;

/// What a thread asks of its owner after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    None,
    Yield,
    YieldTo(usize),
}

/// One instruction stream over a shared [`Program`], with its own
/// pointer, stack, sleep countdown and random stream.
pub struct Thread {
    name: String,
    program: Rc<Program>,
    ip: usize,
    addr: usize,
    stack: VecDeque<Value>,
    sleep: Seconds,
    rng: SmallRng,
    result: Value,
    running: bool,
    halted: bool,
}

impl Thread {
    pub const STACK_MAX: usize = 32;

    pub fn new(name: &str, program: Rc<Program>, seed: u64) -> Self {
        Thread {
            name: name.to_string(),
            program,
            ip: 0,
            addr: 0,
            stack: VecDeque::with_capacity(Self::STACK_MAX),
            sleep: 0.0,
            rng: SmallRng::seed_from_u64(seed),
            result: value::ZERO,
            running: true,
            halted: false,
        }
    }

    /// Advances the thread by one external tick.
    ///
    /// A halted thread does nothing at all. Otherwise the sleep
    /// countdown burns first, the host integrates with the full `dt`,
    /// and then, if the thread is awake and not paused, exactly one
    /// instruction executes. Waking mid-tick does not cost a frame:
    /// the overshoot makes the thread eligible in this same tick.
    pub fn tick(&mut self, host: &mut dyn Host, dt: Seconds) -> Result<Request, RuntimeError> {
        if self.halted {
            return Ok(Request::None);
        }

        let awake = self.burn_sleep(dt);
        host.tick(dt);

        if !awake || !self.running {
            return Ok(Request::None);
        }

        let program = Rc::clone(&self.program);
        if program.is_empty() {
            return Ok(Request::None);
        }

        let addr = self.ip;
        self.addr = addr;
        self.ip += 1;
        if self.ip >= program.len() {
            self.ip = 0;
        }

        let inst = match program.get(addr) {
            Some(inst) => inst,
            None => {
                return Err(RuntimeError::OutOfProgram {
                    thread: self.name.clone(),
                    program: program.name().to_string(),
                    addr,
                })
            }
        };

        log::trace!(
            "{}/{} @{}: {:?}, stack = {:?}",
            program.name(),
            self.name,
            addr,
            inst,
            self.stack
        );

        self.exec(addr, inst, host)
    }

    fn burn_sleep(&mut self, dt: Seconds) -> bool {
        if self.sleep > 0.0 {
            self.sleep -= dt;
            if self.sleep > 0.0 {
                return false;
            }
            // the wake overshoot stays in this tick
            self.sleep = 0.0;
        }
        true
    }

    fn exec(&mut self, addr: usize, inst: &Inst, host: &mut dyn Host) -> Result<Request, RuntimeError> {
        match inst {
            Inst::Nop | Inst::Label(_) => (),

            Inst::Pause => self.pause(),
            Inst::Resume => self.resume(),
            Inst::Halt => self.halt(),
            Inst::Repeat => self.ip = 0,
            Inst::Br => {
                let target = self.pop(value::ZERO);
                let cond = self.pop(value::ZERO);
                if cond.x > 0.0 {
                    self.ip = self.wrap(target.x);
                }
            }
            Inst::Jmp => {
                let target = self.pop(value::ZERO);
                self.ip = self.wrap(target.x);
            }
            Inst::Yield => return Ok(Request::Yield),
            Inst::YieldTo => {
                let target = self.pop(value::ZERO);
                return Ok(Request::YieldTo(target.x as usize));
            }
            Inst::Sleep => self.sleep = self.pop(value::ZERO).x.max(0.0),

            Inst::Pop => {
                if let Some(top) = self.stack.pop_back() {
                    self.result = top;
                }
            }
            Inst::Push => self.push(self.result),
            Inst::Dup => {
                if let Some(top) = self.stack.back().copied() {
                    self.push(top);
                }
            }
            Inst::Const(v) => self.push(*v),

            Inst::Rand => {
                let b = self.pop(value::NEG_ONE);
                let a = self.pop(value::ONE);
                let r = value::random(b, a, &mut self.rng);
                self.push(r);
            }
            Inst::Inv => {
                let v = self.pop(value::ZERO);
                self.push(-v);
            }
            Inst::Add => {
                let (a, b) = self.pop2(value::ZERO);
                self.push(a + b);
            }
            Inst::Sub => {
                let (a, b) = self.pop2(value::ZERO);
                self.push(a - b);
            }
            Inst::Mul => {
                let (a, b) = self.pop2(value::ONE);
                self.push(a * b);
            }
            Inst::Div => {
                let (a, b) = self.pop2(value::ONE);
                // a zero divisor component divides by one instead
                let b = Value::new(
                    if b.x == 0.0 { 1.0 } else { b.x },
                    if b.y == 0.0 { 1.0 } else { b.y },
                );
                self.push(a / b);
            }
            Inst::Abs => {
                let v = self.pop(value::ZERO);
                self.push(v.abs());
            }
            Inst::Norm => {
                let v = self.pop(value::ZERO);
                self.push(Value::splat(v.length()));
            }
            Inst::Normal => {
                let v = self.pop(value::ZERO);
                self.push(v.normalize_or_zero());
            }
            Inst::Rotate => {
                let angle = self.pop(value::ZERO);
                let v = self.pop(value::ZERO);
                self.push(value::rotate_deg(v, angle.x));
            }

            Inst::Call(op, args) => match host.call(op, args) {
                Some(ret) => self.result = ret,
                None => return Err(self.unknown_op(addr, inst, op)),
            },
            Inst::Acc => {
                let a = self.pop(value::ZERO);
                match host.call("accelerate", &[a]) {
                    Some(ret) => self.result = ret,
                    None => return Err(self.unknown_op(addr, inst, "accelerate")),
                }
            }
        }

        Ok(Request::None)
    }

    fn unknown_op(&self, addr: usize, inst: &Inst, op: &str) -> RuntimeError {
        RuntimeError::UnknownHostOp {
            thread: self.name.clone(),
            program: self.program.name().to_string(),
            addr,
            inst: inst.clone(),
            op: op.to_string(),
        }
    }

    fn push(&mut self, v: Value) {
        if self.stack.len() == Self::STACK_MAX {
            // oldest entry gives way
            self.stack.pop_front();
        }
        self.stack.push_back(v);
    }

    fn pop(&mut self, default: Value) -> Value {
        self.stack.pop_back().unwrap_or(default)
    }

    fn pop2(&mut self, default: Value) -> (Value, Value) {
        let b = self.pop(default);
        let a = self.pop(default);
        (a, b)
    }

    fn wrap(&self, target: f32) -> usize {
        let len = self.program.len();
        if len == 0 {
            0
        } else {
            target.abs() as usize % len
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        // halt is forever
        if !self.halted {
            self.running = true;
        }
    }

    pub fn halt(&mut self) {
        self.running = false;
        self.halted = true;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Address of the most recently fetched instruction.
    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn sleep(&self) -> Seconds {
        self.sleep
    }

    pub fn stack(&self) -> &VecDeque<Value> {
        &self.stack
    }

    pub fn result(&self) -> Value {
        self.result
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn halted(&self) -> bool {
        self.halted
    }
}

#[cfg(test)]
mod thread_test {
    use std::collections::HashMap;

    use super::*;

    struct TestHost {
        ticks: Vec<Seconds>,
        calls: Vec<(String, Vec<Value>)>,
    }

    impl TestHost {
        fn new() -> Self {
            TestHost { ticks: Vec::new(), calls: Vec::new() }
        }
    }

    impl Host for TestHost {
        fn tick(&mut self, dt: Seconds) {
            self.ticks.push(dt);
        }

        fn call(&mut self, op: &str, args: &[Value]) -> Option<Value> {
            self.calls.push((op.to_string(), args.to_vec()));
            match op {
                "pos" => Some(Value::new(3.0, 4.0)),
                "accelerate" => Some(args.first().copied().unwrap_or(value::ZERO)),
                _ => None,
            }
        }
    }

    fn program(insts: Vec<Inst>) -> Rc<Program> {
        Rc::new(Program::new("test", insts, HashMap::new()))
    }

    fn thread(insts: Vec<Inst>) -> Thread {
        Thread::new("t0", program(insts), 7)
    }

    #[test]
    fn one_instruction_per_tick_and_ip_wraps() {
        let mut t = thread(vec![Inst::Nop, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 1);
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 0);
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 1);
    }

    #[test]
    fn empty_program_never_fetches() {
        let mut t = thread(vec![]);
        let mut host = TestHost::new();

        for _ in 0..3 {
            t.tick(&mut host, 0.016).unwrap();
        }
        assert_eq!(t.ip(), 0);
        assert_eq!(host.ticks.len(), 3);
    }

    #[test]
    fn sleep_gates_fetch_but_the_host_keeps_ticking() {
        let mut t = thread(vec![Inst::Const(Value::splat(1.0)), Inst::Sleep, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.4).unwrap();
        t.tick(&mut host, 0.4).unwrap();
        assert_eq!(t.sleep(), 1.0);

        t.tick(&mut host, 0.4).unwrap();
        t.tick(&mut host, 0.4).unwrap();
        assert_eq!(t.ip(), 2);
        assert_eq!(host.ticks.len(), 4);
        assert!(t.sleep() > 0.0);
    }

    #[test]
    fn waking_executes_in_the_same_tick() {
        let mut t = thread(vec![Inst::Const(Value::splat(0.05)), Inst::Sleep, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.1).unwrap();
        t.tick(&mut host, 0.1).unwrap();
        assert_eq!(t.ip(), 2);

        // 0.05 left to sleep, 0.1 arrives: wake and run the nop now
        t.tick(&mut host, 0.1).unwrap();
        assert_eq!(t.sleep(), 0.0);
        assert_eq!(t.ip(), 0);
    }

    #[test]
    fn sleep_time_is_conserved_across_ticks() {
        let mut t = thread(vec![Inst::Const(Value::splat(0.75)), Inst::Sleep]);
        let mut host = TestHost::new();

        let mut executed = 0;
        for _ in 0..40 {
            let before = t.ip();
            t.tick(&mut host, 0.25).unwrap();
            if t.ip() != before {
                executed += 1;
            }
        }

        // period of four ticks: const, sleep, then two asleep
        assert_eq!(executed, 20);
        assert_eq!(t.sleep(), 0.25);
        assert_eq!(host.ticks.len(), 40);
    }

    #[test]
    fn negative_sleep_clamps_to_zero() {
        let mut t = thread(vec![Inst::Const(Value::splat(-2.0)), Inst::Sleep, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.sleep(), 0.0);
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 0);
    }

    #[test]
    fn halt_stops_everything_for_good() {
        let mut t = thread(vec![Inst::Halt, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        assert!(t.halted());
        assert!(!t.running());

        t.tick(&mut host, 0.016).unwrap();
        t.resume();
        t.tick(&mut host, 0.016).unwrap();
        assert!(!t.running());
        assert_eq!(t.ip(), 1);
        assert_eq!(host.ticks.len(), 1);
    }

    #[test]
    fn pause_gates_fetch_while_sleep_still_burns() {
        let mut t = thread(vec![Inst::Const(Value::splat(0.5)), Inst::Sleep, Inst::Nop, Inst::Nop]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.25).unwrap();
        t.tick(&mut host, 0.25).unwrap();
        t.pause();

        t.tick(&mut host, 0.25).unwrap();
        t.tick(&mut host, 0.25).unwrap();
        assert_eq!(t.sleep(), 0.0);
        assert_eq!(t.ip(), 2);
        assert_eq!(host.ticks.len(), 4);

        t.resume();
        t.tick(&mut host, 0.25).unwrap();
        assert_eq!(t.ip(), 3);
    }

    #[test]
    fn jmp_wraps_raw_targets_into_the_program() {
        let mut t = thread(vec![
            Inst::Const(Value::splat(12.0)),
            Inst::Jmp,
            Inst::Nop,
            Inst::Nop,
            Inst::Nop,
        ]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 2);

        let mut t = thread(vec![
            Inst::Const(Value::splat(-7.0)),
            Inst::Jmp,
            Inst::Nop,
            Inst::Nop,
            Inst::Nop,
        ]);
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.ip(), 2);
    }

    #[test]
    fn br_jumps_on_positive_x_only() {
        let taken = |cond| {
            let mut t = thread(vec![
                Inst::Const(cond),
                Inst::Const(Value::splat(4.0)),
                Inst::Br,
                Inst::Nop,
                Inst::Nop,
            ]);
            let mut host = TestHost::new();
            for _ in 0..3 {
                t.tick(&mut host, 0.016).unwrap();
            }
            t.ip()
        };

        assert_eq!(taken(Value::new(1.0, 0.0)), 4);
        assert_eq!(taken(Value::new(0.0, 5.0)), 3);
        assert_eq!(taken(Value::new(-1.0, 0.0)), 3);
    }

    #[test]
    fn repeat_rewinds_to_the_top() {
        let mut t = thread(vec![Inst::Nop, Inst::Repeat, Inst::Nop]);
        let mut host = TestHost::new();

        for _ in 0..5 {
            t.tick(&mut host, 0.016).unwrap();
        }
        // addresses 0 and 1 alternate, 2 is never reached
        assert!(t.addr() < 2);
    }

    #[test]
    fn pop_saves_the_result_and_push_restores_it() {
        let mut t = thread(vec![Inst::Const(Value::new(2.0, 3.0)), Inst::Pop, Inst::Push]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.result(), Value::new(2.0, 3.0));
        assert!(t.stack().is_empty());

        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::new(2.0, 3.0)));
    }

    #[test]
    fn pop_on_an_empty_stack_keeps_the_old_result() {
        let mut t = thread(vec![Inst::Pop]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.result(), value::ZERO);
    }

    #[test]
    fn dup_duplicates_the_top_and_skips_empty_stacks() {
        let mut t = thread(vec![Inst::Const(Value::new(1.0, 2.0)), Inst::Dup]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().len(), 2);

        let mut t = thread(vec![Inst::Dup]);
        t.tick(&mut host, 0.016).unwrap();
        assert!(t.stack().is_empty());
    }

    #[test]
    fn the_stack_is_bounded_and_drops_the_oldest() {
        let insts: Vec<Inst> = (0..40)
            .map(|i| Inst::Const(Value::splat(i as f32)))
            .collect();
        let mut t = thread(insts);
        let mut host = TestHost::new();

        for _ in 0..40 {
            t.tick(&mut host, 0.016).unwrap();
        }
        assert_eq!(t.stack().len(), Thread::STACK_MAX);
        assert_eq!(t.stack().front(), Some(&Value::splat(8.0)));
        assert_eq!(t.stack().back(), Some(&Value::splat(39.0)));
    }

    #[test]
    fn rand_is_bounded_and_seed_deterministic() {
        let insts = vec![
            Inst::Const(Value::new(-5.0, -5.0)),
            Inst::Const(Value::new(5.0, 5.0)),
            Inst::Rand,
        ];
        let mut a = Thread::new("a", program(insts.clone()), 42);
        let mut b = Thread::new("b", program(insts), 42);
        let mut host = TestHost::new();

        for _ in 0..3 {
            a.tick(&mut host, 0.016).unwrap();
            b.tick(&mut host, 0.016).unwrap();
        }
        let v = *a.stack().back().unwrap();
        assert_eq!(a.stack().back(), b.stack().back());
        assert!((-5.0..=5.0).contains(&v.x));
        assert!((-5.0..=5.0).contains(&v.y));
    }

    #[test]
    fn rand_defaults_span_the_unit_box() {
        let mut t = thread(vec![Inst::Rand]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        let v = *t.stack().back().unwrap();
        assert!((-1.0..=1.0).contains(&v.x));
        assert!((-1.0..=1.0).contains(&v.y));
    }

    #[test]
    fn add_and_sub_default_missing_operands_to_zero() {
        let mut t = thread(vec![Inst::Add]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&value::ZERO));

        let mut t = thread(vec![Inst::Const(Value::new(4.0, 5.0)), Inst::Sub]);
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        // lone operand is popped first and becomes the subtrahend
        assert_eq!(t.stack().back(), Some(&Value::new(-4.0, -5.0)));
    }

    #[test]
    fn mul_and_div_default_missing_operands_to_one() {
        let mut t = thread(vec![Inst::Mul]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&value::ONE));

        let mut t = thread(vec![Inst::Const(Value::new(8.0, 9.0)), Inst::Div]);
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::new(1.0 / 8.0, 1.0 / 9.0)));
    }

    #[test]
    fn div_substitutes_one_for_zero_divisor_components() {
        let mut t = thread(vec![
            Inst::Const(Value::new(8.0, 9.0)),
            Inst::Const(Value::new(2.0, 0.0)),
            Inst::Div,
        ]);
        let mut host = TestHost::new();
        for _ in 0..3 {
            t.tick(&mut host, 0.016).unwrap();
        }
        assert_eq!(t.stack().back(), Some(&Value::new(4.0, 9.0)));
    }

    #[test]
    fn inv_negates_and_abs_rectifies() {
        let mut t = thread(vec![Inst::Const(Value::new(2.0, -3.0)), Inst::Inv]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::new(-2.0, 3.0)));

        let mut t = thread(vec![Inst::Const(Value::new(-2.0, 3.0)), Inst::Abs]);
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::new(2.0, 3.0)));
    }

    #[test]
    fn norm_splats_the_length_and_normal_scales_to_unit() {
        let mut t = thread(vec![Inst::Const(Value::new(3.0, 4.0)), Inst::Norm]);
        let mut host = TestHost::new();
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::splat(5.0)));

        let mut t = thread(vec![Inst::Const(Value::new(3.0, 4.0)), Inst::Normal]);
        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        let v = *t.stack().back().unwrap();
        assert!((v - Value::new(0.6, 0.8)).length() < 1e-6);

        // a zero vector stays put instead of going NaN
        let mut t = thread(vec![Inst::Normal]);
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&value::ZERO));
    }

    #[test]
    fn rotate_takes_degrees_from_x() {
        let mut t = thread(vec![
            Inst::Const(Value::new(1.0, 0.0)),
            Inst::Const(Value::splat(90.0)),
            Inst::Rotate,
        ]);
        let mut host = TestHost::new();
        for _ in 0..3 {
            t.tick(&mut host, 0.016).unwrap();
        }
        let v = *t.stack().back().unwrap();
        assert!((v - Value::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn call_records_its_result_and_reaches_the_host() {
        let mut t = thread(vec![Inst::Call("pos".to_string(), vec![]), Inst::Push]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.result(), Value::new(3.0, 4.0));
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.stack().back(), Some(&Value::new(3.0, 4.0)));
        assert_eq!(host.calls, vec![("pos".to_string(), vec![])]);
    }

    #[test]
    fn acc_pops_the_acceleration_and_calls_the_host() {
        let mut t = thread(vec![Inst::Const(Value::new(1.0, 2.0)), Inst::Acc]);
        let mut host = TestHost::new();

        t.tick(&mut host, 0.016).unwrap();
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(
            host.calls,
            vec![("accelerate".to_string(), vec![Value::new(1.0, 2.0)])]
        );
        assert_eq!(t.result(), Value::new(1.0, 2.0));
    }

    #[test]
    fn unknown_host_operations_are_fatal() {
        let mut t = thread(vec![Inst::Call("warp".to_string(), vec![])]);
        let mut host = TestHost::new();

        let err = t.tick(&mut host, 0.016).unwrap_err();
        match err {
            RuntimeError::UnknownHostOp { thread, program, addr, op, .. } => {
                assert_eq!(thread, "t0");
                assert_eq!(program, "test");
                assert_eq!(addr, 0);
                assert_eq!(op, "warp");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn yield_requests_surface_to_the_owner() {
        let mut t = thread(vec![Inst::Yield]);
        let mut host = TestHost::new();
        assert_eq!(t.tick(&mut host, 0.016).unwrap(), Request::Yield);

        let mut t = thread(vec![Inst::Const(Value::splat(1.0)), Inst::YieldTo]);
        t.tick(&mut host, 0.016).unwrap();
        assert_eq!(t.tick(&mut host, 0.016).unwrap(), Request::YieldTo(1));
    }
}
