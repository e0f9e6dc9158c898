use crate::value::Value;

pub type Seconds = f32;

/// The entity a thread drives. The VM owns the clock: `tick` runs the
/// host's own per-frame update, `call` dispatches named operations.
///
/// `call` returns `None` for an operation it does not know; the VM
/// treats that as a fatal scripting error, never as a no-op.
pub trait Host {
    fn tick(&mut self, dt: Seconds);
    fn call(&mut self, op: &str, args: &[Value]) -> Option<Value>;
}
