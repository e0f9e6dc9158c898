use glam::const_vec2;
use rand::Rng;

/// Every stack slot and operand is a 2D vector. Scalars travel as
/// splatted vectors and read back through their x component.
pub type Value = glam::Vec2;

pub const ZERO: Value = Value::ZERO;
pub const ONE: Value = Value::ONE;
pub const NEG_ONE: Value = const_vec2!([-1.0, -1.0]);

/// Component-wise uniform pick between `lo` and `hi`.
pub fn random(lo: Value, hi: Value, rng: &mut impl Rng) -> Value {
    let tx: f32 = rng.gen();
    let ty: f32 = rng.gen();
    Value::new(
        lo.x * (1.0 - tx) + hi.x * tx,
        lo.y * (1.0 - ty) + hi.y * ty,
    )
}

pub fn rotate_deg(v: Value, deg: f32) -> Value {
    let (sin, cos) = deg.to_radians().sin_cos();
    Value::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}
