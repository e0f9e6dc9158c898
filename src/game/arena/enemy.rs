use ggez::{
    graphics::{self, Color},
    Context, GameResult,
};
use glam::{vec2, Vec2};

use script_component::{
    host::{Host, Seconds},
    value::{self, Value},
};
use script_vm::{Cpu, RuntimeError};

use crate::constant;

use super::{sprite::Sprite, SceneDrawable};

/// A shot a script asked for, waiting for the arena to collect it.
pub struct FireRequest {
    pub pos: Value,
    pub vel: Value,
}

/// Scripted point mass. The VM owns the clock: threads call `tick`
/// themselves, the arena never integrates a body directly.
pub struct Body {
    pub pos: Value,
    pub vel: Value,
    acc: Value,
    max_speed: Option<f32>,
    pending: Vec<FireRequest>,
}

impl Body {
    pub fn new(pos: Value, vel: Value, max_speed: Option<f32>) -> Self {
        Body {
            pos,
            vel,
            acc: value::ZERO,
            max_speed,
            pending: Vec::new(),
        }
    }

    pub fn drain_shots(&mut self) -> Vec<FireRequest> {
        std::mem::take(&mut self.pending)
    }

    fn arg(args: &[Value]) -> Value {
        args.first().copied().unwrap_or(value::ZERO)
    }
}

impl Host for Body {
    fn tick(&mut self, dt: Seconds) {
        self.vel += self.acc * 0.99;
        if let Some(max) = self.max_speed {
            let speed = self.vel.length();
            if speed > max {
                self.vel *= max / speed;
            }
        }
        self.acc = value::ZERO;
        self.pos += self.vel * dt;
    }

    fn call(&mut self, op: &str, args: &[Value]) -> Option<Value> {
        match op {
            "accelerate" => {
                self.acc += Self::arg(args);
                Some(self.acc)
            }
            "set_vel" => {
                self.acc += Self::arg(args) - self.vel;
                Some(self.acc)
            }
            "move_toward" => {
                let force = args.get(1).map(|v| v.x).unwrap_or(1.0);
                let dir = (Self::arg(args) - self.pos).normalize_or_zero();
                self.acc += dir * (self.vel.length() * force);
                Some(self.acc)
            }
            "pos" => Some(self.pos),
            "vel" => Some(self.vel),
            "fire" => {
                let vel = if args.is_empty() {
                    vec2(0.0, constant::ENEMY_SHOT_SPEED)
                } else {
                    Self::arg(args)
                };
                let pos = self.pos + vec2(0.0, constant::ENEMY_HEIGHT * 0.5);
                self.pending.push(FireRequest { pos, vel });
                Some(value::ZERO)
            }
            _ => None,
        }
    }
}

pub struct Enemy {
    pub body: Body,
    pub cpu: Cpu,
    sprite: Sprite,
}

impl Enemy {
    pub fn new(pos: Vec2, vel: Vec2, max_speed: Option<f32>) -> Self {
        Enemy {
            body: Body::new(pos, vel, max_speed),
            cpu: Cpu::new(),
            sprite: Sprite::new(
                vec2(constant::ENEMY_WIDTH, constant::ENEMY_HEIGHT),
                Color::from_rgb(255, 0, 0),
            ),
        }
    }

    pub fn tick(&mut self, dt: Seconds) -> Result<(), RuntimeError> {
        self.cpu.tick(&mut self.body, dt)
    }

    pub fn rect(&self) -> graphics::Rect {
        self.sprite.rect(self.body.pos)
    }
}

impl SceneDrawable for Enemy {
    fn draw(&self, ctx: &mut Context, canvas: &mut graphics::Canvas) -> GameResult<()> {
        self.sprite.draw(ctx, canvas, self.body.pos)
    }
}

pub struct EnemyShot {
    pub pos: Vec2,
    pub vel: Vec2,
    sprite: Sprite,
}

impl EnemyShot {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        EnemyShot {
            pos,
            vel,
            sprite: Sprite::new(
                vec2(constant::SHOT_WIDTH, constant::SHOT_HEIGHT),
                Color::from_rgb(255, 200, 0),
            ),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

impl SceneDrawable for EnemyShot {
    fn draw(&self, ctx: &mut Context, canvas: &mut graphics::Canvas) -> GameResult<()> {
        self.sprite.draw(ctx, canvas, self.pos)
    }
}
