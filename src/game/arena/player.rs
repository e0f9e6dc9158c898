use ggez::{
    graphics::{self, Color},
    Context, GameResult,
};
use glam::{vec2, Vec2};

use crate::constant;

use super::{sprite::Sprite, SceneDrawable};

#[derive(Debug, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub shot: bool,
}

pub struct Shot {
    pub pos: Vec2,
    sprite: Sprite,
}

impl Shot {
    fn new(pos: Vec2) -> Self {
        Shot {
            pos,
            sprite: Sprite::new(
                vec2(constant::SHOT_WIDTH, constant::SHOT_HEIGHT),
                Color::WHITE,
            ),
        }
    }

    pub fn rect(&self) -> graphics::Rect {
        self.sprite.rect(self.pos)
    }
}

impl SceneDrawable for Shot {
    fn draw(&self, ctx: &mut Context, canvas: &mut graphics::Canvas) -> GameResult<()> {
        self.sprite.draw(ctx, canvas, self.pos)
    }
}

pub struct Player {
    pub pos: Vec2,
    pub shots: Vec<Shot>,
    pub input: InputState,
    sprite: Sprite,
}

impl Player {
    pub fn new() -> Self {
        Player {
            pos: vec2(
                constant::WIDTH * 0.5,
                constant::HEIGHT - constant::PLAYER_HEIGHT * 0.5 - 10.0,
            ),
            shots: Vec::new(),
            input: InputState::default(),
            sprite: Sprite::new(
                vec2(constant::PLAYER_WIDTH, constant::PLAYER_HEIGHT),
                Color::from_rgb(0, 128, 255),
            ),
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.input.left {
            self.pos.x -= constant::PLAYER_SPEED * dt;
        }
        if self.input.right {
            self.pos.x += constant::PLAYER_SPEED * dt;
        }
        let half = constant::PLAYER_WIDTH * 0.5;
        self.pos.x = self.pos.x.clamp(half, constant::WIDTH - half);

        if self.input.shot {
            self.fire();
            self.input.shot = false;
        }

        for shot in self.shots.iter_mut() {
            shot.pos.y -= constant::SHOT_SPEED * dt;
        }
        self.shots.retain(|shot| shot.pos.y > -constant::SHOT_HEIGHT);
    }

    fn fire(&mut self) {
        let nose = self.pos - vec2(0.0, constant::PLAYER_HEIGHT * 0.5);
        log::debug!("player shot from ({:.0}, {:.0})", nose.x, nose.y);
        self.shots.push(Shot::new(nose));
    }
}

impl SceneDrawable for Player {
    fn draw(&self, ctx: &mut Context, canvas: &mut graphics::Canvas) -> GameResult<()> {
        self.sprite.draw(ctx, canvas, self.pos)?;
        for shot in self.shots.iter() {
            shot.draw(ctx, canvas)?;
        }

        Ok(())
    }
}
