use ggez::{
    event::EventHandler,
    graphics::{self, Color, DrawParam},
    input::keyboard::{KeyCode, KeyInput},
    Context, GameError, GameResult,
};
use glam::vec2;
use rand::Rng;

mod enemy;
mod player;
mod scripts;
mod sprite;

use crate::{constant, game::Scene};

use enemy::{Enemy, EnemyShot};
use player::Player;
use scripts::Scripts;

trait SceneDrawable {
    fn draw(&self, ctx: &mut Context, canvas: &mut graphics::Canvas) -> GameResult<()>;
}

pub enum Input {
    Left,
    Right,
    Shot,
}

pub struct ArenaScene {
    player: Player,
    enemies: Vec<Enemy>,
    enemy_shots: Vec<EnemyShot>,
    scripts: Scripts,
    spawn_timer: f32,
    spawned: usize,
}

impl ArenaScene {
    pub fn new() -> Self {
        ArenaScene {
            player: Player::new(),
            enemies: Vec::new(),
            enemy_shots: Vec::new(),
            scripts: Scripts::assemble_all(),
            spawn_timer: 0.0,
            spawned: 0,
        }
    }

    fn clear_input(&mut self) {
        // the shot flag latches from key_down_event until consumed
        self.player.input.left = false;
        self.player.input.right = false;
    }

    fn input(&mut self, input: &Input) {
        match input {
            Input::Left => self.player.input.left = true,
            Input::Right => self.player.input.right = true,
            Input::Shot => self.player.input.shot = true,
        }
    }

    fn spawn_enemy(&mut self) {
        let mut rng = rand::thread_rng();
        let half = constant::ENEMY_WIDTH * 0.5;
        let pos = vec2(
            rng.gen_range(half..=constant::WIDTH - half),
            -constant::ENEMY_HEIGHT * 0.5,
        );

        let enemy = if self.spawned % 2 == 0 {
            let mut enemy = Enemy::new(pos, vec2(0.0, constant::ENEMY_SPEED), None);
            enemy.cpu.spawn("weave", self.scripts.get("weave"), rng.gen());
            log::debug!("weaver up at ({:.0}, {:.0})", pos.x, pos.y);
            enemy
        } else {
            // both raider threads integrate the body, so its authored
            // velocities are half of what lands on screen
            let mut enemy = Enemy::new(
                pos,
                vec2(0.0, constant::ENEMY_SPEED * 0.5),
                Some(300.0),
            );
            enemy.cpu.spawn("strafe", self.scripts.get("strafe"), rng.gen());
            enemy.cpu.spawn("gunner", self.scripts.get("gunner"), rng.gen());
            log::debug!("raider up at ({:.0}, {:.0})", pos.x, pos.y);
            enemy
        };

        self.enemies.push(enemy);
        self.spawned += 1;
    }

    fn tick(&mut self, dt: f32) -> GameResult<()> {
        self.player.update(dt);

        self.spawn_timer += dt;
        if self.spawn_timer >= constant::ENEMY_SPAWN_INTERVAL {
            self.spawn_timer -= constant::ENEMY_SPAWN_INTERVAL;
            self.spawn_enemy();
        }

        for enemy in self.enemies.iter_mut() {
            if let Err(err) = enemy.tick(dt) {
                return Err(GameError::CustomError(format!("script error: {}", err)));
            }
            for shot in enemy.body.drain_shots() {
                self.enemy_shots.push(EnemyShot::new(shot.pos, shot.vel));
            }
        }

        for shot in self.enemy_shots.iter_mut() {
            shot.update(dt);
        }

        self.collide_shots_with_enemies();
        self.despawn_strays();

        Ok(())
    }

    fn collide_shots_with_enemies(&mut self) {
        let mut s = 0;
        while s < self.player.shots.len() {
            let rect = self.player.shots[s].rect();
            let hit = self
                .enemies
                .iter()
                .position(|enemy| enemy.rect().overlaps(&rect));
            if let Some(e) = hit {
                let enemy = self.enemies.remove(e);
                self.player.shots.remove(s);
                log::debug!(
                    "enemy down at ({:.0}, {:.0})",
                    enemy.body.pos.x,
                    enemy.body.pos.y
                );
            } else {
                s += 1;
            }
        }
    }

    fn despawn_strays(&mut self) {
        self.enemies
            .retain(|enemy| enemy.body.pos.y < constant::HEIGHT + constant::ENEMY_HEIGHT);

        let m = 20.0;
        self.enemy_shots.retain(|shot| {
            shot.pos.x > -m
                && shot.pos.x < constant::WIDTH + m
                && shot.pos.y > -m
                && shot.pos.y < constant::HEIGHT + m
        });
    }
}

impl Scene for ArenaScene {
    fn next(&self) -> Box<dyn Scene> {
        Box::new(ArenaScene::new())
    }
}

impl EventHandler for ArenaScene {
    fn update(&mut self, ctx: &mut Context) -> GameResult<()> {
        self.clear_input();
        if ctx.keyboard.is_key_pressed(KeyCode::A) || ctx.keyboard.is_key_pressed(KeyCode::Left) {
            self.input(&Input::Left);
        }
        if ctx.keyboard.is_key_pressed(KeyCode::D) || ctx.keyboard.is_key_pressed(KeyCode::Right) {
            self.input(&Input::Right);
        }

        let dt = ctx.time.delta().as_secs_f32();
        self.tick(dt)
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult<()> {
        let mut canvas = graphics::Canvas::from_frame(ctx, Color::BLACK);

        self.player.draw(ctx, &mut canvas)?;
        for enemy in self.enemies.iter() {
            enemy.draw(ctx, &mut canvas)?;
        }
        for shot in self.enemy_shots.iter() {
            shot.draw(ctx, &mut canvas)?;
        }

        let debug_msg = graphics::Text::new(format!(
            "\nfps: {:.0}\nenemies: {}\nshots: {}",
            ctx.time.fps(),
            self.enemies.len(),
            self.player.shots.len() + self.enemy_shots.len(),
        ));
        canvas.draw(&debug_msg, DrawParam::default().dest(vec2(10.0, 0.0)));

        canvas.finish(ctx)?;

        Ok(())
    }

    fn key_down_event(&mut self, ctx: &mut Context, key: KeyInput, repeat: bool) -> GameResult<()> {
        match key.keycode {
            Some(KeyCode::Space) if !repeat => self.input(&Input::Shot),
            Some(KeyCode::Escape) => ctx.request_quit(),
            _ => (),
        }

        Ok(())
    }
}
