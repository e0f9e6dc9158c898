mod arena;

use ggez::{event::EventHandler, input::keyboard::KeyInput, Context, GameResult};

use arena::ArenaScene;

pub trait Scene: EventHandler {
    fn next(&self) -> Box<dyn Scene>;
}

pub struct SwarmGame {
    scene: Box<dyn Scene>,
}

impl SwarmGame {
    pub fn new(_ctx: &mut Context) -> Self {
        SwarmGame {
            scene: Box::new(ArenaScene::new()),
        }
    }
}

impl EventHandler for SwarmGame {
    fn update(&mut self, ctx: &mut Context) -> GameResult<()> {
        self.scene.update(ctx)
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult<()> {
        self.scene.draw(ctx)
    }

    fn key_down_event(&mut self, ctx: &mut Context, key: KeyInput, repeat: bool) -> GameResult<()> {
        self.scene.key_down_event(ctx, key, repeat)
    }

    fn key_up_event(&mut self, ctx: &mut Context, key: KeyInput) -> GameResult<()> {
        self.scene.key_up_event(ctx, key)
    }
}
