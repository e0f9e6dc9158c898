mod constant;
mod game;

use ggez::{
    conf::{WindowMode, WindowSetup},
    event, ContextBuilder,
};

use crate::game::SwarmGame;

fn main() {
    env_logger::init();

    let title = format!("swarm v{}", env!("CARGO_PKG_VERSION"));
    let author = "swarm";

    let window_setup = WindowSetup::default().title(&title);
    let window_mode = WindowMode::default()
        .dimensions(constant::WIDTH, constant::HEIGHT)
        .resizable(false);

    let (mut ctx, event_loop) = ContextBuilder::new(&title, author)
        .window_setup(window_setup)
        .window_mode(window_mode)
        .build()
        .expect("cannot create ggez context.");
    let game = SwarmGame::new(&mut ctx);

    event::run(ctx, event_loop, game);
}
