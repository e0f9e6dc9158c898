pub const WIDTH: f32 = 800.0;
pub const HEIGHT: f32 = 600.0;

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 60.0;
pub const PLAYER_SPEED: f32 = 300.0;

pub const SHOT_WIDTH: f32 = 5.0;
pub const SHOT_HEIGHT: f32 = 10.0;
pub const SHOT_SPEED: f32 = 420.0;

pub const ENEMY_WIDTH: f32 = 50.0;
pub const ENEMY_HEIGHT: f32 = 60.0;
pub const ENEMY_SPEED: f32 = 120.0;
pub const ENEMY_SHOT_SPEED: f32 = 240.0;
pub const ENEMY_SPAWN_INTERVAL: f32 = 2.0;
