//! Platform Duel - deterministic tile platformer engine
//!
//! Two generated levels are played side by side and compared; this crate is the
//! engine that actually plays them. Given the same level text and the same
//! per-tick input it always produces the same sequence of states.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level, collision, sprites, world tick, events)
//! - `driver`: Headless tick drivers and scripted agents
//! - `tape`: Recorded input sequences for replay and conformance runs
//! - `settings`: Simulation configuration
//! - `web`: Browser bindings over the same core (wasm32 only)

pub mod driver;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tape;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigError, LevelError, TapeError};
pub use settings::SimConfig;
pub use sim::{Level, RunResult, Status, TickInput, World};

/// Engine constants. Every port must use these exact values.
pub mod consts {
    /// Tile edge in pixels
    pub const TILE_SIZE: i32 = 16;
    /// Default level height in tiles
    pub const LEVEL_ROWS: usize = 16;
    /// Widest accepted level, in tiles
    pub const MAX_LEVEL_WIDTH: usize = 250;
    /// Largest displacement resolved against tiles in a single step
    pub const MAX_STEP: f32 = 8.0;

    /// Horizontal damping per tick
    pub const GROUND_INERTIA: f32 = 0.89;
    pub const AIR_INERTIA: f32 = 0.89;
    /// Vertical damping per tick
    pub const VERTICAL_DAMPING: f32 = 0.85;
    pub const WINGED_DAMPING: f32 = 0.95;
    pub const FIREBALL_DAMPING: f32 = 0.95;

    /// Player acceleration per tick
    pub const WALK_SPEED: f32 = 0.6;
    pub const RUN_SPEED: f32 = 1.2;
    /// Per remaining jump tick
    pub const JUMP_IMPULSE: f32 = -1.9;
    pub const JUMP_TICKS: i32 = 7;
    pub const STOMP_JUMP_TICKS: i32 = 8;
    pub const WALL_JUMP_SPEED: f32 = 6.0;
    pub const WALL_JUMP_IMPULSE: f32 = -2.0;
    pub const WALL_JUMP_TICKS: i32 = -6;
    pub const PLAYER_GRAVITY: f32 = 3.0;
    /// Below this horizontal speed the player stops dead
    pub const STOP_THRESHOLD: f32 = 0.5;

    pub const ENEMY_SPEED: f32 = 1.75;
    pub const ENEMY_GRAVITY: f32 = 2.0;
    pub const WINGED_GRAVITY: f32 = 0.6;
    /// Upward kick a grounded winged enemy receives every tick
    pub const WING_KICK: f32 = -10.0;
    /// Velocity given to a sprite knocked out by a shell, fireball or bump
    pub const KNOCK_SPEED: f32 = 2.0;
    pub const KNOCK_LIFT: f32 = -5.0;

    pub const SHELL_SPEED: f32 = 11.0;
    pub const SHELL_POP: f32 = -5.0;
    pub const FIREBALL_SPEED: f32 = 8.0;
    pub const FIREBALL_DROP: f32 = 4.0;
    pub const FIREBALL_BOUNCE: f32 = -10.0;
    pub const FIREBALL_GRAVITY: f32 = 1.5;
    pub const MAX_FIREBALLS: usize = 2;
    pub const BULLET_SPEED: f32 = 4.0;
    /// Ticks between bullet launches
    pub const BULLET_INTERVAL: u32 = 100;
    /// Upward kick for pickups bumped from below
    pub const BUMP_HOP: f32 = -10.0;
    /// Ticks a pickup spends rising out of its block
    pub const PICKUP_RISE_TICKS: u32 = 9;

    /// World freeze while the player changes size
    pub const POWER_CHANGE_PAUSE: u32 = 9;
    pub const HURT_INVULNERABILITY: i32 = 32;
    pub const COINS_PER_LIFE: u32 = 100;

    /// Activation window that follows the player
    pub const VIEW_WIDTH: f32 = 256.0;
    pub const VIEW_HEIGHT: f32 = 256.0;
    /// Sprites further than this outside the window are dropped
    pub const VIEW_MARGIN: f32 = 64.0;
    /// Anything this far below the level bottom has fallen out
    pub const FALL_MARGIN: f32 = 32.0;
}

/// Tile coordinate containing a world-space pixel coordinate.
///
/// Truncates toward zero, so -15.9 maps to tile 0 like 15.9 does.
#[inline]
pub fn tile_of(px: f32) -> i32 {
    (px / consts::TILE_SIZE as f32) as i32
}
