//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (sprites in insertion order)
//! - Additions and removals applied only between ticks
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod event;
pub mod level;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod result;
pub mod sprite;
pub mod state;
pub mod tick;
pub mod tile;

pub use collision::{Body, Contact, MoveRules, TerrainSensor, TileSensor, move_body};
pub use enemy::{Enemy, PipeFlower};
pub use event::{Event, EventKind, EventLog};
pub use level::{Level, TileGrid, TilePos};
pub use pickup::Pickup;
pub use player::{Player, PowerState};
pub use projectile::{Bullet, Fireball, Shell};
pub use result::{PlayerView, RunResult, Snapshot, SpriteView};
pub use sprite::{Behavior, Entity, Hitbox, ShellHit, Sprite, SpriteKind, SpriteType};
pub use state::{Env, Session, Status, World};
pub use tick::{TickInput, tick};
pub use tile::{Tile, TileFeatures};
