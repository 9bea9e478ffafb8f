//! Terminal result record and per-tick render snapshot

use serde::{Deserialize, Serialize};

use super::event::EventKind;
use super::player::PowerState;
use super::sprite::{SpriteKind, SpriteType};
use super::state::{Status, World};
use super::tile::Tile;

/// Everything the voting and telemetry layers need about a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub status: Status,
    pub ticks: u32,
    pub coins: u32,
    pub lives: u32,
    pub final_power: PowerState,
    /// Fraction of the way to the exit, 0..=1
    pub completion: f32,

    // === Kills ===
    pub kills_total: u32,
    pub kills_stomp: u32,
    pub kills_fire: u32,
    pub kills_shell: u32,
    pub kills_fall: u32,
    pub kills_bump: u32,

    // === Movement ===
    pub jumps: u32,
    /// Longest airborne stretch, jumps and falls alike, in ticks
    pub max_air_time: u32,
    /// Longest horizontal jump-to-landing distance, in pixels
    pub max_jump_distance: f32,

    // === Pickups and blocks ===
    pub mushrooms: u32,
    pub fire_flowers: u32,
    pub one_ups: u32,
    /// Coins collected from coin tiles
    pub tile_coins: u32,
    pub hurts: u32,
    pub bricks_destroyed: u32,
    pub blocks_bumped: u32,
}

impl RunResult {
    pub fn of(world: &World) -> Self {
        let log = world.events();
        let count = |kind| log.count(kind) as u32;
        let count_where = |kind, param| log.count_where(kind, param) as u32;

        let mut max_air_time = 0;
        let mut max_jump_distance: f32 = 0.0;
        let mut jumped_from = None;
        for event in log.iter() {
            match event.kind {
                EventKind::Jump => jumped_from = Some(event.x),
                EventKind::Land => {
                    max_air_time = max_air_time.max(event.param.max(0) as u32);
                    if let Some(x) = jumped_from.take() {
                        max_jump_distance = max_jump_distance.max((event.x - x).abs());
                    }
                }
                _ => {}
            }
        }

        let kills_stomp = count(EventKind::StompKill);
        let kills_fire = count(EventKind::FireKill);
        let kills_shell = count(EventKind::ShellKill);
        let kills_fall = count(EventKind::FallKill);
        let kills_bump = count(EventKind::BumpKill);
        let bricks_destroyed = count_where(EventKind::Bump, Tile::Brick.code() as i32);

        let player = world.player();
        let exit_x = world.level().exit_x();
        let completion = if exit_x <= 0.0 {
            1.0
        } else {
            (player.pos().x / exit_x).clamp(0.0, 1.0)
        };

        Self {
            status: world.status(),
            ticks: world.tick_count(),
            coins: world.session().coins,
            lives: world.session().lives,
            final_power: player.power,
            completion,
            kills_total: kills_stomp + kills_fire + kills_shell + kills_fall + kills_bump,
            kills_stomp,
            kills_fire,
            kills_shell,
            kills_fall,
            kills_bump,
            jumps: count(EventKind::Jump),
            max_air_time,
            max_jump_distance,
            mushrooms: count_where(EventKind::Collect, SpriteType::Mushroom.code()),
            fire_flowers: count_where(EventKind::Collect, SpriteType::FireFlower.code()),
            one_ups: count_where(EventKind::Collect, SpriteType::LifeMushroom.code()),
            tile_coins: count_where(EventKind::Coin, Tile::Coin.code() as i32),
            hurts: count(EventKind::Hurt),
            bricks_destroyed,
            blocks_bumped: count(EventKind::Bump) - bricks_destroyed,
        }
    }
}

/// Player fields a renderer draws
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub facing: i32,
    pub power: PowerState,
    pub on_ground: bool,
    pub ducking: bool,
    pub sliding: bool,
    pub invulnerable: i32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteView {
    pub id: u32,
    pub kind: SpriteType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: i32,
    pub winged: bool,
}

/// Read-only view of one tick. Tiles are read separately from
/// [`World::terrain`] since they rarely change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u32,
    pub status: Status,
    pub window_x: f32,
    pub coins: u32,
    pub lives: u32,
    pub player: PlayerView,
    pub sprites: Vec<SpriteView>,
}

impl Snapshot {
    pub fn of(world: &World) -> Self {
        let p = world.player();
        let player = PlayerView {
            x: p.body.pos.x,
            y: p.body.pos.y,
            vx: p.body.vel.x,
            vy: p.body.vel.y,
            width: p.body.width,
            height: p.body.height,
            facing: p.body.facing,
            power: p.power,
            on_ground: p.body.on_ground,
            ducking: p.ducking,
            sliding: p.sliding,
            invulnerable: p.invulnerable,
            alive: p.alive,
        };

        let sprites = world
            .sprites()
            .iter()
            .map(|s| {
                let body = s.body();
                SpriteView {
                    id: s.id(),
                    kind: s.sprite_type(),
                    x: body.pos.x,
                    y: body.pos.y,
                    width: body.width,
                    height: body.height,
                    facing: body.facing,
                    winged: matches!(&s.kind, SpriteKind::Enemy(e) if e.winged),
                }
            })
            .collect();

        Self {
            tick: world.tick_count(),
            status: world.status(),
            window_x: world.window_x(),
            coins: world.session().coins,
            lives: world.session().lives,
            player,
            sprites,
        }
    }
}
