//! World state and the per-tick context handed to sprites
//!
//! The world owns everything that changes during a run. The parsed level is
//! shared read-only; blocks that get used or broken live in a private copy of
//! its tiles (`terrain`).

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::TerrainSensor;
use super::event::{Event, EventKind, EventLog};
use super::level::{Level, TileGrid, TilePos};
use super::pickup::Pickup;
use super::player::{Player, PowerState};
use super::result::{RunResult, Snapshot};
use super::sprite::{Sprite, SpriteType};
use super::tick::{self, TickInput};
use super::tile::{Tile, TileFeatures};
use crate::consts::{COINS_PER_LIFE, TILE_SIZE};
use crate::error::LevelError;
use crate::settings::SimConfig;

/// Run status. Every status other than `Running` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Running,
    Win,
    Lose,
    TimeOut,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }
}

/// Run-wide counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub status: Status,
    pub coins: u32,
    /// Lives earned during the run; death always ends the run
    pub lives: u32,
    /// Ticks left in a power-change freeze
    pub pause_timer: u32,
    pub fireballs_on_screen: usize,
}

/// Changes requested during a tick, applied at its end
#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    pub added: Vec<Sprite>,
    /// Moving shells to test against every other sprite
    pub shell_checks: Vec<u32>,
    pub fireball_checks: Vec<u32>,
    /// Tiles something may be standing on that were bumped from below
    pub bumps: Vec<TilePos>,
    next_id: u32,
}

impl Default for Pending {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            shell_checks: Vec::new(),
            fireball_checks: Vec::new(),
            bumps: Vec::new(),
            next_id: 1,
        }
    }
}

impl Pending {
    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, mut sprite: Sprite) -> u32 {
        let id = self.next_entity_id();
        sprite.entity.id = id;
        self.added.push(sprite);
        id
    }
}

/// Player state that events are stamped with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mark {
    pub pos: Vec2,
    pub power: PowerState,
    pub facing: i32,
}

impl Mark {
    pub fn of(player: &Player) -> Self {
        Self {
            pos: player.body.pos,
            power: player.power,
            facing: player.body.facing,
        }
    }
}

/// Everything a sprite may read or change during a tick, except the
/// sprite list itself and the player
pub struct Env<'a> {
    pub level: &'a Level,
    pub terrain: &'a mut TileGrid,
    pub session: &'a mut Session,
    pub pending: &'a mut Pending,
    pub events: &'a mut Vec<Event>,
    pub tick: u32,
    pub mark: Mark,
}

impl Env<'_> {
    /// Refresh the player stamp used for subsequent events
    pub fn track(&mut self, player: &Player) {
        self.mark = Mark::of(player);
    }

    pub fn emit(&mut self, kind: EventKind, param: i32) {
        self.events.push(Event {
            kind,
            param,
            tick: self.tick,
            x: self.mark.pos.x,
            y: self.mark.pos.y,
            power: self.mark.power,
        });
    }

    /// Queue a sprite; it joins the world at the end of the tick
    pub fn add(&mut self, sprite: Sprite) -> u32 {
        self.pending.add(sprite)
    }

    pub fn terrain_sensor(&self) -> TerrainSensor<'_> {
        TerrainSensor(&*self.terrain)
    }

    /// Move to a terminal status. Only the first transition sticks.
    pub fn finish(&mut self, status: Status) -> bool {
        if self.session.status.is_terminal() {
            return false;
        }
        log::info!("Run finished at tick {}: {:?}", self.tick, status);
        self.session.status = status;
        true
    }

    pub fn gain_coin(&mut self) {
        self.session.coins += 1;
        if self.session.coins % COINS_PER_LIFE == 0 {
            self.session.lives += 1;
        }
    }

    /// Take the coin tile at (tx, ty)
    pub fn collect_tile(&mut self, tx: i32, ty: i32) {
        let tile = self.terrain.get(tx, ty);
        self.terrain.set(tx, ty, Tile::Air);
        self.gain_coin();
        self.emit(EventKind::Coin, tile.code() as i32);
    }

    /// Tile (tx, ty) was hit from below (or sideways by a shell)
    pub fn bump(&mut self, tx: i32, ty: i32, can_break: bool) {
        let tile = self.terrain.get(tx, ty);
        let features = tile.features();

        if features.contains(TileFeatures::BUMPABLE) {
            self.bump_into(tx, ty - 1);
            self.emit(EventKind::Bump, tile.code() as i32);
            self.terrain.set(tx, ty, Tile::Used);

            let pos = Vec2::new(
                (tx * TILE_SIZE + 8) as f32,
                (ty * TILE_SIZE + 8) as f32,
            );
            if features.contains(TileFeatures::SPECIAL) {
                let species = if self.mark.power.is_large() {
                    SpriteType::FireFlower
                } else {
                    SpriteType::Mushroom
                };
                self.add(Pickup::spawn(species, pos));
            } else if features.contains(TileFeatures::LIFE) {
                self.add(Pickup::spawn(SpriteType::LifeMushroom, pos));
            } else {
                self.gain_coin();
                self.emit(EventKind::Coin, tile.code() as i32);
            }
        }

        if features.contains(TileFeatures::BREAKABLE) {
            self.bump_into(tx, ty - 1);
            if can_break {
                self.emit(EventKind::Bump, tile.code() as i32);
                self.terrain.set(tx, ty, Tile::Air);
            }
        }
    }

    /// Whatever sits on top of a bumped tile gets knocked
    fn bump_into(&mut self, tx: i32, ty: i32) {
        if self
            .terrain
            .features(tx, ty)
            .contains(TileFeatures::PICKABLE)
        {
            self.collect_tile(tx, ty);
        }
        self.pending.bumps.push((tx, ty));
    }
}

/// A single play-through of one level
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) level: Arc<Level>,
    pub(crate) config: SimConfig,
    pub(crate) max_ticks: Option<u32>,
    /// Level tiles as changed by play
    pub(crate) terrain: TileGrid,
    pub(crate) player: Player,
    /// Live sprites in insertion order
    pub(crate) sprites: Vec<Sprite>,
    pub(crate) session: Session,
    pub(crate) pending: Pending,
    pub(crate) tick: u32,
    pub(crate) window_x: f32,
    /// Last tick each spawn marker was inside the activation window
    pub(crate) last_seen: HashMap<TilePos, u32>,
    pub(crate) log: EventLog,
    /// Events raised during the tick in progress
    pub(crate) buffer: Vec<Event>,
    pub(crate) last_events: Vec<Event>,
}

impl World {
    pub fn new(level: Arc<Level>, config: SimConfig) -> Self {
        let player = Player::new(level.spawn_tile(), config.initial_power);
        let max_ticks = config.max_ticks();
        log::info!(
            "New world: {}x{} tiles, spawn {:?}, exit {:?}, tick limit {:?}",
            level.width(),
            level.height(),
            level.spawn_tile(),
            level.exit_tile(),
            max_ticks
        );
        Self {
            terrain: level.tiles().clone(),
            level,
            config,
            max_ticks,
            player,
            sprites: Vec::new(),
            session: Session::default(),
            pending: Pending::default(),
            tick: 0,
            window_x: 0.0,
            last_seen: HashMap::new(),
            log: EventLog::new(),
            buffer: Vec::new(),
            last_events: Vec::new(),
        }
    }

    /// Parse `text` and build a world over it
    pub fn from_text(text: &str, config: SimConfig) -> Result<Self, LevelError> {
        let level = Level::parse_with(text, &config)?;
        Ok(Self::new(Arc::new(level), config))
    }

    /// Advance one tick. Does nothing once the run is over.
    pub fn tick(&mut self, input: &TickInput) {
        tick::tick(self, input);
    }

    /// Split into the tick context and the parts it does not cover
    pub(crate) fn split(&mut self) -> (Env<'_>, &mut Player, &mut Vec<Sprite>) {
        let env = Env {
            level: self.level.as_ref(),
            terrain: &mut self.terrain,
            session: &mut self.session,
            pending: &mut self.pending,
            events: &mut self.buffer,
            tick: self.tick,
            mark: Mark::of(&self.player),
        };
        (env, &mut self.player, &mut self.sprites)
    }

    /// Place a sprite directly, bypassing spawn markers. Returns its id.
    pub fn insert_sprite(&mut self, sprite: Sprite) -> u32 {
        let id = self.pending.add(sprite);
        self.sprites.append(&mut self.pending.added);
        id
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn max_ticks(&self) -> Option<u32> {
        self.max_ticks
    }

    /// Current tiles, including used and broken blocks
    pub fn terrain(&self) -> &TileGrid {
        &self.terrain
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, id: u32) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id() == id)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> Status {
        self.session.status
    }

    pub fn is_running(&self) -> bool {
        !self.session.status.is_terminal()
    }

    /// Ticks completed so far
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    /// Left edge of the activation window
    pub fn window_x(&self) -> f32 {
        self.window_x
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    /// Events raised by the most recent tick
    pub fn last_events(&self) -> &[Event] {
        &self.last_events
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }

    pub fn result(&self) -> RunResult {
        RunResult::of(self)
    }
}
