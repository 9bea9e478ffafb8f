//! Axis-separated movement against the tile grid
//!
//! Every mover (player, enemies, shells, fireballs, pickups) goes through
//! [`move_body`]. Positions are center-x / bottom-y, so a body spans
//! `x - width ..= x + width` horizontally and `y - height ..= y` vertically.
//!
//! The 8 px step cap and the horizontal-before-vertical order decide exactly
//! which tiles are checked, so they are part of the engine's observable
//! behaviour and must not be optimised away.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::TileGrid;
use crate::consts::{MAX_STEP, TILE_SIZE};
use crate::tile_of;

/// Kinematic state shared by every sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center-x, bottom-y in pixels
    pub pos: Vec2,
    pub vel: Vec2,
    /// Half-width
    pub width: f32,
    /// Full height
    pub height: f32,
    /// -1, 0 or 1
    pub facing: i32,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            width,
            height,
            facing: 0,
            on_ground: false,
        }
    }

    /// Whether this body covers any part of tile column `tx`, standing in row `ty`
    pub fn rests_on_column(&self, tx: i32, ty: i32) -> bool {
        let left = (tx * TILE_SIZE) as f32;
        self.pos.x + self.width > left
            && self.pos.x - self.width < left + TILE_SIZE as f32
            && ty == tile_of(self.pos.y - 1.0)
    }
}

/// What a call to [`move_body`] ran into
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    /// Some step was obstructed; the mover was snapped to the tile edge
    pub blocked: bool,
    /// All three leading-edge sensors of the last horizontal step were solid
    pub wall_flush: Option<bool>,
    pub hit_ceiling: bool,
    pub landed: bool,
}

impl Contact {
    fn merge(&mut self, step: Contact) {
        self.blocked |= step.blocked;
        self.hit_ceiling |= step.hit_ceiling;
        self.landed |= step.landed;
        if step.wall_flush.is_some() {
            self.wall_flush = step.wall_flush;
        }
    }
}

/// Per-mover movement options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveRules {
    /// Treat a missing floor ahead as a wall while grounded
    pub avoid_cliffs: bool,
}

impl MoveRules {
    pub const FREE: Self = Self {
        avoid_cliffs: false,
    };

    pub fn avoiding_cliffs(avoid_cliffs: bool) -> Self {
        Self { avoid_cliffs }
    }
}

/// Tile queries made while moving
///
/// `solid` is a pure query. `blocks` is what a sensor point hitting a tile
/// calls and may have side effects (the player collects coins and bumps
/// blocks through it); it defaults to `solid`.
pub trait TileSensor {
    fn solid(&self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool;

    fn blocks(&mut self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        self.solid(tx, ty, xa, ya)
    }
}

/// Plain terrain with no side effects
pub struct TerrainSensor<'a>(pub &'a TileGrid);

impl TileSensor for TerrainSensor<'_> {
    fn solid(&self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        self.0.is_blocking(tx, ty, xa, ya)
    }
}

/// Move a body by (xa, ya), resolving against tiles.
///
/// Displacements longer than [`MAX_STEP`] are split into capped steps and
/// movement stops at the first obstructed step.
pub fn move_body<P: TileSensor>(
    body: &mut Body,
    mut xa: f32,
    mut ya: f32,
    rules: MoveRules,
    sensor: &mut P,
) -> Contact {
    let mut contact = Contact::default();

    while xa.abs() > MAX_STEP {
        let step = MAX_STEP.copysign(xa);
        contact.merge(step_body(body, step, 0.0, rules, sensor));
        if contact.blocked {
            return contact;
        }
        xa -= step;
    }
    while ya.abs() > MAX_STEP {
        let step = MAX_STEP.copysign(ya);
        contact.merge(step_body(body, 0.0, step, rules, sensor));
        if contact.blocked {
            return contact;
        }
        ya -= step;
    }

    contact.merge(step_body(body, xa, ya, rules, sensor));
    contact
}

/// One sensor point; the tile the mover already occupies never blocks
fn sensor_point<P: TileSensor>(
    body: &Body,
    px: f32,
    py: f32,
    xa: f32,
    ya: f32,
    sensor: &mut P,
) -> bool {
    let (tx, ty) = (tile_of(px), tile_of(py));
    if tx == tile_of(body.pos.x) && ty == tile_of(body.pos.y) {
        return false;
    }
    sensor.blocks(tx, ty, xa, ya)
}

fn step_body<P: TileSensor>(
    body: &mut Body,
    xa: f32,
    ya: f32,
    rules: MoveRules,
    sensor: &mut P,
) -> Contact {
    let Vec2 { x, y } = body.pos;
    let (w, h) = (body.width, body.height);
    let mut contact = Contact::default();
    let mut collide = false;

    if ya > 0.0 {
        collide = sensor_point(body, x + xa - w, y + ya, xa, ya, sensor)
            || sensor_point(body, x + xa, y + ya, xa, ya, sensor)
            || sensor_point(body, x + xa + w, y + ya, xa, ya, sensor);
    }
    if ya < 0.0 {
        collide = sensor_point(body, x + xa, y + ya - h, xa, ya, sensor)
            || sensor_point(body, x + xa - w, y + ya - h, xa, ya, sensor)
            || sensor_point(body, x + xa + w, y + ya - h, xa, ya, sensor);
    }
    if xa != 0.0 {
        let edge = if xa > 0.0 { x + xa + w } else { x + xa - w };
        // every sensor runs: each one may have side effects
        let top = sensor_point(body, edge, y + ya - h, xa, ya, sensor);
        let mid = sensor_point(body, edge, y + ya - h / 2.0, xa, ya, sensor);
        let low = sensor_point(body, edge, y + ya, xa, ya, sensor);
        contact.wall_flush = Some(top && mid && low);
        collide |= top || mid || low;

        if rules.avoid_cliffs
            && body.on_ground
            && !sensor.solid(tile_of(edge), tile_of(y) + 1, xa, 1.0)
        {
            collide = true;
        }
    }

    if !collide {
        body.pos.x += xa;
        body.pos.y += ya;
        return contact;
    }

    contact.blocked = true;
    if xa < 0.0 {
        body.pos.x = (tile_of(x - w) * TILE_SIZE) as f32 + w;
        body.vel.x = 0.0;
    }
    if xa > 0.0 {
        body.pos.x = ((tile_of(x + w) + 1) * TILE_SIZE) as f32 - w - 1.0;
        body.vel.x = 0.0;
    }
    if ya < 0.0 {
        body.pos.y = (tile_of(y - h) * TILE_SIZE) as f32 + h;
        body.vel.y = 0.0;
        contact.hit_ceiling = true;
    }
    if ya > 0.0 {
        // vel.y survives landing; ground damping bleeds it off over the next ticks
        body.pos.y = ((tile_of(y - 1.0) + 1) * TILE_SIZE) as f32 - 1.0;
        body.on_ground = true;
        contact.landed = true;
    }
    contact
}
