//! Walking and flying enemies, and the pipe flower

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, MoveRules, move_body};
use super::event::EventKind;
use super::player::Player;
use super::projectile::Shell;
use super::sprite::{Behavior, Entity, Hitbox, ShellHit, Sprite, SpriteKind, SpriteType, player_contact};
use super::state::Env;
use crate::consts::*;

const ENEMY_WIDTH: f32 = 4.0;
const KOOPA_HEIGHT: f32 = 24.0;
const ENEMY_HEIGHT: f32 = 12.0;

/// Ground walker, optionally winged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub species: SpriteType,
    /// Cleared by the first stomp
    pub winged: bool,
    pub avoid_cliffs: bool,
    pub fire_immune: bool,
}

impl Enemy {
    pub fn new(species: SpriteType) -> Self {
        Self {
            species,
            winged: species.is_winged(),
            avoid_cliffs: species.is_red(),
            fire_immune: species.is_spiky(),
        }
    }

    /// Enemy standing on tile (tx, ty), walking toward `dir`
    pub fn spawn(species: SpriteType, tx: i32, ty: i32, dir: i32) -> Sprite {
        let pos = Vec2::new(
            (tx * TILE_SIZE + 8) as f32,
            (ty * TILE_SIZE + 15) as f32,
        );
        let height = if species.is_koopa() {
            KOOPA_HEIGHT
        } else {
            ENEMY_HEIGHT
        };
        let mut body = Body::new(pos, ENEMY_WIDTH, height);
        body.facing = if dir == 0 { 1 } else { dir };
        Sprite::new(body, SpriteKind::Enemy(Self::new(species)), Some((tx, ty)))
    }
}

impl Behavior for Enemy {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>) {
        let body = &mut me.body;
        if body.vel.x > 2.0 {
            body.facing = 1;
        }
        if body.vel.x < -2.0 {
            body.facing = -1;
        }
        body.vel.x = body.facing as f32 * ENEMY_SPEED;

        let rules = MoveRules::avoiding_cliffs(self.avoid_cliffs);
        let mut sensor = env.terrain_sensor();
        let xa = body.vel.x;
        if move_body(body, xa, 0.0, rules, &mut sensor).blocked {
            body.facing = -body.facing;
        }
        body.on_ground = false;
        let ya = body.vel.y;
        move_body(body, 0.0, ya, rules, &mut sensor);

        body.vel.y *= if self.winged {
            WINGED_DAMPING
        } else {
            VERTICAL_DAMPING
        };
        body.vel.x *= if body.on_ground {
            GROUND_INERTIA
        } else {
            AIR_INERTIA
        };
        if !body.on_ground {
            body.vel.y += if self.winged {
                WINGED_GRAVITY
            } else {
                ENEMY_GRAVITY
            };
        } else if self.winged {
            body.vel.y = WING_KICK;
        }
    }

    fn collide_check(&mut self, me: &mut Entity, player: &mut Player, env: &mut Env<'_>) {
        let reach = me.body.width * 2.0 + 4.0;
        if !player_contact(&me.body, player, reach) {
            return;
        }

        if !self.species.is_stompable() || !player.is_stomping(&me.body) {
            player.hurt(self.species, env);
            return;
        }

        player.stomp(me.body.pos.y - me.body.height / 2.0, env);
        if self.winged {
            self.winged = false;
            me.body.vel.y = 0.0;
            return;
        }
        if self.species.is_koopa() {
            env.add(Shell::spawn(me.body.pos, self.species.is_red(), me.origin));
        }
        env.emit(EventKind::StompKill, self.species.code());
        me.remove();
    }

    fn on_shell_hit(&mut self, me: &mut Entity, shell: &Hitbox, env: &mut Env<'_>) -> ShellHit {
        if !shell.strikes(&me.body) {
            return ShellHit::Miss;
        }
        env.emit(EventKind::ShellKill, self.species.code());
        me.remove();
        ShellHit::Hit
    }

    fn on_fireball_hit(&mut self, me: &mut Entity, fireball: &Hitbox, env: &mut Env<'_>) -> bool {
        if !fireball.strikes(&me.body) {
            return false;
        }
        if !self.fire_immune {
            env.emit(EventKind::FireKill, self.species.code());
            me.remove();
        }
        true
    }

    fn on_bump(&mut self, me: &mut Entity, tx: i32, ty: i32, _facing: i32, env: &mut Env<'_>) {
        if me.body.rests_on_column(tx, ty) {
            me.remove();
            env.emit(EventKind::BumpKill, self.species.code());
        }
    }
}

const FLOWER_WIDTH: f32 = 2.0;
/// How far the flower rises out of its pipe
const FLOWER_RISE: f32 = 20.0;
/// Ticks spent fully out or fully hidden before moving again
const FLOWER_WAIT: u32 = 40;
/// The flower stays hidden while the player is this close horizontally
const FLOWER_SHY_DISTANCE: f32 = 24.0;

/// Piranha-style flower that pops out of a pipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeFlower {
    /// Hidden resting height
    pub y_start: f32,
    /// Ticks spent at the current end of travel
    pub wait: u32,
}

impl PipeFlower {
    /// Flower hidden in the pipe whose top-left tile is (tx, ty)
    pub fn spawn(tx: i32, ty: i32, player_x: f32) -> Sprite {
        let pos = Vec2::new(
            (tx * TILE_SIZE + 17) as f32,
            (ty * TILE_SIZE + 18) as f32,
        );
        let mut flower = Self {
            y_start: pos.y,
            wait: 0,
        };
        let mut body = Body::new(pos, FLOWER_WIDTH, ENEMY_HEIGHT);
        body.facing = 1;
        body.vel.y = -1.0;
        body.pos.y -= 1.0;
        for _ in 0..4 {
            flower.step(&mut body, player_x);
        }
        Sprite::new(body, SpriteKind::Flower(flower), Some((tx, ty)))
    }

    fn step(&mut self, body: &mut Body, player_x: f32) {
        let top = self.y_start - FLOWER_RISE;
        if body.pos.y >= self.y_start {
            body.pos.y = self.y_start;
            self.wait += 1;
            let clear = (player_x - body.pos.x).abs() > FLOWER_SHY_DISTANCE;
            body.vel.y = if self.wait > FLOWER_WAIT && clear { -1.0 } else { 0.0 };
        } else if body.pos.y <= top {
            body.pos.y = top;
            self.wait += 1;
            body.vel.y = if self.wait > FLOWER_WAIT { 1.0 } else { 0.0 };
        } else {
            self.wait = 0;
        }
        body.pos.y += body.vel.y;
    }
}

impl Behavior for PipeFlower {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>) {
        self.step(&mut me.body, env.mark.pos.x);
    }

    fn collide_check(&mut self, me: &mut Entity, player: &mut Player, env: &mut Env<'_>) {
        let reach = me.body.width * 2.0 + 4.0;
        if player_contact(&me.body, player, reach) {
            player.hurt(SpriteType::EnemyFlower, env);
        }
    }

    fn on_shell_hit(&mut self, me: &mut Entity, shell: &Hitbox, env: &mut Env<'_>) -> ShellHit {
        if !shell.strikes(&me.body) {
            return ShellHit::Miss;
        }
        env.emit(EventKind::ShellKill, SpriteType::EnemyFlower.code());
        me.remove();
        ShellHit::Hit
    }

    fn on_fireball_hit(&mut self, me: &mut Entity, fireball: &Hitbox, env: &mut Env<'_>) -> bool {
        if !fireball.strikes(&me.body) {
            return false;
        }
        env.emit(EventKind::FireKill, SpriteType::EnemyFlower.code());
        me.remove();
        true
    }

    fn on_bump(&mut self, me: &mut Entity, tx: i32, ty: i32, _facing: i32, env: &mut Env<'_>) {
        if me.body.rests_on_column(tx, ty) {
            me.remove();
            env.emit(EventKind::BumpKill, SpriteType::EnemyFlower.code());
        }
    }
}
