//! Shells, fireballs and bullets

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, MoveRules, TileSensor, move_body};
use super::event::EventKind;
use super::level::TilePos;
use super::player::Player;
use super::sprite::{Behavior, Entity, Hitbox, ShellHit, Sprite, SpriteKind, SpriteType, player_contact};
use super::state::Env;
use crate::consts::*;

/// Player-to-sprite reach for shells and bullets
const CONTACT_REACH: f32 = 16.0;

/// Kickable shell left behind by a stomped koopa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    /// Red shells keep to their ledge while moving
    pub red: bool,
}

impl Shell {
    pub fn spawn(pos: Vec2, red: bool, origin: Option<TilePos>) -> Sprite {
        let mut body = Body::new(pos, 4.0, 12.0);
        body.vel.y = SHELL_POP;
        Sprite::new(body, SpriteKind::Shell(Self { red }), origin)
    }

    fn is_moving(me: &Entity) -> bool {
        me.body.facing != 0
    }
}

/// A sliding shell breaks and bumps the blocks it runs into sideways
struct ShellSensor<'e, 'a> {
    env: &'e mut Env<'a>,
}

impl TileSensor for ShellSensor<'_, '_> {
    fn solid(&self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        self.env.terrain.is_blocking(tx, ty, xa, ya)
    }

    fn blocks(&mut self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        let blocking = self.solid(tx, ty, xa, ya);
        if blocking && ya == 0.0 && xa != 0.0 {
            self.env.bump(tx, ty, true);
        }
        blocking
    }
}

impl Behavior for Shell {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>) {
        let body = &mut me.body;
        if body.vel.x > 2.0 {
            body.facing = 1;
        }
        if body.vel.x < -2.0 {
            body.facing = -1;
        }
        body.vel.x = body.facing as f32 * SHELL_SPEED;
        if body.facing != 0 {
            env.pending.shell_checks.push(me.id);
        }

        let rules = MoveRules::avoiding_cliffs(self.red && body.facing != 0);
        let mut sensor = ShellSensor { env };
        let xa = body.vel.x;
        if move_body(body, xa, 0.0, rules, &mut sensor).blocked {
            body.facing = -body.facing;
        }
        body.on_ground = false;
        let ya = body.vel.y;
        move_body(body, 0.0, ya, rules, &mut sensor);

        body.vel.y *= VERTICAL_DAMPING;
        body.vel.x *= if body.on_ground {
            GROUND_INERTIA
        } else {
            AIR_INERTIA
        };
        if !body.on_ground {
            body.vel.y += ENEMY_GRAVITY;
        }
    }

    fn collide_check(&mut self, me: &mut Entity, player: &mut Player, env: &mut Env<'_>) {
        if !player_contact(&me.body, player, CONTACT_REACH) {
            return;
        }

        if player.is_stomping(&me.body) {
            player.stomp(me.body.pos.y - me.body.height / 2.0, env);
            if Self::is_moving(me) {
                me.body.vel.x = 0.0;
                me.body.facing = 0;
            } else {
                me.body.facing = player.body.facing;
            }
        } else if Self::is_moving(me) {
            player.hurt(SpriteType::Shell, env);
        } else {
            player.kick();
            env.emit(EventKind::Kick, SpriteType::Shell.code());
            me.body.facing = player.body.facing;
        }
    }

    fn on_shell_hit(&mut self, me: &mut Entity, shell: &Hitbox, env: &mut Env<'_>) -> ShellHit {
        if !shell.strikes(&me.body) {
            return ShellHit::Miss;
        }
        env.emit(EventKind::ShellKill, SpriteType::Shell.code());
        me.remove();
        ShellHit::Mutual
    }

    fn on_fireball_hit(&mut self, me: &mut Entity, fireball: &Hitbox, env: &mut Env<'_>) -> bool {
        if !fireball.strikes(&me.body) {
            return false;
        }
        if !Self::is_moving(me) {
            env.emit(EventKind::FireKill, SpriteType::Shell.code());
            me.remove();
        }
        true
    }

    fn on_bump(&mut self, me: &mut Entity, tx: i32, ty: i32, facing: i32, _env: &mut Env<'_>) {
        if me.body.rests_on_column(tx, ty) {
            me.body.facing = -facing;
            me.body.vel.y = BUMP_HOP;
        }
    }
}

/// Bouncing player projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fireball;

impl Fireball {
    pub fn spawn(pos: Vec2, facing: i32) -> Sprite {
        let mut body = Body::new(pos, 4.0, 8.0);
        body.facing = facing;
        body.vel.y = FIREBALL_DROP;
        Sprite::new(body, SpriteKind::Fireball(Self), None)
    }
}

impl Behavior for Fireball {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>) {
        let body = &mut me.body;
        if body.vel.x > 2.0 {
            body.facing = 1;
        }
        if body.vel.x < -2.0 {
            body.facing = -1;
        }
        body.vel.x = body.facing as f32 * FIREBALL_SPEED;
        env.pending.fireball_checks.push(me.id);

        let mut sensor = env.terrain_sensor();
        let xa = body.vel.x;
        if move_body(body, xa, 0.0, MoveRules::FREE, &mut sensor).blocked {
            me.alive = false;
            return;
        }
        body.on_ground = false;
        let ya = body.vel.y;
        move_body(body, 0.0, ya, MoveRules::FREE, &mut sensor);
        if body.on_ground {
            body.vel.y = FIREBALL_BOUNCE;
        }

        body.vel.y *= FIREBALL_DAMPING;
        body.vel.x *= if body.on_ground {
            GROUND_INERTIA
        } else {
            AIR_INERTIA
        };
        if !body.on_ground {
            body.vel.y += FIREBALL_GRAVITY;
        }
    }
}

/// Straight-flying launcher projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet;

impl Bullet {
    pub fn spawn(pos: Vec2, facing: i32) -> Sprite {
        let mut body = Body::new(pos, 4.0, 12.0);
        body.facing = facing;
        Sprite::new(body, SpriteKind::Bullet(Self), None)
    }
}

impl Behavior for Bullet {
    fn update(&mut self, me: &mut Entity, _env: &mut Env<'_>) {
        // bullets ignore terrain
        me.body.vel.x = me.body.facing as f32 * BULLET_SPEED;
        me.body.pos.x += me.body.vel.x;
    }

    fn collide_check(&mut self, me: &mut Entity, player: &mut Player, env: &mut Env<'_>) {
        if !player_contact(&me.body, player, CONTACT_REACH) {
            return;
        }
        if player.is_stomping(&me.body) {
            player.stomp(me.body.pos.y - me.body.height / 2.0, env);
            env.emit(EventKind::StompKill, SpriteType::BulletBill.code());
            me.remove();
        } else {
            player.hurt(SpriteType::BulletBill, env);
        }
    }

    fn on_shell_hit(&mut self, me: &mut Entity, shell: &Hitbox, env: &mut Env<'_>) -> ShellHit {
        if !shell.strikes(&me.body) {
            return ShellHit::Miss;
        }
        env.emit(EventKind::ShellKill, SpriteType::BulletBill.code());
        me.remove();
        ShellHit::Hit
    }

    fn on_fireball_hit(&mut self, me: &mut Entity, fireball: &Hitbox, _env: &mut Env<'_>) -> bool {
        fireball.strikes(&me.body)
    }
}
