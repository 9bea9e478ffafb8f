//! Power-ups released from blocks

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, MoveRules, move_body};
use super::player::Player;
use super::sprite::{Behavior, Entity, Sprite, SpriteKind, SpriteType, player_contact};
use super::state::Env;
use crate::consts::*;

/// Mushroom, fire flower or 1-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub species: SpriteType,
    /// Ticks since release
    pub age: u32,
}

impl Pickup {
    pub fn spawn(species: SpriteType, pos: Vec2) -> Sprite {
        let mut body = Body::new(pos, 4.0, 12.0);
        body.facing = 1;
        Sprite::new(body, SpriteKind::Pickup(Self { species, age: 0 }), None)
    }

    /// Flowers stay put once out of their block
    fn walks(&self) -> bool {
        self.species != SpriteType::FireFlower
    }
}

impl Behavior for Pickup {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>) {
        let body = &mut me.body;
        if self.age < PICKUP_RISE_TICKS {
            body.pos.y -= 1.0;
            self.age += 1;
            return;
        }
        if !self.walks() {
            return;
        }

        if body.vel.x > 2.0 {
            body.facing = 1;
        }
        if body.vel.x < -2.0 {
            body.facing = -1;
        }
        body.vel.x = body.facing as f32 * ENEMY_SPEED;

        let mut sensor = env.terrain_sensor();
        let xa = body.vel.x;
        if move_body(body, xa, 0.0, MoveRules::FREE, &mut sensor).blocked {
            body.facing = -body.facing;
        }
        body.on_ground = false;
        let ya = body.vel.y;
        move_body(body, 0.0, ya, MoveRules::FREE, &mut sensor);

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
        if player_contact(&me.body, player, 16.0) {
            player.collect(self.species, env);
            me.remove();
        }
    }

    fn on_bump(&mut self, me: &mut Entity, tx: i32, ty: i32, facing: i32, _env: &mut Env<'_>) {
        if self.walks() && me.body.rests_on_column(tx, ty) {
            me.body.facing = -facing;
            me.body.vel.y = BUMP_HOP;
        }
    }
}
