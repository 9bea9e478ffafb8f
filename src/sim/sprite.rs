//! Sprite model shared by every non-player entity
//!
//! A sprite is an [`Entity`] (identity, body, liveness, spawn marker) plus a
//! closed set of behaviours in [`SpriteKind`]. Each behaviour implements
//! [`Behavior`]; the world never needs to know which variant it is holding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Body;
use super::enemy::{Enemy, PipeFlower};
use super::level::TilePos;
use super::pickup::Pickup;
use super::player::Player;
use super::projectile::{Bullet, Fireball, Shell};
use super::state::Env;

/// Sprite type codes, shared with event parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpriteType {
    Goomba,
    GoombaWinged,
    RedKoopa,
    RedKoopaWinged,
    GreenKoopa,
    GreenKoopaWinged,
    Spiky,
    SpikyWinged,
    BulletBill,
    EnemyFlower,
    Mushroom,
    FireFlower,
    Shell,
    LifeMushroom,
    Fireball,
}

impl SpriteType {
    pub const fn code(self) -> i32 {
        match self {
            SpriteType::Goomba => 2,
            SpriteType::GoombaWinged => 3,
            SpriteType::RedKoopa => 4,
            SpriteType::RedKoopaWinged => 5,
            SpriteType::GreenKoopa => 6,
            SpriteType::GreenKoopaWinged => 7,
            SpriteType::Spiky => 8,
            SpriteType::SpikyWinged => 9,
            SpriteType::BulletBill => 10,
            SpriteType::EnemyFlower => 11,
            SpriteType::Mushroom => 12,
            SpriteType::FireFlower => 13,
            SpriteType::Shell => 14,
            SpriteType::LifeMushroom => 15,
            SpriteType::Fireball => 16,
        }
    }

    pub fn is_winged(self) -> bool {
        matches!(
            self,
            SpriteType::GoombaWinged
                | SpriteType::RedKoopaWinged
                | SpriteType::GreenKoopaWinged
                | SpriteType::SpikyWinged
        )
    }

    pub fn is_koopa(self) -> bool {
        matches!(
            self,
            SpriteType::RedKoopa
                | SpriteType::RedKoopaWinged
                | SpriteType::GreenKoopa
                | SpriteType::GreenKoopaWinged
        )
    }

    pub fn is_red(self) -> bool {
        matches!(self, SpriteType::RedKoopa | SpriteType::RedKoopaWinged)
    }

    pub fn is_spiky(self) -> bool {
        matches!(self, SpriteType::Spiky | SpriteType::SpikyWinged)
    }

    /// Can be defeated by landing on it
    pub fn is_stompable(self) -> bool {
        !self.is_spiky() && self != SpriteType::EnemyFlower
    }
}

/// Identity and physical state of a sprite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub body: Body,
    /// Cleared on removal; the sprite is dropped at the end of the tick
    pub alive: bool,
    /// Spawn marker this sprite came from
    pub origin: Option<TilePos>,
}

impl Entity {
    pub fn remove(&mut self) {
        self.alive = false;
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            id: self.id,
            pos: self.body.pos,
            height: self.body.height,
            facing: self.body.facing,
        }
    }
}

/// Position snapshot of a shell or fireball used during interaction checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub id: u32,
    pub pos: Vec2,
    pub height: f32,
    pub facing: i32,
}

impl Hitbox {
    /// Within 16 px horizontally and vertically overlapping `body`
    pub fn strikes(&self, body: &Body) -> bool {
        let d = self.pos - body.pos;
        d.x > -16.0 && d.x < 16.0 && d.y > -body.height && d.y < self.height
    }
}

/// Whether the player touches `body`.
///
/// `reach` is the open horizontal bound on center distance.
pub fn player_contact(body: &Body, player: &Player, reach: f32) -> bool {
    let d = player.body.pos - body.pos;
    d.x > -reach && d.x < reach && d.y > -body.height && d.y < player.body.height
}

/// Outcome of a moving shell reaching a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellHit {
    Miss,
    /// The sprite was knocked out; the shell keeps going
    Hit,
    /// Both the sprite and the shell are destroyed
    Mutual,
}

/// Per-tick behaviour of a sprite variant.
///
/// Every hook receives the sprite's own [`Entity`] and the tick context.
pub trait Behavior {
    fn update(&mut self, me: &mut Entity, env: &mut Env<'_>);

    /// Interaction with the player
    fn collide_check(&mut self, _me: &mut Entity, _player: &mut Player, _env: &mut Env<'_>) {}

    fn on_shell_hit(&mut self, _me: &mut Entity, _shell: &Hitbox, _env: &mut Env<'_>) -> ShellHit {
        ShellHit::Miss
    }

    /// Returns true if the fireball is used up
    fn on_fireball_hit(&mut self, _me: &mut Entity, _fireball: &Hitbox, _env: &mut Env<'_>) -> bool {
        false
    }

    /// The tile (tx, ty) was bumped from below by something facing `facing`
    fn on_bump(&mut self, _me: &mut Entity, _tx: i32, _ty: i32, _facing: i32, _env: &mut Env<'_>) {}
}

/// Behaviour variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpriteKind {
    Enemy(Enemy),
    Flower(PipeFlower),
    Shell(Shell),
    Fireball(Fireball),
    Bullet(Bullet),
    Pickup(Pickup),
}

/// A live non-player entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub entity: Entity,
    pub kind: SpriteKind,
}

impl Sprite {
    /// New sprite; the id is assigned when it is queued for addition
    pub fn new(body: Body, kind: SpriteKind, origin: Option<TilePos>) -> Self {
        Self {
            entity: Entity {
                id: 0,
                body,
                alive: true,
                origin,
            },
            kind,
        }
    }

    pub fn id(&self) -> u32 {
        self.entity.id
    }

    pub fn is_alive(&self) -> bool {
        self.entity.alive
    }

    pub fn body(&self) -> &Body {
        &self.entity.body
    }

    pub fn sprite_type(&self) -> SpriteType {
        match &self.kind {
            SpriteKind::Enemy(enemy) => enemy.species,
            SpriteKind::Flower(_) => SpriteType::EnemyFlower,
            SpriteKind::Shell(_) => SpriteType::Shell,
            SpriteKind::Fireball(_) => SpriteType::Fireball,
            SpriteKind::Bullet(_) => SpriteType::BulletBill,
            SpriteKind::Pickup(pickup) => pickup.species,
        }
    }

    /// Counts toward kill statistics when it falls out of the level
    pub fn is_enemy(&self) -> bool {
        matches!(
            self.kind,
            SpriteKind::Enemy(_) | SpriteKind::Flower(_) | SpriteKind::Shell(_) | SpriteKind::Bullet(_)
        )
    }

    fn split(&mut self) -> (&mut Entity, &mut dyn Behavior) {
        let behavior: &mut dyn Behavior = match &mut self.kind {
            SpriteKind::Enemy(enemy) => enemy,
            SpriteKind::Flower(flower) => flower,
            SpriteKind::Shell(shell) => shell,
            SpriteKind::Fireball(fireball) => fireball,
            SpriteKind::Bullet(bullet) => bullet,
            SpriteKind::Pickup(pickup) => pickup,
        };
        (&mut self.entity, behavior)
    }

    pub fn update(&mut self, env: &mut Env<'_>) {
        let (me, behavior) = self.split();
        behavior.update(me, env);
    }

    pub fn collide_check(&mut self, player: &mut Player, env: &mut Env<'_>) {
        env.track(player);
        let (me, behavior) = self.split();
        behavior.collide_check(me, player, env);
    }

    pub fn on_shell_hit(&mut self, shell: &Hitbox, env: &mut Env<'_>) -> ShellHit {
        let (me, behavior) = self.split();
        behavior.on_shell_hit(me, shell, env)
    }

    pub fn on_fireball_hit(&mut self, fireball: &Hitbox, env: &mut Env<'_>) -> bool {
        let (me, behavior) = self.split();
        behavior.on_fireball_hit(me, fireball, env)
    }

    pub fn on_bump(&mut self, tx: i32, ty: i32, facing: i32, env: &mut Env<'_>) {
        let (me, behavior) = self.split();
        behavior.on_bump(me, tx, ty, facing, env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(SpriteType::Goomba.code(), 2);
        assert_eq!(SpriteType::EnemyFlower.code(), 11);
        assert_eq!(SpriteType::Fireball.code(), 16);
    }

    #[test]
    fn test_type_flags() {
        assert!(SpriteType::GreenKoopaWinged.is_winged());
        assert!(SpriteType::GreenKoopaWinged.is_koopa());
        assert!(!SpriteType::GreenKoopa.is_red());
        assert!(!SpriteType::SpikyWinged.is_stompable());
        assert!(!SpriteType::EnemyFlower.is_stompable());
        assert!(SpriteType::BulletBill.is_stompable());
    }

    #[test]
    fn test_hitbox_reach() {
        let body = Body::new(Vec2::new(100.0, 200.0), 4.0, 12.0);
        let near = Hitbox {
            id: 1,
            pos: Vec2::new(110.0, 195.0),
            height: 8.0,
            facing: 1,
        };
        assert!(near.strikes(&body));
        let far = Hitbox {
            pos: Vec2::new(116.0, 195.0),
            ..near
        };
        assert!(!far.strikes(&body));
    }
}
