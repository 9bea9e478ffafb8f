//! The player: input handling, jump arc, power state
//!
//! The jump timer is signed. Positive values count down a rising jump;
//! negative values count up through the forced arc of a wall jump.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, Contact, MoveRules, TileSensor, move_body};
use super::event::EventKind;
use super::level::TilePos;
use super::projectile::Fireball;
use super::sprite::SpriteType;
use super::state::{Env, Status};
use super::tick::TickInput;
use super::tile::TileFeatures;
use crate::consts::*;
use crate::tile_of;

/// Player size / power level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    #[default]
    Small,
    Large,
    Fire,
}

impl PowerState {
    pub fn is_large(self) -> bool {
        self != PowerState::Small
    }
}

const PLAYER_WIDTH: f32 = 4.0;
const LARGE_HEIGHT: f32 = 24.0;
const SMALL_HEIGHT: f32 = 12.0;

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub power: PowerState,
    pub alive: bool,
    pub ducking: bool,
    pub sliding: bool,
    pub was_on_ground: bool,
    pub may_jump: bool,
    pub can_shoot: bool,
    pub jump_time: i32,
    pub x_jump_speed: f32,
    pub y_jump_speed: f32,
    /// Ticks left during which damage is ignored
    pub invulnerable: i32,
    /// Bottom y at the start of the current tick
    pub last_y: f32,
    /// Tick the current airborne stretch started on
    takeoff: Option<u32>,
}

impl Player {
    /// Player standing on the given tile
    pub fn new(spawn: TilePos, power: PowerState) -> Self {
        let pos = Vec2::new(
            (spawn.0 * TILE_SIZE + 8) as f32,
            (spawn.1 * TILE_SIZE + 15) as f32,
        );
        let mut body = Body::new(pos, PLAYER_WIDTH, SMALL_HEIGHT);
        body.facing = 1;
        let mut player = Self {
            body,
            power,
            alive: true,
            ducking: false,
            sliding: false,
            was_on_ground: false,
            may_jump: false,
            can_shoot: false,
            jump_time: 0,
            x_jump_speed: 0.0,
            y_jump_speed: 0.0,
            invulnerable: 0,
            last_y: pos.y,
            takeoff: None,
        };
        player.refresh_height();
        player
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    fn refresh_height(&mut self) {
        self.body.height = if self.power.is_large() && !self.ducking {
            LARGE_HEIGHT
        } else {
            SMALL_HEIGHT
        };
    }

    fn set_power(&mut self, power: PowerState, env: &mut Env<'_>) {
        self.power = power;
        self.refresh_height();
        env.session.pause_timer = POWER_CHANGE_PAUSE;
    }

    /// Falling onto `target` with the feet above its mid-height, after being
    /// airborne. The feet are measured where they were when the tick began.
    pub fn is_stomping(&self, target: &Body) -> bool {
        let midline = target.pos.y - target.height / 2.0;
        self.body.vel.y > 0.0
            && self.last_y <= midline
            && (!self.body.on_ground || !self.was_on_ground)
    }

    /// Advance one tick under `input`
    pub fn update(&mut self, input: &TickInput, env: &mut Env<'_>) {
        if self.invulnerable > 0 {
            self.invulnerable -= 1;
        }
        self.was_on_ground = self.body.on_ground;
        self.last_y = self.body.pos.y;
        let side_speed = if input.speed { RUN_SPEED } else { WALK_SPEED };

        if self.body.on_ground {
            self.ducking = input.down && self.power.is_large();
            self.refresh_height();
        }

        if self.body.vel.x > 2.0 {
            self.body.facing = 1;
        }
        if self.body.vel.x < -2.0 {
            self.body.facing = -1;
        }

        self.update_jump(input, env);

        if input.left && !self.ducking {
            if self.body.facing == 1 {
                self.sliding = false;
            }
            self.body.vel.x -= side_speed;
            if self.jump_time >= 0 {
                self.body.facing = -1;
            }
        }
        if input.right && !self.ducking {
            if self.body.facing == -1 {
                self.sliding = false;
            }
            self.body.vel.x += side_speed;
            if self.jump_time >= 0 {
                self.body.facing = 1;
            }
        }

        if (!input.left && !input.right)
            || self.ducking
            || self.body.vel.y < 0.0
            || self.body.on_ground
        {
            self.sliding = false;
        }

        if input.speed
            && self.can_shoot
            && self.power == PowerState::Fire
            && env.session.fireballs_on_screen < MAX_FIREBALLS
        {
            let pos = self.body.pos + Vec2::new((self.body.facing * 6) as f32, -20.0);
            env.add(Fireball::spawn(pos, self.body.facing));
        }

        self.can_shoot = !input.speed;
        self.may_jump = (self.body.on_ground || self.sliding) && !input.jump;

        if self.body.vel.x.abs() < STOP_THRESHOLD {
            self.body.vel.x = 0.0;
        }
        if self.sliding {
            self.body.vel.y *= 0.5;
        }

        self.body.on_ground = false;
        let contact = self.move_by(self.body.vel.x, 0.0, env);
        if let Some(flush) = contact.wall_flush {
            self.sliding = flush;
        }
        let contact = self.move_by(0.0, self.body.vel.y, env);
        if contact.hit_ceiling {
            self.jump_time = 0;
        }

        self.track_air_time(env);

        if self.body.pos.x < 0.0 {
            self.body.pos.x = 0.0;
            self.body.vel.x = 0.0;
        }
        let exit_x = env.level.exit_x();
        if self.body.pos.x >= exit_x {
            self.body.pos.x = exit_x;
            self.body.vel.x = 0.0;
            self.win(env);
        }

        self.body.vel.y *= VERTICAL_DAMPING;
        self.body.vel.x *= if self.body.on_ground {
            GROUND_INERTIA
        } else {
            AIR_INERTIA
        };
        if !self.body.on_ground {
            self.body.vel.y += PLAYER_GRAVITY;
        }
    }

    fn update_jump(&mut self, input: &TickInput, env: &mut Env<'_>) {
        let continuing_wall_jump = self.jump_time < 0 && !self.body.on_ground && !self.sliding;
        if !input.jump && !continuing_wall_jump {
            self.jump_time = 0;
            return;
        }

        if self.jump_time < 0 {
            self.body.vel.x = self.x_jump_speed;
            self.body.vel.y = -(self.jump_time as f32) * self.y_jump_speed;
            self.jump_time += 1;
        } else if self.body.on_ground && self.may_jump {
            self.x_jump_speed = 0.0;
            self.y_jump_speed = JUMP_IMPULSE;
            self.jump_time = JUMP_TICKS;
            self.body.vel.y = self.jump_time as f32 * self.y_jump_speed;
            self.body.on_ground = false;
            self.sliding = false;
            self.emit(EventKind::Jump, 0, env);
        } else if self.sliding && self.may_jump {
            self.x_jump_speed = -(self.body.facing as f32) * WALL_JUMP_SPEED;
            self.y_jump_speed = WALL_JUMP_IMPULSE;
            self.jump_time = WALL_JUMP_TICKS;
            self.body.vel.x = self.x_jump_speed;
            self.body.vel.y = -(self.jump_time as f32) * self.y_jump_speed;
            self.body.on_ground = false;
            self.sliding = false;
            self.body.facing = -self.body.facing;
            self.emit(EventKind::Jump, 1, env);
        } else if self.jump_time > 0 {
            self.body.vel.x += self.x_jump_speed;
            self.body.vel.y = self.jump_time as f32 * self.y_jump_speed;
            self.jump_time -= 1;
        }
    }

    /// Whether a floor tile lies directly under any of the three foot sensors.
    ///
    /// A grounded body drops `on_ground` for a tick now and then while its
    /// leftover fall speed decays; that is not leaving the ground.
    fn resting_on_floor(&self, env: &Env<'_>) -> bool {
        let Vec2 { x, y } = self.body.pos;
        let ty = tile_of(y + 1.0);
        [x - self.body.width, x, x + self.body.width]
            .into_iter()
            .any(|px| env.terrain.is_blocking(tile_of(px), ty, 0.0, 1.0))
    }

    /// Open an airborne stretch on takeoff; close it with a LAND event
    /// (param: ticks in the air)
    fn track_air_time(&mut self, env: &mut Env<'_>) {
        let grounded = self.body.on_ground || self.resting_on_floor(env);
        match (self.takeoff, grounded) {
            (None, false) => self.takeoff = Some(env.tick),
            (Some(start), true) => {
                self.takeoff = None;
                self.emit(EventKind::Land, (env.tick - start) as i32, env);
            }
            _ => {}
        }
    }

    /// Move through tiles, collecting coins and bumping blocks on the way
    pub fn move_by(&mut self, xa: f32, ya: f32, env: &mut Env<'_>) -> Contact {
        env.track(self);
        let mut sensor = PlayerSensor {
            env,
            large: self.power.is_large(),
        };
        move_body(&mut self.body, xa, ya, MoveRules::FREE, &mut sensor)
    }

    fn emit(&self, kind: EventKind, param: i32, env: &mut Env<'_>) {
        env.track(self);
        env.emit(kind, param);
    }

    /// Bounce off something stomped; `target_y` is the stomped sprite's mid-height
    pub fn stomp(&mut self, target_y: f32, env: &mut Env<'_>) {
        self.move_by(0.0, target_y - self.body.pos.y, env);
        self.x_jump_speed = 0.0;
        self.y_jump_speed = JUMP_IMPULSE;
        self.jump_time = STOMP_JUMP_TICKS;
        self.body.vel.y = self.jump_time as f32 * self.y_jump_speed;
        self.body.on_ground = false;
        self.sliding = false;
        self.invulnerable = 1;
        env.track(self);
    }

    pub fn kick(&mut self) {
        self.invulnerable = 1;
    }

    /// Take damage from `source`. Ignored while invulnerable or once the run is over.
    pub fn hurt(&mut self, source: SpriteType, env: &mut Env<'_>) {
        if self.invulnerable > 0
            || !self.alive
            || env.session.status != Status::Running
            || env.session.pause_timer > 0
        {
            return;
        }
        self.emit(EventKind::Hurt, source.code(), env);
        match self.power {
            PowerState::Fire => {
                self.set_power(PowerState::Large, env);
                self.invulnerable = HURT_INVULNERABILITY;
            }
            PowerState::Large => {
                self.ducking = false;
                self.set_power(PowerState::Small, env);
                self.invulnerable = HURT_INVULNERABILITY;
            }
            PowerState::Small => self.die(env),
        }
    }

    pub fn die(&mut self, env: &mut Env<'_>) {
        self.alive = false;
        if env.finish(Status::Lose) {
            self.emit(EventKind::Lose, 0, env);
        }
    }

    fn win(&mut self, env: &mut Env<'_>) {
        if env.finish(Status::Win) {
            self.emit(EventKind::Win, 0, env);
        }
    }

    /// Apply a touched power-up
    pub fn collect(&mut self, species: SpriteType, env: &mut Env<'_>) {
        self.emit(EventKind::Collect, species.code(), env);
        match (species, self.power) {
            (SpriteType::LifeMushroom, _) => env.session.lives += 1,
            (SpriteType::Mushroom | SpriteType::FireFlower, PowerState::Small) => {
                self.set_power(PowerState::Large, env)
            }
            (SpriteType::FireFlower, PowerState::Large) => self.set_power(PowerState::Fire, env),
            _ => {
                env.gain_coin();
                self.emit(EventKind::Coin, species.code(), env);
            }
        }
    }
}

/// Tile sensor for the player's own movement
struct PlayerSensor<'e, 'a> {
    env: &'e mut Env<'a>,
    large: bool,
}

impl TileSensor for PlayerSensor<'_, '_> {
    fn solid(&self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        self.env.terrain.is_blocking(tx, ty, xa, ya)
    }

    fn blocks(&mut self, tx: i32, ty: i32, xa: f32, ya: f32) -> bool {
        let blocking = self.solid(tx, ty, xa, ya);
        if self
            .env
            .terrain
            .features(tx, ty)
            .contains(TileFeatures::PICKABLE)
        {
            self.env.collect_tile(tx, ty);
        }
        if blocking && ya < 0.0 {
            self.env.bump(tx, ty, self.large);
        }
        blocking
    }
}
