//! Fixed timestep simulation tick
//!
//! One call advances a world by exactly one step. The phase order below is
//! what makes two runs with the same inputs produce the same states.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, PipeFlower};
use super::event::EventKind;
use super::level::TilePos;
use super::projectile::Bullet;
use super::sprite::{ShellHit, Sprite, SpriteKind, SpriteType};
use super::state::{Env, Status, World};
use super::tile::TileFeatures;
use crate::consts::*;
use crate::tile_of;

/// Buttons held during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub jump: bool,
    /// Run, and fire when powered up
    pub speed: bool,
}

impl TickInput {
    pub const LEFT: u8 = 1 << 0;
    pub const RIGHT: u8 = 1 << 1;
    pub const DOWN: u8 = 1 << 2;
    pub const JUMP: u8 = 1 << 3;
    pub const SPEED: u8 = 1 << 4;
    /// Bits that carry a button
    pub const MASK: u8 = 0x1f;

    /// Decode the low five bits; the rest are ignored
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & Self::LEFT != 0,
            right: bits & Self::RIGHT != 0,
            down: bits & Self::DOWN != 0,
            jump: bits & Self::JUMP != 0,
            speed: bits & Self::SPEED != 0,
        }
    }

    pub const fn bits(self) -> u8 {
        (self.left as u8) * Self::LEFT
            | (self.right as u8) * Self::RIGHT
            | (self.down as u8) * Self::DOWN
            | (self.jump as u8) * Self::JUMP
            | (self.speed as u8) * Self::SPEED
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput) {
    if world.session.status.is_terminal() {
        log::debug!(
            "Ignoring tick {} on a finished world ({:?})",
            world.tick,
            world.session.status
        );
        return;
    }

    // Power-change freeze: nothing moves and the clock stands still
    if world.session.pause_timer > 0 {
        world.session.pause_timer -= 1;
        publish_events(world);
        return;
    }

    let level_width = world.level.pixel_width();
    world.window_x = (world.player.body.pos.x - VIEW_WIDTH / 2.0)
        .min(level_width - VIEW_WIDTH)
        .max(0.0);
    let window_x = world.window_x;
    let tick = world.tick;

    let mut last_seen = std::mem::take(&mut world.last_seen);
    {
        let (mut env, player, sprites) = world.split();

        cull(window_x, sprites, &mut env);
        if player.body.pos.y > env.level.pixel_height() + FALL_MARGIN {
            player.die(&mut env);
        }

        env.session.fireballs_on_screen = sprites
            .iter()
            .filter(|s| s.is_alive() && matches!(s.kind, SpriteKind::Fireball(_)))
            .count();

        spawn_in_window(window_x, tick, player.body.pos.x, &mut last_seen, sprites, &mut env);

        if env.session.status == Status::Running {
            player.update(input, &mut env);

            for sprite in sprites.iter_mut().filter(|s| s.is_alive()) {
                env.track(player);
                sprite.update(&mut env);
            }

            if player.alive {
                for sprite in sprites.iter_mut() {
                    if sprite.is_alive() {
                        sprite.collide_check(player, &mut env);
                    }
                }
            }

            check_shells(sprites, &mut env);
            check_fireballs(sprites, &mut env);
            check_bumps(sprites, player.body.facing, &mut env);
        }
    }
    world.last_seen = last_seen;

    finish_tick(world);
}

/// Apply queued changes, advance the clock and publish the tick's events.
///
/// The tick that reaches the ceiling ends the run unless it already ended.
fn finish_tick(world: &mut World) {
    let pending = &mut world.pending;
    world.sprites.retain(Sprite::is_alive);
    pending.added.retain(Sprite::is_alive);
    world.sprites.append(&mut pending.added);
    pending.shell_checks.clear();
    pending.fireball_checks.clear();
    pending.bumps.clear();

    if world.max_ticks.is_some_and(|max| world.tick + 1 >= max) {
        let (mut env, _, _) = world.split();
        if env.finish(Status::TimeOut) {
            env.emit(EventKind::TimeOut, 0);
        }
    }

    world.tick += 1;
    publish_events(world);
}

fn publish_events(world: &mut World) {
    let events = std::mem::take(&mut world.buffer);
    world.log.extend(events.iter().copied());
    world.last_events = events;
}

/// Drop sprites that left the activation window or fell out of the level
fn cull(window_x: f32, sprites: &mut [Sprite], env: &mut Env<'_>) {
    let left = window_x - VIEW_MARGIN;
    let right = window_x + VIEW_WIDTH + VIEW_MARGIN;
    let bottom = env.level.pixel_height() + FALL_MARGIN;

    for sprite in sprites.iter_mut().filter(|s| s.is_alive()) {
        let pos = sprite.body().pos;
        if pos.y > bottom {
            if sprite.is_enemy() {
                env.emit(EventKind::FallKill, sprite.sprite_type().code());
            }
            sprite.entity.remove();
        } else if pos.x < left || pos.x > right {
            sprite.entity.remove();
        }
    }
}

/// Spawn marker sprites and fire launchers inside the activation window
fn spawn_in_window(
    window_x: f32,
    tick: u32,
    player_x: f32,
    last_seen: &mut HashMap<TilePos, u32>,
    sprites: &[Sprite],
    env: &mut Env<'_>,
) {
    let x_range = tile_of(window_x) - 1..=tile_of(window_x + VIEW_WIDTH) + 1;
    let y_range = -1..=tile_of(VIEW_HEIGHT) + 1;

    for x in x_range {
        let center = (x * TILE_SIZE + 8) as f32;
        let dir = if center > player_x + 16.0 {
            -1
        } else if center < player_x - 16.0 {
            1
        } else {
            0
        };

        for y in y_range.clone() {
            if let Some(kind) = env.level.template_at(x, y) {
                let seen_last_tick = tick > 0 && last_seen.get(&(x, y)) == Some(&(tick - 1));
                let present = sprites
                    .iter()
                    .any(|s| s.is_alive() && s.entity.origin == Some((x, y)));
                if !seen_last_tick && !present {
                    let sprite = match kind {
                        SpriteType::EnemyFlower => PipeFlower::spawn(x, y, player_x),
                        species => Enemy::spawn(species, x, y, dir),
                    };
                    env.add(sprite);
                }
                last_seen.insert((x, y), tick);
            }

            if dir != 0
                && env.terrain.features(x, y).contains(TileFeatures::SPAWNER)
                && (i64::from(tick) - 2 * i64::from(x)).rem_euclid(i64::from(BULLET_INTERVAL)) == 0
            {
                let pos = Vec2::new(
                    center + (dir * 8) as f32,
                    (y * TILE_SIZE + 15) as f32,
                );
                env.add(Bullet::spawn(pos, dir));
            }
        }
    }
}

/// Moving shells against every other sprite
fn check_shells(sprites: &mut [Sprite], env: &mut Env<'_>) {
    let shells = std::mem::take(&mut env.pending.shell_checks);
    for shell_id in shells {
        let Some(shell) = sprites
            .iter()
            .find(|s| s.id() == shell_id && s.is_alive())
            .map(|s| s.entity.hitbox())
        else {
            continue;
        };

        for i in 0..sprites.len() {
            if sprites[i].id() == shell_id || !sprites[i].is_alive() {
                continue;
            }
            if sprites[i].on_shell_hit(&shell, env) == ShellHit::Mutual {
                if let Some(own) = sprites.iter_mut().find(|s| s.id() == shell_id) {
                    own.entity.remove();
                }
                break;
            }
        }
    }
}

/// Fireballs against every other sprite; a fireball is spent on its first hit
fn check_fireballs(sprites: &mut [Sprite], env: &mut Env<'_>) {
    let fireballs = std::mem::take(&mut env.pending.fireball_checks);
    for fireball_id in fireballs {
        let Some(fireball) = sprites
            .iter()
            .find(|s| s.id() == fireball_id && s.is_alive())
            .map(|s| s.entity.hitbox())
        else {
            continue;
        };

        for i in 0..sprites.len() {
            if sprites[i].id() == fireball_id || !sprites[i].is_alive() {
                continue;
            }
            if sprites[i].on_fireball_hit(&fireball, env) {
                if let Some(own) = sprites.iter_mut().find(|s| s.id() == fireball_id) {
                    own.entity.remove();
                }
                break;
            }
        }
    }
}

/// Knock whatever stands on a bumped tile
fn check_bumps(sprites: &mut [Sprite], facing: i32, env: &mut Env<'_>) {
    let bumps = std::mem::take(&mut env.pending.bumps);
    for (tx, ty) in bumps {
        for sprite in sprites.iter_mut().filter(|s| s.is_alive()) {
            sprite.on_bump(tx, ty, facing, env);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::player::PowerState;

    fn world(rows: &[&str], config: SimConfig) -> World {
        let width = rows[0].len();
        let mut lines = vec!["-".repeat(width); 16 - rows.len()];
        lines.extend(rows.iter().map(|r| r.to_string()));
        World::from_text(&lines.join("\n"), config).unwrap()
    }

    fn flat(body: &str) -> World {
        world(&[body, &"X".repeat(body.len())], SimConfig::default())
    }

    const RIGHT: TickInput = TickInput::from_bits(TickInput::RIGHT);

    #[test]
    fn test_input_bits() {
        let input = TickInput {
            right: true,
            jump: true,
            ..Default::default()
        };
        assert_eq!(input.bits(), 0b01010);
        assert_eq!(TickInput::from_bits(0b01010), input);
        assert_eq!(TickInput::from_bits(0xff).bits(), TickInput::MASK);
    }

    #[test]
    fn test_player_falls_and_lands() {
        let mut world = flat("M--------F");
        let input = TickInput::default();
        for _ in 0..5 {
            world.tick(&input);
        }
        assert!(world.player().body.on_ground);
        assert_eq!(world.player().pos().y, 239.0);
        assert_eq!(world.tick_count(), 5);
    }

    #[test]
    fn test_player_never_left_of_zero() {
        let mut world = flat("M--------F");
        let input = TickInput::from_bits(TickInput::LEFT | TickInput::SPEED);
        for _ in 0..30 {
            world.tick(&input);
            assert!(world.player().pos().x >= 0.0);
        }
        assert_eq!(world.player().pos().x, 0.0);
    }

    #[test]
    fn test_jump_and_land_events() {
        let mut world = flat("M------------------F");
        for _ in 0..3 {
            world.tick(&TickInput::default());
        }
        let jump = TickInput::from_bits(TickInput::JUMP);
        for _ in 0..30 {
            world.tick(&jump);
        }
        let log = world.events();
        assert_eq!(log.count(EventKind::Jump), 1);
        assert_eq!(log.count(EventKind::Land), 1);
    }

    #[test]
    fn test_reaching_exit_wins() {
        let mut world = flat("M------F");
        for _ in 0..200 {
            world.tick(&RIGHT);
            if !world.is_running() {
                break;
            }
        }
        assert_eq!(world.status(), Status::Win);
        assert_eq!(world.player().pos().x, 112.0);
        assert_eq!(world.events().count(EventKind::Win), 1);
    }

    #[test]
    fn test_finished_world_ignores_ticks() {
        let mut world = flat("M------F");
        while world.is_running() {
            world.tick(&RIGHT);
        }
        let ticks = world.tick_count();
        let events = world.events().len();
        world.tick(&RIGHT);
        assert_eq!(world.tick_count(), ticks);
        assert_eq!(world.events().len(), events);
    }

    #[test]
    fn test_timeout_at_ceiling() {
        let config = SimConfig::default().with_time_limit(300);
        let mut world = world(&["M--------F", "XXXXXXXXXX"], config);
        for _ in 0..9 {
            world.tick(&TickInput::default());
        }
        assert_eq!(world.status(), Status::Running);

        // the tenth call reaches the ceiling and ends the run itself
        world.tick(&TickInput::default());
        assert_eq!(world.status(), Status::TimeOut);
        assert_eq!(world.tick_count(), 10);
        assert_eq!(world.last_events().len(), 1);
        assert_eq!(world.last_events()[0].tick, 9);

        for _ in 0..10 {
            world.tick(&TickInput::default());
        }
        assert_eq!(world.tick_count(), 10);
        assert_eq!(world.events().count(EventKind::TimeOut), 1);
    }

    #[test]
    fn test_marker_spawns_once_in_window() {
        let mut world = flat("M-------gF");
        world.tick(&TickInput::default());
        assert_eq!(world.sprites().len(), 1);
        assert_eq!(world.sprites()[0].sprite_type(), SpriteType::Goomba);
        assert_eq!(world.sprites()[0].body().facing, -1);
        world.tick(&TickInput::default());
        assert_eq!(world.sprites().len(), 1);
    }

    #[test]
    fn test_pit_fall_loses() {
        let mut world = world(&["M--------F", "XX---XXXXX"], SimConfig::default());
        for _ in 0..200 {
            world.tick(&RIGHT);
            if !world.is_running() {
                break;
            }
        }
        assert_eq!(world.status(), Status::Lose);
        assert_eq!(world.events().count(EventKind::Lose), 1);
    }

    #[test]
    fn test_bumping_question_block_from_below() {
        let mut world = world(
            &["-----", "--?--", "-----", "-----", "--M--", "XXXXX"],
            SimConfig::default(),
        );
        for _ in 0..3 {
            world.tick(&TickInput::default());
        }
        let jump = TickInput::from_bits(TickInput::JUMP);
        for _ in 0..6 {
            world.tick(&jump);
        }
        assert_eq!(world.terrain().get(2, 11), crate::sim::tile::Tile::Used);
        assert_eq!(world.events().count(EventKind::Bump), 1);
        // small players get a mushroom
        assert_eq!(world.player().power, PowerState::Small);
        assert!(
            world
                .sprites()
                .iter()
                .any(|s| s.sprite_type() == SpriteType::Mushroom)
        );
    }

    #[test]
    fn test_bumped_block_knocks_out_enemy_on_top() {
        let mut world = flat("M--------F");
        world.terrain.set(3, 10, crate::sim::tile::Tile::QuestionCoin);
        let goomba = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 3, 9, -1));
        {
            let (mut env, _, sprites) = world.split();
            env.bump(3, 10, false);
            check_bumps(sprites, 1, &mut env);
            let knocked: Vec<_> = env
                .events
                .iter()
                .filter(|e| e.kind == EventKind::BumpKill)
                .collect();
            assert_eq!(knocked.len(), 1);
            assert_eq!(knocked[0].param, SpriteType::Goomba.code());
        }
        assert!(!world.sprite(goomba).is_some_and(|s| s.is_alive()));

        world.tick(&TickInput::default());
        assert_eq!(world.result().kills_bump, 1);
        assert_eq!(world.result().kills_total, 1);
    }
}
