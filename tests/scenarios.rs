//! End-to-end runs on small hand-written levels

use std::collections::HashSet;

use glam::Vec2;
use platform_duel::driver::{self, HoldRight, Idle};
use platform_duel::sim::{
    Bullet, Enemy, EventKind, Fireball, Pickup, PowerState, Shell, SpriteKind, SpriteType,
};
use platform_duel::{SimConfig, Status, TickInput, World};

/// Pad `rows` with empty sky up to 16 rows
fn level(rows: &[&str]) -> String {
    let width = rows[0].len();
    let mut lines = vec!["-".repeat(width); 16 - rows.len()];
    lines.extend(rows.iter().map(|r| r.to_string()));
    lines.join("\n")
}

fn world(rows: &[&str]) -> World {
    World::from_text(&level(rows), SimConfig::default()).unwrap()
}

fn flat(body: &str) -> World {
    world(&[body, &"X".repeat(body.len())])
}

/// Put the player in the air at `pos`, falling at `fall` px per tick
fn drop_player(world: &mut World, pos: Vec2, fall: f32) {
    let player = world.player_mut();
    player.body.pos = pos;
    player.body.vel = Vec2::new(0.0, fall);
    player.body.on_ground = false;
}

fn live(world: &World, kind: SpriteType) -> usize {
    world
        .sprites()
        .iter()
        .filter(|s| s.is_alive() && s.sprite_type() == kind)
        .count()
}

#[test]
fn test_hold_right_reaches_exit() {
    let mut world = flat("M------------------F");
    let result = driver::run(&mut world, &mut HoldRight);
    assert_eq!(result.status, Status::Win);
    assert_eq!(result.coins, 0);
    assert!(result.ticks < 100, "took {} ticks", result.ticks);
    assert_eq!(result.completion, 1.0);
}

#[test]
fn test_walking_into_goomba_loses() {
    let mut world = flat("M---------g--------F");
    let result = driver::run(&mut world, &mut HoldRight);
    assert_eq!(result.status, Status::Lose);
    assert_eq!(result.kills_total, 0);
    assert_eq!(result.hurts, 1);
}

#[test]
fn test_jumping_onto_goomba_stomps_it() {
    let mut world = flat("M---------g--------F");
    let mut jumped = false;
    let mut held = 0;
    let mut agent = |w: &World| {
        let goomba = w
            .sprites()
            .iter()
            .find(|s| s.sprite_type() == SpriteType::Goomba);
        let Some(goomba) = goomba else {
            return TickInput::from_bits(TickInput::RIGHT);
        };

        let dx = goomba.body().pos.x - w.player().pos().x;
        if !jumped && dx < 20.0 && w.player().may_jump {
            jumped = true;
        }
        if jumped && held < 7 {
            held += 1;
            return TickInput::from_bits(TickInput::JUMP);
        }
        TickInput::default()
    };

    let result = driver::run(&mut world, &mut agent);
    assert_eq!(result.kills_stomp, 1);
    assert_eq!(result.kills_total, 1);
    assert_eq!(result.status, Status::Win);
}

#[test]
fn test_winged_koopa_needs_two_stomps() {
    let mut world = flat("M------------------F");
    let id = world.insert_sprite(Enemy::spawn(SpriteType::GreenKoopaWinged, 5, 14, -1));

    // Drop the player onto the koopa's back
    let drop_onto = |world: &mut World| {
        let target = world.sprite(id).map(|s| s.body().pos).unwrap();
        let player = world.player_mut();
        player.body.pos = Vec2::new(target.x, target.y - 13.0);
        player.body.vel = Vec2::new(0.0, 4.0);
        player.body.on_ground = false;
    };

    drop_onto(&mut world);
    world.tick(&TickInput::default());
    let koopa = world.sprite(id).expect("koopa survives the first stomp");
    assert!(matches!(&koopa.kind, SpriteKind::Enemy(e) if !e.winged));
    assert_eq!(world.events().count(EventKind::StompKill), 0);
    assert_eq!(live(&world, SpriteType::Shell), 0);

    drop_onto(&mut world);
    world.tick(&TickInput::default());
    assert!(world.sprite(id).is_none());
    assert_eq!(live(&world, SpriteType::Shell), 1);
    assert_eq!(world.events().count(EventKind::StompKill), 1);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_hit_after_mushroom_shrinks_instead_of_losing() {
    let mut world = flat("M------------------F");
    let spawn = world.player().pos();
    world.insert_sprite(Pickup::spawn(SpriteType::Mushroom, spawn));
    world.insert_sprite(Enemy::spawn(SpriteType::Spiky, 5, 14, -1));

    world.tick(&TickInput::default());
    assert_eq!(world.player().power, PowerState::Large);
    assert_eq!(world.session().pause_timer, 9);

    // The freeze holds the clock
    let tick = world.tick_count();
    for _ in 0..9 {
        world.tick(&TickInput::default());
    }
    assert_eq!(world.tick_count(), tick);
    assert_eq!(world.session().pause_timer, 0);

    let mut hurt = false;
    for _ in 0..200 {
        world.tick(&TickInput::default());
        if world.last_events().iter().any(|e| e.kind == EventKind::Hurt) {
            hurt = true;
            break;
        }
    }
    assert!(hurt, "spiky never reached the player");
    assert_eq!(world.player().power, PowerState::Small);
    assert_eq!(world.status(), Status::Running);
    assert_eq!(world.session().pause_timer, 9);
    assert!(world.player().invulnerable > 0);

    let result = world.result();
    assert_eq!(result.mushrooms, 1);
    assert_eq!(result.hurts, 1);
}

#[test]
fn test_moving_shell_plows_through_enemies() {
    let mut world = flat("M------------------F");
    let first = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 8, 14, 1));
    let second = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 6, 14, 1));
    let mut shell = Shell::spawn(Vec2::new(168.0, 239.0), false, None);
    shell.entity.body.facing = -1;
    let shell = world.insert_sprite(shell);

    for _ in 0..6 {
        world.tick(&TickInput::default());
    }
    assert!(world.sprite(first).is_none());
    assert!(world.sprite(second).is_none());
    assert!(world.sprite(shell).is_some());
    assert_eq!(world.result().kills_shell, 2);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_fireball_spent_on_fire_immune_enemy() {
    let mut world = flat("M------------------F");
    let spiky = world.insert_sprite(Enemy::spawn(SpriteType::Spiky, 6, 14, -1));
    let fireball = world.insert_sprite(Fireball::spawn(Vec2::new(80.0, 235.0), 1));

    world.tick(&TickInput::default());
    assert!(world.sprite(fireball).is_none());
    assert!(world.sprite(spiky).is_some());
    assert_eq!(world.result().kills_fire, 0);
}

#[test]
fn test_fireball_kills_goomba() {
    let mut world = flat("M------------------F");
    let goomba = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 6, 14, -1));
    world.insert_sprite(Fireball::spawn(Vec2::new(80.0, 235.0), 1));

    world.tick(&TickInput::default());
    assert!(world.sprite(goomba).is_none());
    assert_eq!(world.result().kills_fire, 1);
}

#[test]
fn test_fire_player_shoots_on_speed_press() {
    let config = SimConfig {
        initial_power: PowerState::Fire,
        ..SimConfig::default()
    };
    let mut world = World::from_text(&level(&["M------------------F", &"X".repeat(20)]), config).unwrap();
    let speed = TickInput::from_bits(TickInput::SPEED);

    world.tick(&TickInput::default());
    world.tick(&speed);
    assert_eq!(live(&world, SpriteType::Fireball), 1);

    // Holding the button does not fire again
    world.tick(&speed);
    assert_eq!(live(&world, SpriteType::Fireball), 1);
}

#[test]
fn test_coin_tiles_are_collected() {
    let mut world = flat("M-ooo--------------F");
    let result = driver::run(&mut world, &mut HoldRight);
    assert_eq!(result.status, Status::Win);
    assert_eq!(result.coins, 3);
    assert_eq!(result.tile_coins, 3);
}

#[test]
fn test_terminal_states_are_exclusive() {
    let config = SimConfig::default().with_time_limit(600);
    let mut world = World::from_text(&level(&["M--------F", "XXXXXXXXXX"]), config).unwrap();
    let result = driver::run(&mut world, &mut Idle);
    assert_eq!(result.status, Status::TimeOut);

    // Further input cannot turn a timeout into a win
    for _ in 0..100 {
        world.tick(&TickInput::from_bits(TickInput::RIGHT));
    }
    assert_eq!(world.status(), Status::TimeOut);
    let log = world.events();
    let terminal = log.count(EventKind::Win) + log.count(EventKind::Lose) + log.count(EventKind::TimeOut);
    assert_eq!(terminal, 1);
}

#[test]
fn test_falling_enemy_counts_as_fall_kill() {
    let mut world = world(&["M------------------F", "XXXXXXXXX--XXXXXXXXX"]);
    world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 12, 14, -1));
    for _ in 0..60 {
        world.tick(&TickInput::default());
    }
    let result = world.result();
    assert_eq!(result.kills_fall, 1);
    assert_eq!(live(&world, SpriteType::Goomba), 0);
}

#[test]
fn test_stomp_needs_feet_above_midline() {
    // goomba stands at y 239 with its midline at 233
    let mut world = flat("M------------------F");
    let goomba = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 5, 14, -1));
    drop_player(&mut world, Vec2::new(88.0, 236.0), 1.0);
    world.tick(&TickInput::default());
    let result = world.result();
    assert_eq!(result.kills_stomp, 0);
    assert_eq!(result.hurts, 1);
    assert_eq!(result.status, Status::Lose);
    assert!(world.sprite(goomba).is_some());

    let mut world = flat("M------------------F");
    let goomba = world.insert_sprite(Enemy::spawn(SpriteType::Goomba, 5, 14, -1));
    drop_player(&mut world, Vec2::new(88.0, 230.0), 1.0);
    world.tick(&TickInput::default());
    assert!(world.sprite(goomba).is_none());
    assert_eq!(world.events().count(EventKind::StompKill), 1);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_walking_off_a_ledge_lands() {
    let mut world = world(&["M------------------F", "XX------------------", &"X".repeat(20)]);
    let result = driver::run(&mut world, &mut HoldRight);
    assert_eq!(result.status, Status::Win);
    assert_eq!(result.jumps, 0);
    assert!(world.events().count(EventKind::Land) >= 1);
    assert!(result.max_air_time >= 2, "air time {}", result.max_air_time);
}

#[test]
fn test_walking_into_still_shell_kicks_it() {
    let mut world = flat("M------------------F");
    let shell = world.insert_sprite(Shell::spawn(Vec2::new(40.0, 239.0), false, None));
    let right = TickInput::from_bits(TickInput::RIGHT);

    let mut kicked = false;
    for _ in 0..30 {
        world.tick(&right);
        if world.last_events().iter().any(|e| e.kind == EventKind::Kick) {
            kicked = true;
            break;
        }
    }
    assert!(kicked, "player never reached the shell");
    assert_eq!(world.sprite(shell).map(|s| s.body().facing), Some(1));
    assert_eq!(world.player().invulnerable, 1);

    let before = world.sprite(shell).map(|s| s.body().pos.x).unwrap();
    world.tick(&right);
    let after = world.sprite(shell).map(|s| s.body().pos.x).unwrap();
    assert!(after - before > 8.0, "shell moved {}", after - before);
    assert_eq!(world.events().count(EventKind::Kick), 1);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_moving_shell_hurts_from_the_side() {
    let mut world = flat("M------------------F");
    let mut shell = Shell::spawn(Vec2::new(120.0, 239.0), false, None);
    shell.entity.body.facing = -1;
    world.insert_sprite(shell);

    let result = driver::run(&mut world, &mut Idle);
    assert_eq!(result.status, Status::Lose);
    assert_eq!(result.hurts, 1);
}

#[test]
fn test_landing_on_moving_shell_stops_it() {
    let mut world = flat("M------------------F");
    let mut shell = Shell::spawn(Vec2::new(120.0, 239.0), false, None);
    shell.entity.body.facing = -1;
    shell.entity.body.vel.y = 0.0;
    let shell = world.insert_sprite(shell);

    // the shell slides 11 px left into the falling player
    drop_player(&mut world, Vec2::new(109.0, 226.0), 4.0);
    world.tick(&TickInput::default());
    assert_eq!(world.sprite(shell).map(|s| s.body().facing), Some(0));
    assert_eq!(world.result().hurts, 0);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_red_shell_turns_at_ledge() {
    let rows = ["M------------------F", "XXXXXXXXXX----------"];

    let mut red_world = world(&rows);
    let mut red = Shell::spawn(Vec2::new(40.0, 239.0), true, None);
    red.entity.body.facing = 1;
    let red = red_world.insert_sprite(red);
    for _ in 0..12 {
        red_world.tick(&TickInput::default());
    }
    let body = red_world.sprite(red).map(|s| s.body().clone()).expect("red shell stays on its ledge");
    assert_eq!(body.facing, -1);
    assert!(body.pos.x <= 155.0, "x {}", body.pos.x);
    assert!(body.pos.y <= 240.0);

    // green shells run straight off
    let mut green_world = world(&rows);
    let mut green = Shell::spawn(Vec2::new(40.0, 239.0), false, None);
    green.entity.body.facing = 1;
    let green = green_world.insert_sprite(green);
    for _ in 0..30 {
        green_world.tick(&TickInput::default());
    }
    assert!(green_world.sprite(green).is_none());
}

#[test]
fn test_wall_slide_then_wall_jump() {
    let floor = "X".repeat(20);
    let mut rows = vec!["----------X---------"; 14];
    rows.push("M---------X--------F");
    rows.push(&floor);
    let mut world = world(&rows);
    drop_player(&mut world, Vec2::new(155.0, 180.0), 2.0);

    let push = TickInput::from_bits(TickInput::RIGHT | TickInput::SPEED);
    world.tick(&push);
    world.tick(&push);
    let player = world.player();
    assert!(player.sliding);
    assert!(player.may_jump);
    assert!(player.body.vel.y < 5.5, "slide fall speed {}", player.body.vel.y);

    world.tick(&TickInput::from_bits(TickInput::RIGHT | TickInput::SPEED | TickInput::JUMP));
    assert!(
        world
            .last_events()
            .iter()
            .any(|e| e.kind == EventKind::Jump && e.param == 1)
    );
    let player = world.player();
    assert_eq!(player.body.facing, -1);
    assert!(player.pos().x < 155.0);
    assert!(player.body.vel.x < 0.0);
    assert!(player.body.vel.y < 0.0);
}

#[test]
fn test_large_player_ducks_in_place() {
    let config = SimConfig {
        initial_power: PowerState::Large,
        ..SimConfig::default()
    };
    let mut world = World::from_text(&level(&["M------------------F", &"X".repeat(20)]), config).unwrap();
    for _ in 0..10 {
        world.tick(&TickInput::default());
        if world.player().body.on_ground {
            break;
        }
    }
    assert!(world.player().body.on_ground);
    let x = world.player().pos().x;

    let duck = TickInput::from_bits(TickInput::DOWN | TickInput::RIGHT);
    for _ in 0..10 {
        world.tick(&duck);
    }
    assert!(world.player().ducking);
    assert_eq!(world.player().body.height, 12.0);
    assert_eq!(world.player().pos().x, x);

    for _ in 0..10 {
        world.tick(&TickInput::default());
    }
    assert!(!world.player().ducking);
    assert_eq!(world.player().body.height, 24.0);
}

#[test]
fn test_launcher_fires_every_hundred_ticks() {
    // the launcher in column 0 sits right above the player and stays quiet
    let mut world = world(&[
        "*-----------*-------",
        "--------------------",
        "--------------------",
        "--------------------",
        "M------------------F",
        &"X".repeat(20),
    ]);
    let mut seen = HashSet::new();
    let mut fired_at = Vec::new();
    for _ in 0..200 {
        world.tick(&TickInput::default());
        for sprite in world.sprites() {
            if sprite.sprite_type() == SpriteType::BulletBill && seen.insert(sprite.id()) {
                fired_at.push(world.tick_count());
                assert_eq!(sprite.body().facing, -1);
                assert_eq!(sprite.body().pos.x, 192.0);
            }
        }
    }
    assert_eq!(fired_at, vec![25, 125]);
    assert_eq!(world.status(), Status::Running);
}

#[test]
fn test_stomping_a_bullet_destroys_it() {
    let mut world = flat("M------------------F");
    let bullet = world.insert_sprite(Bullet::spawn(Vec2::new(120.0, 239.0), -1));
    // the bullet flies 4 px left under the falling player
    drop_player(&mut world, Vec2::new(116.0, 226.0), 4.0);
    world.tick(&TickInput::default());

    assert!(world.sprite(bullet).is_none());
    let result = world.result();
    assert_eq!(result.kills_stomp, 1);
    assert_eq!(world.events().count(EventKind::StompKill), 1);
    assert_eq!(result.status, Status::Running);
}
