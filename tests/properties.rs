//! Invariants over random input sequences

use std::sync::Arc;

use platform_duel::sim::EventKind;
use platform_duel::tape::{ActionTape, replay};
use platform_duel::{Level, SimConfig, Status, TickInput, World};
use proptest::prelude::*;

/// Enemies, blocks, a pit, a pipe and a launcher on one screen and a half
fn busy_level() -> Arc<Level> {
    let sky = "-".repeat(40);
    let mut rows = vec![sky; 10];
    rows.push(format!("{:-<40}", "-----?S?--------------S!S"));
    rows.push(format!("{:-<40}", ""));
    rows.push(format!("{:-<40}", "-------------------tt---------*"));
    rows.push(format!("{:-<40}", "-------------------TT---------*"));
    rows.push(format!("{:-<40}", "M--------g----k----TT--G--y---*-----oo-F"));
    rows.push(format!("{}--{}", "X".repeat(15), "X".repeat(23)));
    Arc::new(Level::parse(&rows.join("\n")).expect("busy level parses"))
}

fn inputs() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..32, 1..400)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn player_never_left_of_zero(bits in inputs()) {
        let mut world = World::new(busy_level(), SimConfig::default());
        for &b in &bits {
            world.tick(&TickInput::from_bits(b));
            prop_assert!(
                world.player().pos().x >= 0.0,
                "x = {} at tick {}",
                world.player().pos().x,
                world.tick_count()
            );
        }
    }

    #[test]
    fn identical_inputs_give_identical_runs(bits in inputs()) {
        let level = busy_level();
        let mut a = World::new(level.clone(), SimConfig::default());
        let mut b = World::new(level, SimConfig::default());
        for &byte in &bits {
            let input = TickInput::from_bits(byte);
            a.tick(&input);
            b.tick(&input);
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
        prop_assert_eq!(a.events(), b.events());
        prop_assert_eq!(a.result(), b.result());
    }

    #[test]
    fn replayed_tape_matches_live_run(bits in inputs()) {
        let level = busy_level();
        let tape: ActionTape = bits.iter().map(|&b| TickInput::from_bits(b)).collect();
        let decoded = ActionTape::from_bytes(&tape.to_bytes()).unwrap();

        let mut world = World::new(level.clone(), SimConfig::default());
        for input in tape.iter() {
            if !world.is_running() {
                break;
            }
            world.tick(&input);
        }
        prop_assert_eq!(replay(level, SimConfig::default(), &decoded), world.result());
    }

    #[test]
    fn terminal_status_is_final(bits in inputs()) {
        let config = SimConfig::default().with_time_limit(3000);
        let mut world = World::new(busy_level(), config);
        let mut terminal = None;
        for &b in &bits {
            world.tick(&TickInput::from_bits(b));
            match terminal {
                None if world.status().is_terminal() => terminal = Some(world.status()),
                Some(status) => prop_assert_eq!(world.status(), status),
                None => prop_assert_eq!(world.status(), Status::Running),
            }
        }

        let log = world.events();
        let ends = log.count(EventKind::Win) + log.count(EventKind::Lose) + log.count(EventKind::TimeOut);
        prop_assert_eq!(ends, usize::from(terminal.is_some()));
    }
}
