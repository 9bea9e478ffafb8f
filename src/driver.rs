//! Headless tick drivers and scripted agents
//!
//! The core never samples input on its own. A driver asks an [`Agent`] for the
//! buttons of each tick call and feeds them to [`World::tick`] until the run
//! ends. Timer-driven hosts (the browser) call `tick` directly instead.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{RunResult, TickInput, World};
use crate::tape::ActionTape;

/// Ceiling for runs whose world has no time limit
pub const UNBOUNDED_RUN_CALLS: usize = 1_000_000;

/// Chooses the buttons for the next tick call
pub trait Agent {
    fn act(&mut self, world: &World) -> TickInput;
}

impl<F: FnMut(&World) -> TickInput> Agent for F {
    fn act(&mut self, world: &World) -> TickInput {
        self(world)
    }
}

/// Presses nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl Agent for Idle {
    fn act(&mut self, _world: &World) -> TickInput {
        TickInput::default()
    }
}

/// Walks right forever
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldRight;

impl Agent for HoldRight {
    fn act(&mut self, _world: &World) -> TickInput {
        TickInput::from_bits(TickInput::RIGHT)
    }
}

/// Runs right and jumps as soon as a jump is possible, holding the button for
/// full height
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardJumper;

impl Agent for ForwardJumper {
    fn act(&mut self, world: &World) -> TickInput {
        let player = world.player();
        let rising = !player.body.on_ground && player.jump_time > 0;
        TickInput {
            right: true,
            speed: true,
            jump: player.may_jump || rising,
            ..TickInput::default()
        }
    }
}

/// Mashes buttons, holding each combination for a few ticks
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: Pcg32,
    current: TickInput,
    hold: u32,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: TickInput::default(),
            hold: 0,
        }
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _world: &World) -> TickInput {
        if self.hold == 0 {
            let bits: u8 = self.rng.random();
            self.current = TickInput::from_bits(bits & TickInput::MASK);
            self.hold = self.rng.random_range(1..=8);
        }
        self.hold -= 1;
        self.current
    }
}

/// Plays back a recorded tape, then idles
#[derive(Debug, Clone)]
pub struct TapeAgent {
    tape: ActionTape,
    cursor: usize,
}

impl TapeAgent {
    pub fn new(tape: ActionTape) -> Self {
        Self { tape, cursor: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.tape.len()
    }
}

impl Agent for TapeAgent {
    fn act(&mut self, _world: &World) -> TickInput {
        let input = self.tape.get(self.cursor).unwrap_or_default();
        self.cursor += 1;
        input
    }
}

/// Step until the world reaches a terminal status
pub fn run<A: Agent + ?Sized>(world: &mut World, agent: &mut A) -> RunResult {
    run_for(world, agent, UNBOUNDED_RUN_CALLS)
}

/// Step until terminal or until `max_calls` tick calls have been made
pub fn run_for<A: Agent + ?Sized>(world: &mut World, agent: &mut A, max_calls: usize) -> RunResult {
    let mut calls = 0;
    while world.is_running() && calls < max_calls {
        let input = agent.act(world);
        world.tick(&input);
        calls += 1;
    }
    log::debug!(
        "run finished after {} calls: {:?} at tick {}",
        calls,
        world.status(),
        world.tick_count()
    );
    world.result()
}

/// Like [`run`], also returning the tape that reproduces the run
pub fn record<A: Agent + ?Sized>(world: &mut World, agent: &mut A) -> (RunResult, ActionTape) {
    let mut tape = ActionTape::new();
    let mut recorder = |w: &World| {
        let input = agent.act(w);
        tape.push(input);
        input
    };
    let result = run(world, &mut recorder);
    (result, tape)
}
