//! Headless runner: plays a level file with a scripted agent or a recorded tape
//! and prints the terminal result as JSON.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand, ValueEnum};
    use platform_duel::driver::{self, Agent, ForwardJumper, HoldRight, Idle, RandomAgent};
    use platform_duel::tape::{self, ActionTape};
    use platform_duel::{Level, RunResult, SimConfig, World};

    #[derive(Parser, Debug)]
    #[command(name = "platform-duel")]
    #[command(about = "Deterministic platformer engine: play, record and replay levels headlessly")]
    struct Cli {
        /// Simulation config (JSON). Defaults are used when omitted.
        #[arg(long, global = true)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Play a level with a scripted agent
        Play {
            level: PathBuf,
            #[arg(long, value_enum, default_value_t = AgentKind::Jumper)]
            agent: AgentKind,
            /// Seed for the random agent
            #[arg(long, default_value_t = 0)]
            seed: u64,
            /// Write the inputs of the run to this file
            #[arg(long)]
            record: Option<PathBuf>,
            /// Use the text tape form instead of binary
            #[arg(long)]
            text: bool,
        },
        /// Replay a recorded tape against a level
        Replay {
            level: PathBuf,
            tape: PathBuf,
            #[arg(long)]
            text: bool,
        },
        /// Parse a level and print its summary
        Check { level: PathBuf },
    }

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum AgentKind {
        Idle,
        HoldRight,
        Jumper,
        Random,
    }

    impl AgentKind {
        fn build(self, seed: u64) -> Box<dyn Agent> {
            match self {
                Self::Idle => Box::new(Idle),
                Self::HoldRight => Box::new(HoldRight),
                Self::Jumper => Box::new(ForwardJumper),
                Self::Random => Box::new(RandomAgent::new(seed)),
            }
        }
    }

    fn load_level(path: &Path, config: &SimConfig) -> Result<Arc<Level>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read level {}", path.display()))?;
        let level = Level::parse_with(&text, config)
            .with_context(|| format!("invalid level {}", path.display()))?;
        Ok(Arc::new(level))
    }

    fn print_result(result: &RunResult) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(result)?);
        Ok(())
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let cli = Cli::parse();
        let config = match &cli.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };

        match cli.command {
            Commands::Play {
                level,
                agent,
                seed,
                record,
                text,
            } => {
                let level = load_level(&level, &config)?;
                let mut world = World::new(level, config);
                let mut agent = agent.build(seed);

                let result = match record {
                    Some(path) => {
                        let (result, tape) = driver::record(&mut world, agent.as_mut());
                        let bytes = if text {
                            tape.to_text().into_bytes()
                        } else {
                            tape.to_bytes()
                        };
                        fs::write(&path, bytes)
                            .with_context(|| format!("failed to write tape {}", path.display()))?;
                        log::info!("Recorded {} inputs to {}", tape.len(), path.display());
                        result
                    }
                    None => driver::run(&mut world, agent.as_mut()),
                };
                print_result(&result)
            }
            Commands::Replay {
                level,
                tape: path,
                text,
            } => {
                let level = load_level(&level, &config)?;
                let tape = if text {
                    let raw = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read tape {}", path.display()))?;
                    ActionTape::from_text(&raw)?
                } else {
                    let raw = fs::read(&path)
                        .with_context(|| format!("failed to read tape {}", path.display()))?;
                    ActionTape::from_bytes(&raw)?
                };
                print_result(&tape::replay(level, config, &tape))
            }
            Commands::Check { level } => {
                let level = load_level(&level, &config)?;
                let summary = serde_json::json!({
                    "width": level.width(),
                    "height": level.height(),
                    "spawn": level.spawn_tile(),
                    "exit": level.exit_tile(),
                    "coins": level.total_coins(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
                Ok(())
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `web::start`
}
