use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use resilient_bench::simulate_agent;
use resilient_core::{
    AffectiveTracker, Agent, ChatConfig, LoggingConfig, ResilientConfig, SimulationConfig,
    TrackerStatus,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file (missing file falls back to defaults)
    #[arg(short, long, default_value = "resilient.toml", env = "RESILIENT_CONFIG")]
    config: PathBuf,

    /// Emit JSON log lines on stderr
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session: every line is processed by the tracker (default)
    Chat,

    /// Process texts and print the final status as JSON.
    /// Reads stdin line by line when neither TEXT nor --file is given.
    Feed {
        /// Texts to process, in order
        texts: Vec<String>,

        /// Process each line of this file after the positional texts
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run the long-term agent simulation, printing one JSON line per sample
    Simulate {
        #[arg(long)]
        steps: Option<u64>,

        #[arg(long)]
        sample_every: Option<u64>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // The load error is held until the subscriber is installed, otherwise it is lost.
    let (mut config, load_err) = ResilientConfig::load_or_default_reporting(&args.config);
    if args.json_logs {
        config.logging.json = true;
    }
    init_tracing(&config.logging);
    info!("Starting resilient (config: {})", args.config.display());

    if let Some(e) = load_err {
        if args.config.exists() {
            warn!("Invalid config file ({:#}), using defaults", e);
        } else {
            info!("Config file not found ({:#}), using defaults", e);
        }
    }

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&config.chat).await,
        Command::Feed { texts, file } => run_feed(texts, file).await,
        Command::Simulate {
            steps,
            sample_every,
            seed,
        } => {
            let mut sim = config.simulation;
            sim.steps = steps.unwrap_or(sim.steps);
            sim.sample_every = sample_every.unwrap_or(sim.sample_every);
            sim.seed = seed.or(sim.seed);
            run_simulate(sim).await
        }
    }
}

/// `RUST_LOG` takes precedence; otherwise the configured level applies.
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_prompt(prompt: &str) -> Result<()> {
    print!("{}", prompt);
    io::stdout().flush()?;
    Ok(())
}

fn print_status(status: &TrackerStatus) {
    println!("stress={:.3} memories={}", status.stress, status.memory_count);
}

async fn run_chat(chat: &ChatConfig) -> Result<()> {
    let mut tracker = AffectiveTracker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Resilient online. Type ':status', ':memories' or 'quit'.");
    print_prompt(&chat.prompt)?;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "quit" | "exit" => break,
            "" => {}
            ":status" => print_status(&tracker.status()),
            ":memories" => {
                for (i, memory) in tracker.memories().iter().enumerate() {
                    println!("{:>3}: {}", i, memory);
                }
            }
            _ => {
                tracker.process_text(&line);
                if chat.show_status {
                    print_status(&tracker.status());
                }
            }
        }
        print_prompt(&chat.prompt)?;
    }

    let status = tracker.status();
    info!(
        "Session ended: stress={:.3}, memories={}",
        status.stress, status.memory_count
    );
    Ok(())
}

async fn run_feed(texts: Vec<String>, file: Option<PathBuf>) -> Result<()> {
    let mut tracker = AffectiveTracker::new();

    for text in &texts {
        tracker.process_text(text);
    }

    if let Some(path) = &file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        for line in content.lines() {
            tracker.process_text(line);
        }
    }

    if texts.is_empty() && file.is_none() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
            tracker.process_text(&line);
        }
    }

    println!("{}", serde_json::to_string(&tracker.status())?);
    Ok(())
}

async fn run_simulate(sim: SimulationConfig) -> Result<()> {
    info!(
        "Simulating {} steps (sample every {}, seed {:?})",
        sim.steps, sim.sample_every, sim.seed
    );

    let (history, agent) = tokio::task::spawn_blocking(move || {
        let mut rng = match sim.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut agent = Agent::new();
        let history = simulate_agent(&mut agent, sim.steps, sim.sample_every, &mut rng);
        (history, agent)
    })
    .await
    .context("Simulation task failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for sample in &history {
        serde_json::to_writer(&mut out, sample)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        "Simulation finished: energy={:.3}, total_stress={:.3}, continuing={}",
        agent.state.energy,
        agent.state.total_stress(),
        agent.should_continue()
    );
    Ok(())
}
