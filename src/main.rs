//! ClawForge — headless claw-machine runner
//!
//! Usage:
//!   clawforge run [--config FILE] [--pool FILE] [--seed N] [--spins N] [--wav FILE]
//!   clawforge rates [--config FILE] [--pool FILE]
//!   clawforge config               - Print the default configuration as JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use cf_audio::{AudioHandle, OfflineProbe};
use cf_core::{PrizeItem, RngSource};
use cf_machine::{ClawMachine, ForcedOutcome, MachineConfig};
use cf_stage::{EventTrace, SpinState};

/// Frames simulated after the last spin so the reveal and the chime finish
const TAIL_MS: f64 = 1500.0;

#[derive(Parser)]
#[command(name = "clawforge", about = "ClawForge claw-machine runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate spins frame by frame and print the event trace
    Run {
        /// Machine config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Prize pool (JSON array of prizes)
        #[arg(short, long)]
        pool: Option<PathBuf>,
        /// Seed for the draw and the tick pitch
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of spins
        #[arg(long, default_value_t = 1)]
        spins: u32,
        /// Host frame interval
        #[arg(long, default_value_t = 1000.0 / 60.0)]
        frame_ms: f64,
        /// Force every spin into one tier (0 = lowest)
        #[arg(long, conflicts_with = "force_item")]
        force_tier: Option<usize>,
        /// Force every spin onto one prize id
        #[arg(long)]
        force_item: Option<String>,
        /// Write the rendered audio to a WAV file
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Print the full trace as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print the drop-rate table for a pool
    Rates {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        pool: Option<PathBuf>,
    },
    /// Print the default machine config
    Config,
    /// Play spins through the default audio device in real time
    #[cfg(feature = "device")]
    Live {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        pool: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        spins: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            pool,
            seed,
            spins,
            frame_ms,
            force_tier,
            force_item,
            wav,
            json,
        } => {
            let forced = match (force_tier, force_item) {
                (Some(tier), _) => Some(ForcedOutcome::Tier(tier)),
                (None, Some(id)) => Some(ForcedOutcome::Item(id)),
                (None, None) => None,
            };
            let options = RunOptions {
                seed,
                spins,
                frame_ms,
                forced,
                wav,
                json,
            };
            run(load_config(config.as_deref())?, load_pool(pool.as_deref())?, options)
        }
        Commands::Rates { config, pool } => {
            print_rates(load_config(config.as_deref())?, load_pool(pool.as_deref())?)
        }
        Commands::Config => {
            println!("{}", MachineConfig::default().to_json()?);
            Ok(())
        }
        #[cfg(feature = "device")]
        Commands::Live {
            config,
            pool,
            spins,
        } => live::run(
            load_config(config.as_deref())?,
            load_pool(pool.as_deref())?,
            spins,
        ),
    }
}

fn load_config(path: Option<&Path>) -> Result<MachineConfig> {
    match path {
        Some(path) => MachineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(MachineConfig::default()),
    }
}

fn load_pool(path: Option<&Path>) -> Result<Vec<PrizeItem>> {
    let Some(path) = path else {
        return Ok(demo_pool());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool {}", path.display()))?;
    let items: Vec<PrizeItem> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse pool {}", path.display()))?;
    log::info!("Loaded {} prizes from {}", items.len(), path.display());
    Ok(items)
}

fn demo_pool() -> Vec<PrizeItem> {
    [
        ("pk-001", "Magikarp", 0.35),
        ("pk-002", "Rattata", 0.80),
        ("pk-003", "Eevee", 4.50),
        ("pk-004", "Pikachu", 8.00),
        ("pk-005", "Gengar", 22.00),
        ("pk-006", "Dragonite", 41.00),
        ("pk-007", "Charizard ex", 120.00),
    ]
    .into_iter()
    .map(|(id, name, value)| {
        PrizeItem::new(id, format!("thumbs/{id}.png"), value)
            .with_name(name)
            .with_full_image(format!("cards/{id}.png"))
    })
    .collect()
}

struct RunOptions {
    seed: Option<u64>,
    spins: u32,
    frame_ms: f64,
    forced: Option<ForcedOutcome>,
    wav: Option<PathBuf>,
    json: bool,
}

fn run(config: MachineConfig, pool: Vec<PrizeItem>, options: RunOptions) -> Result<()> {
    if !(options.frame_ms > 0.0) {
        bail!("--frame-ms must be > 0");
    }

    let (spin_rng, tick_rng) = match options.seed {
        Some(seed) => (RngSource::seeded(seed), RngSource::seeded(seed.wrapping_add(1))),
        None => (RngSource::from_entropy(), RngSource::from_entropy()),
    };
    let (audio, probe_slot) = AudioHandle::offline(config.audio.sample_rate);
    let mut machine = ClawMachine::with_sources(
        pool,
        config,
        audio,
        Box::new(spin_rng),
        Box::new(tick_rng),
    )?;
    let rx = machine.subscribe();
    machine.announce();

    let frame_secs = options.frame_ms / 1000.0;
    let mut now_ms = 0.0;
    let frame = |machine: &mut ClawMachine, now_ms: f64| {
        machine.on_frame(now_ms);
        if let Some(probe) = probe_slot.lock().as_ref() {
            probe.advance(frame_secs);
        }
        machine.service_music();
    };

    for _ in 0..options.spins {
        let started = match &options.forced {
            Some(outcome) => machine.request_spin_forced(outcome.clone()),
            None => machine.request_spin(),
        };
        if !started {
            log::warn!("Spin refused");
            break;
        }
        while machine.state() == SpinState::Spinning {
            frame(&mut machine, now_ms);
            now_ms += options.frame_ms;
        }
        let settled_at = now_ms;
        while now_ms - settled_at < TAIL_MS {
            frame(&mut machine, now_ms);
            now_ms += options.frame_ms;
        }
        machine.dismiss();
    }

    let mut trace = EventTrace::new();
    trace.drain_from(&rx);

    if options.json {
        println!("{}", trace.to_json()?);
    } else {
        print_summary(&trace);
    }

    let probe: Option<OfflineProbe> = probe_slot.lock().clone();
    if let Some(path) = &options.wav {
        let Some(probe) = probe else {
            bail!("No audio was rendered");
        };
        let samples = probe.take_samples();
        cf_audio::write_wav(path, &samples, probe.sample_rate())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "Wrote {:.1}s of audio to {}",
            samples.len() as f64 / probe.sample_rate() as f64,
            path.display()
        );
    }

    machine.dispose();
    Ok(())
}

fn print_summary(trace: &EventTrace) {
    use cf_stage::MachineEvent;

    for timed in &trace.events {
        match &timed.event {
            MachineEvent::DropRate {
                label,
                tag,
                probability,
            } => println!("  {:<12} {:<11} {:>5.1}%", label, tag, probability * 100.0),
            MachineEvent::SpinStarted { spin, strip_len } => println!(
                "[{:>8.1}ms] spin #{} ({} slots)",
                timed.timestamp_ms, spin, strip_len
            ),
            MachineEvent::Settled { winner, index } => println!(
                "[{:>8.1}ms] settled on slot {}: {} (${:.2})",
                timed.timestamp_ms,
                index,
                winner.label(),
                winner.value
            ),
            MachineEvent::PoolUnavailable => println!("No prizes available"),
            _ => {}
        }
    }
    println!(
        "{} events, {} center crossings",
        trace.len(),
        trace.center_indices().len()
    );
}

fn print_rates(config: MachineConfig, pool: Vec<PrizeItem>) -> Result<()> {
    let machine = ClawMachine::new(pool, config, AudioHandle::disabled())?;
    for tier in machine.session().tiers() {
        println!(
            "{:<12} {:<11} {:>5.1}%  ({} prizes)",
            tier.label,
            tier.tag,
            tier.probability * 100.0,
            tier.len()
        );
    }
    Ok(())
}

#[cfg(feature = "device")]
mod live {
    use std::time::{Duration, Instant};

    use anyhow::Result;

    use cf_audio::{AudioHandle, AudioOutput, CpalOutput};
    use cf_core::PrizeItem;
    use cf_machine::{ClawMachine, MachineConfig};
    use cf_stage::SpinState;

    const FRAME: Duration = Duration::from_millis(16);

    pub fn run(config: MachineConfig, pool: Vec<PrizeItem>, spins: u32) -> Result<()> {
        let audio = AudioHandle::from_factory(Box::new(|| {
            Ok(Box::new(CpalOutput::open()?) as Box<dyn AudioOutput>)
        }));
        let mut machine = ClawMachine::new(pool, config, audio)?;
        let _service = machine.spawn_music_service()?;
        let epoch = Instant::now();

        for _ in 0..spins {
            if !machine.request_spin() {
                break;
            }
            while machine.state() == SpinState::Spinning {
                machine.on_frame(epoch.elapsed().as_secs_f64() * 1000.0);
                std::thread::sleep(FRAME);
            }
            if let Some(winner) = machine.last_winner() {
                println!("Pulled {} (${:.2})", winner.label(), winner.value);
            }
            std::thread::sleep(Duration::from_millis(1500));
            machine.dismiss();
        }

        machine.dispose();
        Ok(())
    }
}
