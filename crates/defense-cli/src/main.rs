use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use defense_core::config::SimConfig;
use defense_core::World;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Frame time of the original 60 Hz display loop.
const DEFAULT_DT: f64 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "defense-sim")]
#[command(about = "Inducible plant-defense lattice simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of simulation ticks to run
        #[arg(long, default_value_t = 10_000)]
        steps: usize,

        /// Sample metrics every this many ticks
        #[arg(long, default_value_t = 100)]
        sample_every: usize,

        /// Fixed elapsed model time per tick, in seconds
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f64,
    },
    /// Sweep the responsiveness parameter and export one CSV row per run
    Sweep {
        /// Optional base config file (JSON); defaults otherwise
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output CSV path
        #[arg(long)]
        out: PathBuf,

        /// Lowest responsiveness value in the sweep
        #[arg(long, default_value_t = 1.25)]
        temp_min: f64,

        /// Highest responsiveness value in the sweep
        #[arg(long, default_value_t = 3.25)]
        temp_max: f64,

        /// Number of responsiveness values to sample
        #[arg(long, default_value_t = 9)]
        temp_steps: usize,

        /// Maximum ticks per run
        #[arg(long, default_value_t = 50_000)]
        steps: usize,

        /// Fixed elapsed model time per tick, in seconds
        #[arg(long, default_value_t = DEFAULT_DT)]
        dt: f64,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: &PathBuf) -> Result<SimConfig> {
    let file = File::open(path).with_context(|| format!("failed to open config file {path:?}"))?;
    let reader = BufReader::new(file);
    let config: SimConfig = serde_json::from_reader(reader).context("failed to parse config")?;
    config.validate().context("config validation error")?;
    Ok(config)
}

fn run(
    config_path: PathBuf,
    out: Option<PathBuf>,
    steps: usize,
    sample_every: usize,
    dt: f64,
) -> Result<()> {
    let config = load_config(&config_path)?;
    println!("Loaded config from {config_path:?}");
    println!("Simulating for {steps} ticks at dt={dt}...");

    let mut world = World::new(config).context("failed to initialize world")?;
    let summary = world
        .run_experiment(steps, sample_every, dt)
        .context("experiment failed")?;

    if let Some(out_dir) = out {
        std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
        let summary_path = out_dir.join("summary.json");
        let file = File::create(&summary_path).context("failed to create summary file")?;
        serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
        println!("Run complete. Results saved to {summary_path:?}");
    } else {
        println!(
            "Run complete. Alive herbivores: {}, activations: {}, undefended bites: {}, deterred bites: {}",
            summary.final_alive_herbivores,
            summary.counters.activation_events,
            summary.counters.undefended_bites,
            summary.counters.deterred_bites,
        );
    }
    Ok(())
}

/// One sweep run: advance until at most half the herbivores survive (or the
/// tick budget runs out) and report the half-life in model seconds together
/// with the defense/attack counters the analysis scripts plot.
fn run_one_temperature(base: &SimConfig, temperature: f64, steps: usize, dt: f64) -> Result<SweepRow> {
    let config = SimConfig {
        temperature,
        ..base.clone()
    };
    let mut world = World::new(config).context("failed to initialize world")?;
    let initial_alive = world.alive_count();
    let half = initial_alive / 2;

    let mut half_life_ticks = steps;
    for tick in 1..=steps {
        world.step(dt);
        if world.alive_count() <= half {
            half_life_ticks = tick;
            break;
        }
    }

    Ok(SweepRow {
        temperature,
        half_life_secs: half_life_ticks as f64 * dt,
        activation_events: world.counters().activation_events,
        undefended_bites: world.counters().undefended_bites,
    })
}

struct SweepRow {
    temperature: f64,
    half_life_secs: f64,
    activation_events: u64,
    undefended_bites: u64,
}

fn sweep(
    config_path: Option<PathBuf>,
    out: PathBuf,
    temp_min: f64,
    temp_max: f64,
    temp_steps: usize,
    steps: usize,
    dt: f64,
) -> Result<()> {
    anyhow::ensure!(temp_steps > 0, "temp_steps must be greater than 0");
    anyhow::ensure!(
        temp_min > 0.0 && temp_max >= temp_min,
        "sweep range must satisfy 0 < temp_min <= temp_max"
    );

    let base = match config_path {
        Some(path) => load_config(&path)?,
        None => SimConfig::default(),
    };

    let file = File::create(&out).with_context(|| format!("failed to create {out:?}"))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "temp,time,activity,undefended_attacks")?;

    for i in 0..temp_steps {
        let fraction = if temp_steps == 1 {
            0.0
        } else {
            i as f64 / (temp_steps - 1) as f64
        };
        let temperature = temp_min + (temp_max - temp_min) * fraction;
        let row = run_one_temperature(&base, temperature, steps, dt)?;
        writeln!(
            writer,
            "{},{},{},{}",
            row.temperature, row.half_life_secs, row.activation_events, row.undefended_bites
        )?;
        println!(
            "T={:.3}: half-life {:.2}s, {} activations, {} undefended bites",
            row.temperature, row.half_life_secs, row.activation_events, row.undefended_bites
        );
    }
    writer.flush().context("failed to flush sweep output")?;
    println!("Sweep complete. Results saved to {out:?}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run {
            config,
            out,
            steps,
            sample_every,
            dt,
        } => run(config, out, steps, sample_every, dt)?,
        Commands::Sweep {
            config,
            out,
            temp_min,
            temp_max,
            temp_steps,
            steps,
            dt,
        } => sweep(config, out, temp_min, temp_max, temp_steps, steps, dt)?,
    }
    Ok(())
}
