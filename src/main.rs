//! musimation - Plans falling-note choreography from a MIDI file.
//!
//! Reads a piano MIDI file, assigns its notes to a pool of agents and writes
//! the resulting trajectories for an animation engine to render.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- piano.mid                  # writes piano.choreo.json
//! cargo run -- piano.mid --agents 10      # ten agents, one per finger
//! cargo run -- piano.mid -c scene.json -b # custom scene, binary output
//! ```
//!
//! Set `RUST_LOG=debug` for per-track and per-agent details.

use anyhow::{bail, Context, Result};
use musimation::{extract, plan, Choreography, SceneConfig};
use std::path::{Path, PathBuf};

/// Command-line options for the application.
struct CliOptions {
    /// MIDI file to read.
    input: PathBuf,
    /// Agent count override.
    agents: Option<usize>,
    /// Scene configuration file.
    config: Option<PathBuf>,
    /// Output file; derived from the input name when absent.
    output: Option<PathBuf>,
    /// Write bincode instead of JSON.
    binary: bool,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - `<FILE>`: MIDI file to plan (required)
    /// - `--agents <n>` or `-a <n>`: Number of agents (default: peak polyphony)
    /// - `--config <path>` or `-c <path>`: Scene configuration (JSON)
    /// - `--output <path>` or `-o <path>`: Output file
    /// - `--binary` or `-b`: Write binary output
    /// - `--help` or `-h`: Print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut input: Option<PathBuf> = None;
        let mut agents: Option<usize> = None;
        let mut config: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut binary = false;
        let mut i = 1;

        while i < args.len() {
            match args[i].as_str() {
                "--agents" | "-a" => {
                    let value = Self::value(&args, &mut i, "--agents")?;
                    agents = Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid agent count: {}", value))?,
                    );
                }
                "--config" | "-c" => {
                    config = Some(PathBuf::from(Self::value(&args, &mut i, "--config")?));
                }
                "--output" | "-o" => {
                    output = Some(PathBuf::from(Self::value(&args, &mut i, "--output")?));
                }
                "--binary" | "-b" => binary = true,
                "--help" | "-h" => {
                    print_help(args.first().map_or("musimation", String::as_str));
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
                other => {
                    if input.is_some() {
                        bail!("Only one MIDI file can be planned at a time");
                    }
                    input = Some(PathBuf::from(other));
                }
            }
            i += 1;
        }

        let Some(input) = input else {
            bail!("Missing MIDI file argument (use --help for usage information)");
        };

        Ok(Self {
            input,
            agents,
            config,
            output,
            binary,
        })
    }

    /// Returns the argument following an option, advancing the cursor.
    fn value<'a>(args: &'a [String], i: &mut usize, option: &str) -> Result<&'a str> {
        *i += 1;
        match args.get(*i) {
            Some(v) => Ok(v),
            None => bail!("{} requires an argument", option),
        }
    }

    /// Output path, defaulting to `<input stem>.choreo.{json,bin}` next to the input.
    fn output_path(&self) -> PathBuf {
        if let Some(ref path) = self.output {
            return path.clone();
        }
        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("choreography");
        let ext = if self.binary { "choreo.bin" } else { "choreo.json" };
        self.input.with_file_name(format!("{}.{}", stem, ext))
    }
}

fn print_help(program: &str) {
    eprintln!("musimation - Falling-note choreography planner");
    eprintln!();
    eprintln!("Usage: {} <FILE.mid> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -a, --agents N       Number of agents (default: peak number of held notes)");
    eprintln!("  -c, --config PATH    Scene configuration file (JSON)");
    eprintln!("  -o, --output PATH    Output file (default: <FILE>.choreo.json)");
    eprintln!("  -b, --binary         Write binary output instead of JSON");
    eprintln!("  -h, --help           Print this help message");
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.agents.is_some() {
        config.agents = cli.agents;
    }

    let notes = extract(&cli.input)
        .with_context(|| format!("Failed to read MIDI file {}", cli.input.display()))?;
    let agent_count = config.agent_count(&notes);
    let plan = plan(notes.notes(), agent_count, &config);
    let choreography = Choreography::from_plan(&plan, &config);

    let output = cli.output_path();
    let written = if cli.binary {
        choreography.save_to_binary(&output)
    } else {
        choreography.save_to_file(&output)
    };
    written.with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} notes, {} agents, {:.2}s run time -> {}",
        plan.notes.len(),
        plan.agents.len(),
        plan.run_time,
        output.display()
    );

    Ok(())
}
