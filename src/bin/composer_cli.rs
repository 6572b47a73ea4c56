use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use resonance_core::analysis::{AudioAnalyzer, AudioFeatures};
use resonance_core::capture::{SignalSource, WavFileSource};
use resonance_core::config::AppConfig;
use resonance_core::context::AppContext;
use resonance_core::engine::{CancelToken, Composition};
use resonance_core::music::{
    midi_to_frequency, midi_to_note_name, GenerationConfig, PitchClass, ScaleType, Style,
};

#[derive(Parser, Debug)]
#[command(
    name = "composer_cli",
    about = "Analyze audio and generate audio-reactive compositions"
)]
struct Cli {
    /// Config file (defaults to assets/composer_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one JSON feature snapshot per analysis tick of a WAV file
    Analyze {
        #[arg(long)]
        wav: PathBuf,
        /// Stop after this many ticks
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate a composition and print it as JSON
    Compose(ComposeArgs),
    /// Generate a composition and list its notes by name and frequency
    Notes(ComposeArgs),
}

#[derive(Args, Debug)]
struct ComposeArgs {
    #[arg(long, default_value = "classical")]
    style: Style,
    #[arg(long, default_value = "major")]
    scale: ScaleType,
    #[arg(long, default_value = "C")]
    key: PitchClass,
    #[arg(long, default_value_t = 32)]
    steps: usize,
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
    #[arg(long)]
    rhythm_complexity: Option<f32>,
    #[arg(long)]
    harmonic_complexity: Option<f32>,
    /// Seed (defaults to the configured seed)
    #[arg(long)]
    seed: Option<u64>,
    /// Analyze this WAV first and let its final snapshot steer generation
    #[arg(long)]
    wav: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Analyze { wav, limit } => run_analyze(&config, &wav, limit),
        Commands::Compose(args) => {
            let composition = compose(config, &args)?;
            emit_composition(&composition, args.output.as_deref())?;
            Ok(ExitCode::from(0))
        }
        Commands::Notes(args) => {
            let composition = compose(config, &args)?;
            print_notes(&composition);
            Ok(ExitCode::from(0))
        }
    }
}

fn run_analyze(config: &AppConfig, wav: &Path, limit: Option<usize>) -> Result<ExitCode> {
    analyze_wav(config, wav, limit, |features| {
        println!("{}", serde_json::to_string(features)?);
        Ok(())
    })?;
    Ok(ExitCode::from(0))
}

/// Run a WAV file through the analyzer, tick by tick
///
/// Returns the final snapshot, if the file produced any frames.
fn analyze_wav<F>(
    config: &AppConfig,
    wav: &Path,
    limit: Option<usize>,
    mut on_tick: F,
) -> Result<Option<AudioFeatures>>
where
    F: FnMut(&AudioFeatures) -> Result<()>,
{
    let mut source = WavFileSource::new(wav, &config.analysis);
    if !source.initialize() {
        bail!("could not open {}", wav.display());
    }

    let mut analyzer =
        AudioAnalyzer::with_config(source.analysis_config(), config.beat_detection.clone());
    let mut frequency = vec![0u8; source.bin_count()];
    let mut time_domain = vec![128u8; source.bin_count()];
    let max_ticks = limit.unwrap_or(usize::MAX);

    let mut ticks = 0;
    while ticks < max_ticks && source.read_frame(&mut frequency, &mut time_domain) {
        let features = analyzer.process_frame(&frequency, &time_domain);
        on_tick(&features)?;
        ticks += 1;
    }

    tracing::info!("Analyzed {} ticks from {}", ticks, wav.display());
    Ok(analyzer.latest())
}

fn compose(config: AppConfig, args: &ComposeArgs) -> Result<Composition> {
    let defaults = GenerationConfig::default();
    let mut generation = GenerationConfig {
        temperature: args.temperature,
        steps: args.steps,
        key_signature: args.key,
        scale_type: args.scale,
        style: args.style,
        rhythm_complexity: args.rhythm_complexity.unwrap_or(defaults.rhythm_complexity),
        harmonic_complexity: args
            .harmonic_complexity
            .unwrap_or(defaults.harmonic_complexity),
        audio_analysis: None,
    };

    if let Some(wav) = &args.wav {
        generation.audio_analysis = analyze_wav(&config, wav, None, |_| Ok(()))?;
    }

    let seed = args.seed.unwrap_or(config.generation.seed);
    let ctx = AppContext::new(config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let composition = runtime
        .block_on(ctx.compose_seeded(&generation, seed, &CancelToken::new()))
        .context("generating composition")?;

    Ok(composition)
}

fn emit_composition(composition: &Composition, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(composition)?;
    if let Some(path) = output {
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

fn print_notes(composition: &Composition) {
    for (kind, phrase) in composition.phrases() {
        println!(
            "{} ({} {} {}, {} bpm, {:.2} beats)",
            kind,
            phrase.key,
            phrase.scale,
            phrase.style,
            phrase.tempo,
            phrase.length_beats()
        );
        for note in &phrase.notes {
            println!(
                "  {:>4} {:>8.2} Hz  start={:>6.2} dur={:>5.2} vel={:.2}",
                midi_to_note_name(note.pitch),
                midi_to_frequency(note.pitch),
                note.start_time,
                note.duration,
                note.velocity
            );
        }
    }
}
