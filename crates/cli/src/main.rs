//! Versicle CLI — poem analysis and melody generation.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use versicle_core::melody::style::StylePreset;
use versicle_core::melody::variation;
use versicle_core::melody::{GenerateOptions, MoodSuggestions, ParamOverrides};
use versicle_core::{analyze_poem, generate_melody, melody_to_abc, melody_to_midi, RuleLexicon};

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "versicle",
    about = "Turn poem text into a singable melody with ABC notation output",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a poem: meter, singability, structure
    Analyze(AnalyzeArgs),
    /// Generate a melody and print its ABC notation
    Generate(GenerateArgs),
}

// ─── Shared arguments ────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Poem text file ("-" reads stdin)
    input: PathBuf,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Analyze ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Analyze a poem and print the analysis as JSON")]
struct AnalyzeArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

// ─── Generate ────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Generate a melody from a poem")]
struct GenerateArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u32>,

    /// Melody title (default: first poem line)
    #[arg(long)]
    title: Option<String>,

    /// Key override
    #[arg(long, value_parser = ["C", "G", "D", "F", "Am", "Em", "Dm"])]
    key: Option<String>,

    /// Tempo override in BPM
    #[arg(long)]
    tempo: Option<u32>,

    /// Time signature override
    #[arg(long, value_parser = ["4/4", "3/4", "6/8", "2/4"])]
    time_signature: Option<String>,

    /// Style preset to apply
    #[arg(long, value_parser = ["folk", "classical", "pop", "hymn"])]
    style: Option<String>,

    /// Insert breath rests between lines
    #[arg(long, default_value_t = false)]
    breaths: bool,

    /// Variation applied after generation
    #[arg(long, value_parser = ["ornament", "simplify", "invert", "transpose"])]
    variation: Option<String>,

    /// Semitone shift for the transpose variation
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    semitones: i32,

    /// Grace-note probability for the ornament variation
    #[arg(long, default_value_t = 0.4)]
    ornament_probability: f64,

    /// Mood suggestions JSON file (external sentiment analysis)
    #[arg(long)]
    mood: Option<PathBuf>,

    /// Write a Standard MIDI File alongside the ABC output
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Write the ABC text here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Generate(args) => run_generate(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading poem from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading poem from {}", path.display()))
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    init_logging(args.shared.verbose);
    let text = read_input(&args.shared.input)?;
    let analysis = analyze_poem(&text, &RuleLexicon);

    let json = if args.pretty {
        serde_json::to_string_pretty(&analysis)?
    } else {
        serde_json::to_string(&analysis)?
    };
    println!("{json}");
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    init_logging(args.shared.verbose);
    let text = read_input(&args.shared.input)?;
    let analysis = analyze_poem(&text, &RuleLexicon);

    let mood: MoodSuggestions = match &args.mood {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading mood file {}", path.display()))?;
            serde_json::from_str(&raw).context("parsing mood suggestions")?
        }
        None => MoodSuggestions::default(),
    };

    let title = args.title.clone().or_else(|| {
        analysis
            .poem
            .stanzas
            .first()
            .and_then(|s| s.first())
            .cloned()
    });

    let style = match &args.style {
        Some(name) => match StylePreset::from_name(name) {
            Some(preset) => Some(preset),
            None => bail!("unknown style {name:?}"),
        },
        None => None,
    };

    let options = GenerateOptions {
        seed: args.seed,
        mood,
        overrides: ParamOverrides {
            title,
            key: args.key.clone(),
            tempo: args.tempo,
            time_signature: args.time_signature.clone(),
        },
        breath_rests: args.breaths,
        style,
    };

    let mut melody = generate_melody(&analysis, &options);

    if let Some(kind) = &args.variation {
        melody = match kind.as_str() {
            "transpose" => variation::transpose(&melody, args.semitones),
            "ornament" => variation::ornament(&melody, args.ornament_probability),
            other => variation::apply_variation(&melody, other),
        };
    }

    let abc = melody_to_abc(&melody).context("encoding ABC notation")?;
    match &args.output {
        Some(path) => {
            fs::write(path, &abc).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote ABC to {}", path.display());
        }
        None => print!("{abc}"),
    }

    if let Some(path) = &args.midi {
        let bytes = melody_to_midi(&melody).context("encoding MIDI")?;
        fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote MIDI to {}", path.display());
    }

    Ok(())
}
