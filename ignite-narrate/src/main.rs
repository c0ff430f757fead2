//! ignite-narrate - Prepare lesson narration text and check word-highlight alignment

mod config;
mod content;
mod script;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use narration_text::{CanonicalText, TimestampTrack, WordTimeline};
use script::{NarrationScript, ScriptOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ignite-narrate")]
#[command(about = "Prepare lesson narration text and check word-highlight alignment", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the canonical narration text of an HTML file
    Extract {
        /// HTML file, or `-` for stdin
        input: PathBuf,
    },
    /// Print the word sequence of an HTML file
    Words {
        /// HTML file, or `-` for stdin
        input: PathBuf,

        /// Print a JSON array instead of `index<TAB>word` lines
        #[arg(long)]
        json: bool,
    },
    /// Build narration scripts for a file or a directory of lessons
    Prepare {
        /// HTML file or content directory
        path: PathBuf,

        /// Directory to write scripts into (default: next to each source)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Regenerate scripts even when the content is unchanged
        #[arg(long)]
        force: bool,
    },
    /// Verify that a timing track matches the words rendered for an HTML file
    Check {
        /// HTML file the narration was generated from
        html: PathBuf,
        /// Timing track JSON (word timings or character alignment)
        timestamps: PathBuf,
    },
    /// Show which word is highlighted at a playback position
    Highlight {
        /// HTML file the narration was generated from
        html: PathBuf,
        /// Timing track JSON (word timings or character alignment)
        timestamps: PathBuf,

        /// Playback position in seconds
        #[arg(long)]
        at: f64,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Provider voice identifier
        voice_id: String,
    },
    /// Set default speech model
    SetModel {
        /// Provider model identifier
        model_id: String,
    },
    /// Set whether JSON output is pretty-printed
    SetPretty {
        /// true or false
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match &args.command {
        Commands::Extract { input } => handle_extract(input),
        Commands::Words { input, json } => handle_words(input, *json),
        Commands::Prepare {
            path,
            output,
            force,
        } => {
            let config = NarrateConfig::load().context("Failed to load configuration")?;
            handle_prepare(path, output.as_deref(), *force, &config)
        }
        Commands::Check { html, timestamps } => handle_check(html, timestamps),
        Commands::Highlight {
            html,
            timestamps,
            at,
        } => handle_highlight(html, timestamps, *at),
        Commands::Config { action } => handle_config_command(action),
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn handle_extract(input: &Path) -> Result<()> {
    let html = content::read_source(input)?;
    println!("{}", CanonicalText::from_html(&html));
    Ok(())
}

fn handle_words(input: &Path, json: bool) -> Result<()> {
    let html = content::read_source(input)?;
    let text = CanonicalText::from_html(&html);
    let words = text.words();

    if json {
        println!("{}", serde_json::to_string(&words)?);
    } else {
        for (index, word) in words.iter().enumerate() {
            println!("{}\t{}", index, word);
        }
    }
    Ok(())
}

/// Outcome of preparing one content file.
#[derive(Debug, PartialEq)]
enum Prepared {
    Written(PathBuf),
    Unchanged(PathBuf),
}

fn handle_prepare(
    path: &Path,
    output: Option<&Path>,
    force: bool,
    config: &NarrateConfig,
) -> Result<()> {
    let sources = content::collect_sources(path, &config.extensions)?;
    if sources.is_empty() {
        anyhow::bail!("No content files found under {}", path.display());
    }

    let options = ScriptOptions::from(config);

    // A single file with no output directory goes to stdout.
    if path.is_file() && output.is_none() {
        let html = content::read_source(path)?;
        let script = NarrationScript::from_html(&html, Some(path), options);
        println!("{}", script.to_json(config.pretty)?);
        return Ok(());
    }

    let mut written = 0;
    let mut unchanged = 0;
    for source in &sources {
        match prepare_source(source, path, output, force, &options, config.pretty)? {
            Prepared::Written(script_path) => {
                log::info!("wrote {}", script_path.display());
                written += 1;
            }
            Prepared::Unchanged(script_path) => {
                log::debug!("unchanged {}", script_path.display());
                unchanged += 1;
            }
        }
    }

    eprintln!(
        "Prepared {} script(s), {} unchanged, from {} content file(s)",
        written,
        unchanged,
        sources.len()
    );
    Ok(())
}

fn prepare_source(
    source: &Path,
    base: &Path,
    output: Option<&Path>,
    force: bool,
    options: &ScriptOptions,
    pretty: bool,
) -> Result<Prepared> {
    let html = content::read_source(source)?;
    let target = script::script_path(source, base, output);

    if !force && target.exists() {
        match NarrationScript::load(&target) {
            Ok(existing) if !existing.is_stale(&html) && existing.options == *options => {
                return Ok(Prepared::Unchanged(target));
            }
            Ok(_) => log::debug!("{} is stale, regenerating", target.display()),
            Err(e) => log::warn!("Replacing unreadable script: {:#}", e),
        }
    }

    let script = NarrationScript::from_html(&html, Some(source), options.clone());
    script.save(&target, pretty)?;
    Ok(Prepared::Written(target))
}

fn load_timeline(path: &Path) -> Result<WordTimeline> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read timing track {}", path.display()))?;
    let track: TimestampTrack = serde_json::from_str(&json)
        .with_context(|| format!("Unrecognized timing track format in {}", path.display()))?;
    let timeline = WordTimeline::from_track(track)
        .with_context(|| format!("Invalid timing track {}", path.display()))?;
    Ok(timeline)
}

fn handle_check(html_path: &Path, timestamps: &Path) -> Result<()> {
    let html = content::read_source(html_path)?;
    let text = CanonicalText::from_html(&html);
    let timeline = load_timeline(timestamps)?;

    timeline.check_parity(&text.words()).with_context(|| {
        format!(
            "Narration for {} has drifted from its text; regenerate it",
            html_path.display()
        )
    })?;

    println!("OK: {} words aligned", timeline.len());
    Ok(())
}

fn handle_highlight(html_path: &Path, timestamps: &Path, at: f64) -> Result<()> {
    match highlighted_word(html_path, timestamps, at)? {
        Some((index, word)) => println!("{}\t{}", index, word),
        None => println!("-\t(before first word)"),
    }
    Ok(())
}

/// The word index and rendered word playing at `at` seconds.
fn highlighted_word(html_path: &Path, timestamps: &Path, at: f64) -> Result<Option<(usize, String)>> {
    let html = content::read_source(html_path)?;
    let text = CanonicalText::from_html(&html);
    let words = text.words();
    let timeline = load_timeline(timestamps)?;

    let Some(index) = timeline.word_at(at) else {
        return Ok(None);
    };
    match words.get(index) {
        Some(word) => Ok(Some((index, word.to_string()))),
        None => anyhow::bail!(
            "Timing track for {} has word {} but the text only has {} words; regenerate it",
            html_path.display(),
            index,
            words.len()
        ),
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            match &config.voice_id {
                Some(voice) => println!("voice_id = \"{}\"", voice),
                None => println!("voice_id = (provider default)"),
            }
            match &config.model_id {
                Some(model) => println!("model_id = \"{}\"", model),
                None => println!("model_id = (provider default)"),
            }
            println!("pretty = {}", config.pretty);
            println!("extensions = {:?}", config.extensions);
        }
        ConfigAction::SetVoice { voice_id } => {
            let mut config = NarrateConfig::load()?;
            config.voice_id = Some(voice_id.clone());
            config.save()?;
            println!("Default voice set to: {}", voice_id);
        }
        ConfigAction::SetModel { model_id } => {
            let mut config = NarrateConfig::load()?;
            config.model_id = Some(model_id.clone());
            config.save()?;
            println!("Default model set to: {}", model_id);
        }
        ConfigAction::SetPretty { value } => {
            let mut config = NarrateConfig::load()?;
            config.pretty = *value;
            config.save()?;
            println!("Pretty JSON output set to: {}", config.pretty);
        }
    }
    Ok(())
}
