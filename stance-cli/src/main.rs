//! Stance Lens CLI
//!
//! Transparent, keyword-driven stance analysis of Bluesky accounts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use stance_bluesky::{BlueskyClient, BlueskyConfig};
use stance_core::{
    Component, Markers, PostVerdict, SharedPolarity, Side, Stance, StanceAnalyzer, StanceConfig,
    UserAnalysis,
};
use stance_polarity::LexiconPolarity;
use stance_runtime::{
    JsonFileSource, Pipeline, PipelineError, RawPostStore, ResultsStore, UserReport,
};

const DEFAULT_RESULTS: &str = "data/processed/stance_analysis.json";
const DEFAULT_RAW_DIR: &str = "data/raw";
const BAR_WIDTH: usize = 20;

#[derive(Parser)]
#[command(name = "stance")]
#[command(author, version, about = "Stance Lens: heuristic stance analysis for Bluesky accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,

    /// Engine configuration file (TOML)
    #[arg(long, env = "STANCE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Extra polarity words (TOML) added to the built-in lists
    #[arg(long, env = "STANCE_POLARITY_LEXICON", global = true)]
    polarity_lexicon: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user's recent posts and analyze their stance
    Analyze {
        /// Bluesky handle, e.g. alice.bsky.social
        handle: String,

        /// Maximum posts to collect (default: 100)
        #[arg(long)]
        max_posts: Option<usize>,

        /// Bluesky AppView base URL
        #[arg(long, env = "BLUESKY_API_URL", default_value = "https://public.api.bsky.app")]
        api_url: String,

        /// Results file (JSON keyed by username)
        #[arg(long, default_value = DEFAULT_RESULTS)]
        results: PathBuf,

        /// Directory for raw collected posts
        #[arg(long, default_value = DEFAULT_RAW_DIR)]
        raw_dir: PathBuf,

        /// Do not write raw posts or results
        #[arg(long)]
        no_save: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a single piece of text
    Post {
        /// Text to classify
        text: String,
    },

    /// Re-analyze a saved raw posts file
    File {
        /// Raw posts file (as written by `analyze`)
        path: PathBuf,

        /// Username to store results under (default: derived from the file name)
        #[arg(short, long)]
        username: Option<String>,

        /// Results file (JSON keyed by username)
        #[arg(long, default_value = DEFAULT_RESULTS)]
        results: PathBuf,

        /// Do not write results
        #[arg(long)]
        no_save: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the stored analysis for a user
    Show {
        /// Username the analysis was stored under
        handle: String,

        /// Results file (JSON keyed by username)
        #[arg(long, default_value = DEFAULT_RESULTS)]
        results: PathBuf,
    },

    /// List the keyword lexicon
    Lexicon,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let analyzer = build_analyzer(cli.config.as_deref(), cli.polarity_lexicon.as_deref())?;

    match cli.command {
        Commands::Analyze {
            handle,
            max_posts,
            api_url,
            results,
            raw_dir,
            no_save,
            json,
        } => {
            let config = BlueskyConfig::default().with_base_url(api_url);
            let max_posts = max_posts.unwrap_or(config.posts_per_user);
            let client = BlueskyClient::new(config)?;

            let mut pipeline = Pipeline::new(Arc::new(client), analyzer, max_posts);
            if !no_save {
                pipeline = pipeline
                    .with_raw_store(RawPostStore::new(raw_dir))
                    .with_results_store(ResultsStore::new(results));
            }

            let report = run_pipeline(&pipeline, &handle).await?;
            print_report(pipeline.analyzer(), &report, json)?;
        }
        Commands::Post { text } => {
            let analyzer = analyzer.with_markers(Markers::ansi());
            let verdict = analyzer.analyze_post(&text);
            print_post(&analyzer, &text, &verdict);
        }
        Commands::File {
            path,
            username,
            results,
            no_save,
            json,
        } => {
            let username = match username {
                Some(name) => name,
                None => username_from_path(&path)
                    .ok_or_else(|| anyhow!("Cannot derive a username from {}; pass --username", path.display()))?,
            };

            let mut pipeline =
                Pipeline::new(Arc::new(JsonFileSource::new(path)), analyzer, usize::MAX);
            if !no_save {
                pipeline = pipeline.with_results_store(ResultsStore::new(results));
            }

            let report = run_pipeline(&pipeline, &username).await?;
            print_report(pipeline.analyzer(), &report, json)?;
        }
        Commands::Show { handle, results } => {
            let store = ResultsStore::new(results);
            let stored = store.get(&handle)?.ok_or_else(|| {
                anyhow!("No stored analysis for @{} in {}", handle, store.path().display())
            })?;

            println!(
                "🗂️  Stored analysis for @{} ({})\n",
                handle,
                stored.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            print_analysis(&analyzer, &stored.analysis);
        }
        Commands::Lexicon => {
            print_lexicon(&analyzer);
        }
    }

    Ok(())
}

fn build_analyzer(config: Option<&Path>, polarity_lexicon: Option<&Path>) -> Result<StanceAnalyzer> {
    let config = match config {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            StanceConfig::from_file(path)?
        }
        None => StanceConfig::default(),
    };

    let polarity: SharedPolarity = match polarity_lexicon {
        Some(path) => Arc::new(LexiconPolarity::with_extension(path)?),
        None => Arc::new(LexiconPolarity::default()),
    };

    Ok(StanceAnalyzer::new(config, polarity)?)
}

async fn run_pipeline(pipeline: &Pipeline, handle: &str) -> Result<UserReport> {
    match pipeline.run(handle).await {
        Ok(report) => Ok(report),
        Err(PipelineError::UserNotFound(h)) => Err(anyhow!("Could not find user @{}", h)),
        Err(PipelineError::NoPosts(h)) => Err(anyhow!("No posts found for @{}", h)),
        Err(e) => Err(e.into()),
    }
}

/// `alice_bsky_social_posts.json` -> `alice.bsky.social`
fn username_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let base = stem.strip_suffix("_posts").unwrap_or(stem);
    if base.is_empty() {
        None
    } else {
        Some(base.replace('_', "."))
    }
}

fn print_report(analyzer: &StanceAnalyzer, report: &UserReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let profile = &report.profile;
    if profile.display_name.is_empty() {
        println!("📊 Stance analysis for @{}", report.handle);
    } else {
        println!("📊 Stance analysis for @{} ({})", report.handle, profile.display_name);
    }
    println!(
        "   Followers: {} | Following: {} | Posts: {}",
        profile.followers_count, profile.follows_count, profile.posts_count
    );
    println!("   Posts analyzed: {}\n", report.post_count);

    print_analysis(analyzer, &report.analysis);
    Ok(())
}

fn print_analysis(analyzer: &StanceAnalyzer, analysis: &UserAnalysis) {
    println!("🧭 Overall stance: {}", analyzer.label(analysis.stance));
    println!("   Confidence: {:.3}", analysis.confidence);
    println!("   Average score: {:+.3}", analysis.average_score);

    if analysis.stance_distribution.is_empty() {
        return;
    }
    println!("\n📈 Distribution:");
    for stance in [Stance::SideA, Stance::SideB, Stance::Neutral] {
        if let Some(share) = analysis.stance_distribution.get(&stance) {
            println!(
                "   {:<18} {} {:>5.1}%",
                analyzer.label(stance),
                share_bar(*share),
                share * 100.0
            );
        }
    }
}

fn print_post(analyzer: &StanceAnalyzer, text: &str, verdict: &PostVerdict) {
    println!("📝 {}\n", analyzer.highlight(text));
    println!("🧭 Stance: {}", analyzer.label(verdict.stance));
    println!("   Score: {:+.3}", verdict.score);
    println!("   Confidence: {:.3}", verdict.confidence);
    for component in Component::ALL {
        if let Some(value) = verdict.details.get(&component) {
            println!("   {:<16} {:+.3}", component.as_str(), value);
        }
    }
}

fn print_lexicon(analyzer: &StanceAnalyzer) {
    let lexicon = analyzer.lexicon();
    for side in Side::BOTH {
        let keywords = lexicon.keywords(side);
        println!("🔑 {} ({} keywords)", lexicon.label(side), keywords.len());
        let phrases: Vec<&str> = keywords.iter().map(|k| k.phrase()).collect();
        println!("   {}\n", phrases.join(", "));
    }
}

/// Text bar for a share in `[0, 1]`
fn share_bar(share: f64) -> String {
    let filled = ((share.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}
