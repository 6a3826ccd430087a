//! recap CLI - resumable media summary pipeline.
//!
//! Fetches metadata and audio for a URL, transcribes it, summarizes the
//! transcript, and delivers the summary. Every step checkpoints into a
//! per-URL job directory, so re-running the same URL resumes where the
//! last run stopped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;

use recap_core::checkpoint::{job_identity, CheckpointStore};
use recap_core::config::{default_config_path, ConfigManager, SummarizerBackend};
use recap_core::logging::{init_tracing, JobLoggerBuilder, LogLevel};
use recap_core::media::{WhisperCli, YtDlp};
use recap_core::notify::{DesktopChannel, EmailChannel, NotifyChannel, TelegramChannel};
use recap_core::orchestrator::{create_standard_pipeline, Context, JobState};
use recap_core::summarize::{CodexCli, OpenAiChat, Summarizer};

#[derive(Parser)]
#[command(name = "recap")]
#[command(version)]
#[command(about = "Turn a media URL into a transcribed, summarized, delivered brief")]
struct Cli {
    /// Media URL to process
    url: String,

    /// Show per-step checkpoint status before running
    #[arg(short = 'r', long)]
    resume: bool,

    /// Clear all completion markers and re-run every step
    #[arg(long)]
    fresh: bool,

    /// Upgrade external tool versions before running
    #[arg(short = 'U', long)]
    upgrade: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Load configuration, creating a commented default file on first run.
///
/// An explicitly passed path must already exist; only the default path is
/// created when missing.
fn load_config(explicit: Option<&Path>) -> Result<ConfigManager> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let mut manager = ConfigManager::new(&path);
    if explicit.is_some() {
        manager
            .load()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    } else {
        manager
            .load_or_create()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }
    Ok(manager)
}

fn print_status(store: &CheckpointStore, step_names: &[&str]) {
    println!("Resume mode - Current status:");
    for (step, done) in store.status(step_names) {
        let mark = if done { "✓" } else { "○" };
        println!("  {} {}", mark, step);
    }
    println!();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let manager = load_config(cli.config.as_deref())?;
    manager
        .ensure_dirs_exist()
        .context("Failed to create the job state directory")?;
    let settings = manager.settings().clone();

    let job_key = job_identity(&cli.url);
    let store = CheckpointStore::open(&settings.state_root(), &job_key).with_context(|| {
        format!(
            "Failed to open job state under {}",
            settings.state_root().display()
        )
    })?;

    let pipeline = create_standard_pipeline();
    let step_names = pipeline.step_names();

    if cli.fresh {
        store
            .clear_all_markers(&step_names)
            .context("Failed to clear completion markers")?;
        println!("Fresh run: cleared all completion markers");
    }

    if cli.resume {
        print_status(&store, &step_names);
    }

    let logger = Arc::new(
        JobLoggerBuilder::new(&job_key[..12], store.dir())
            .config(settings.logging.to_log_config(cli.verbose))
            .sink(Box::new(|line| println!("{}", line)))
            .build()
            .context("Failed to open the job log")?,
    );

    let summarizer: Box<dyn Summarizer> = match settings.summarizer.backend {
        SummarizerBackend::Codex => Box::new(CodexCli::new(&settings.summarizer, store.dir())),
        SummarizerBackend::Openai => Box::new(
            OpenAiChat::new(&settings.summarizer)
                .context("Failed to initialize the OpenAI summarizer")?,
        ),
    };

    let channels: Vec<Box<dyn NotifyChannel>> = vec![
        Box::new(EmailChannel::from_settings(&settings.email)),
        Box::new(
            TelegramChannel::from_settings(&settings.telegram)
                .context("Failed to initialize the Telegram channel")?,
        ),
        Box::new(DesktopChannel::from_settings(&settings.desktop)),
    ];

    let ctx = Context {
        locator: cli.url.clone(),
        media: Box::new(YtDlp::from_settings(&settings.tools)),
        transcriber: Box::new(WhisperCli::from_settings(&settings.tools, cli.upgrade)),
        summarizer,
        channels,
        settings,
        store,
        logger,
    };

    let mut state = JobState::default();
    pipeline.run(&ctx, &mut state)?;

    Ok(())
}
