use std::{
    num::NonZeroUsize,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kesit_core::{
    GeminiAnalyzer, KesitError, ProviderConfig, REPORT_FILE_NAME, Session, SessionPhase,
    format_result_readable, save_report,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "kesit=warn,kesit_core=warn";

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser, Debug)]
#[command(name = "kesit")]
#[command(about = "Find the most viral moments of a YouTube video with Gemini")]
struct Cli {
    /// YouTube video URL
    url: String,

    /// Gemini model to use. Overrides KESIT_MODEL.
    #[arg(short, long)]
    model: Option<String>,

    /// How long each simulated step (download, comments) lingers, in milliseconds
    #[arg(long, default_value_t = 2000)]
    dwell_ms: u64,

    /// Clip to play in the embedded player (1-based). Defaults to the first clip.
    #[arg(short, long)]
    clip: Option<NonZeroUsize>,

    /// Save the plain-text report, to metadata_output.txt unless a path is given
    #[arg(short, long, num_args = 0..=1, default_missing_value = REPORT_FILE_NAME)]
    save: Option<PathBuf>,

    /// Print the analysis as JSON instead of the readable view
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // stderr keeps stdout clean for --json output
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .with(env_filter)
            .init();
    }
}

fn missing_clip_warning(requested: usize, active: Option<usize>) -> String {
    match active {
        Some(i) => format!("clip #{requested} does not exist, playing clip #{}", i + 1),
        None => format!("clip #{requested} does not exist, there is no clip to play"),
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn step_message(phase: SessionPhase, model: &str) -> String {
    match phase {
        SessionPhase::Analyzing => format!("Scanning viral moments with {}...", model),
        other => other.label().to_string(),
    }
}

fn step_done(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Downloading => "Video downloaded (simulated)",
        SessionPhase::FetchingComments => "Comments analyzed (simulated)",
        SessionPhase::Analyzing => "Viral moments scanned",
        other => other.label(),
    }
}

/// Render one spinner per running phase until the session reaches a terminal phase.
async fn show_progress(mut phases: broadcast::Receiver<SessionPhase>, model: String) {
    let mut running: Option<(ProgressBar, SessionPhase, Instant)> = None;

    loop {
        let phase = match phases.recv().await {
            Ok(phase) => phase,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "progress view lagged behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if let Some((pb, step, started)) = running.take() {
            let mark = if phase == SessionPhase::Error {
                style("✗").red().bold()
            } else {
                style("✓").green().bold()
            };
            pb.finish_with_message(format!(
                "{} {} {}",
                mark,
                step_done(step),
                style(format!("[{}]", format_duration(started.elapsed()))).dim()
            ));
        }

        if phase.is_terminal() {
            break;
        }

        if phase.is_busy() {
            running = Some((create_spinner(&step_message(phase, &model)), phase, Instant::now()));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Validate API key early
    let mut config = match ProviderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    debug!(?config, "provider configured");

    let analyzer = GeminiAnalyzer::new(config)?;
    let model = analyzer.model().to_string();
    let mut session =
        Session::new(Arc::new(analyzer)).with_dwell(Duration::from_millis(cli.dwell_ms));

    println!(
        "\n{}  {}\n",
        style("kesit").cyan().bold(),
        style("Viral Clip Analyzer").dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let progress = tokio::spawn(show_progress(session.subscribe(), model));

    if let Err(err) = session.start_analysis(&cli.url).await.map(|_| ()) {
        if matches!(err, KesitError::InvalidLink { .. }) {
            progress.abort();
        } else {
            let _ = progress.await;
        }
        eprintln!("{} {}", style("Error:").red().bold(), err);
        if err.is_retryable() {
            eprintln!("{}", style("Run the same command again to retry.").dim());
        }
        std::process::exit(1);
    }
    let _ = progress.await;

    if let Some(n) = cli.clip {
        if session.select_clip(n.get() - 1).is_none() {
            eprintln!(
                "{} {}",
                style("Warning:").yellow().bold(),
                missing_clip_warning(n.get(), session.active_clip_index())
            );
        }
    }

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!("{}", style("─".repeat(60)).dim());

    let Some(result) = session.result() else {
        return Ok(());
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!(
            "{}",
            format_result_readable(result, session.active_clip_index())
        );
    }

    if let Some(url) = session.embed_url() {
        println!("{} {}", style("Player:").dim(), style(url).cyan());
    }

    if let Some(path) = cli.save {
        save_report(result, &path).await?;
        println!(
            "\n{} {}\n",
            style("Saved:").dim(),
            style(path.display()).cyan()
        );
    }

    Ok(())
}
