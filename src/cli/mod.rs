//! Command-line interface for skippy.
//!
//! Provides commands for inspecting the segment chain of a video, replaying
//! scripted playback timelines, and showing the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::adapters::{FileSegmentSource, SegmentSource};
use crate::config::{self, Settings};
use crate::core::{link, PromptResult, SkipPolicy, TickAction, TickOutcome};
use crate::simulate::Timeline;

/// skippy - Segment skip engine for video playback
#[derive(Parser, Debug)]
#[command(name = "skippy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the linked segments for a video
    Segments {
        /// Video file (segment files are looked up next to it)
        video: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Link relative to this playback position (seconds)
        #[arg(long)]
        at: Option<f64>,
    },

    /// Replay a scripted playback timeline through the monitor
    Simulate {
        /// Timeline YAML file
        timeline: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Segments { video, json, at } => show_segments(&video, json, at).await,
            Commands::Simulate { timeline } => run_simulation(&timeline).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Load, link, and print the segment chain of a video
async fn show_segments(video: &Path, json: bool, at: Option<f64>) -> Result<()> {
    let settings = &config::config()?.settings;
    let source = FileSegmentSource::new(settings.edl.clone());

    let Some(raw) = source
        .load(video)
        .await
        .with_context(|| format!("Failed to load segments for {}", video.display()))?
    else {
        println!("No segment file found for {}", video.display());
        return Ok(());
    };

    let segments = raw
        .into_iter()
        .filter_map(|raw| {
            raw.into_segment()
                .map_err(|e| warn!(error = %e, "Rejected segment"))
                .ok()
        })
        .collect();
    let linked = link(segments, at, settings.eliminate_overlaps());

    if json {
        println!("{}", serde_json::to_string_pretty(&linked.segments)?);
        return Ok(());
    }

    if linked.segments.is_empty() {
        println!("No usable segments in segment file");
        return Ok(());
    }

    println!(
        "{:<16} {:>9} {:>9} {:>9} {:<8} {}",
        "LABEL", "START", "END", "JUMP", "MODE", "TARGET"
    );
    println!("{}", "-".repeat(80));
    for segment in &linked.segments {
        println!(
            "{:<16} {:>9.2} {:>9.2} {:>9.2} {:<8} {}",
            segment.label(),
            segment.start(),
            segment.end(),
            segment.jump_target(),
            format!("{:?}", settings.skip_mode(segment.label())).to_lowercase(),
            segment.next_jump_info().unwrap_or("past end"),
        );
    }
    println!();
    println!(
        "{} segment(s), {}",
        linked.segments.len(),
        if linked.has_relations {
            "nested/overlapping segments present"
        } else {
            "no overlaps"
        }
    );

    Ok(())
}

/// Run a timeline and print what every tick did
async fn run_simulation(path: &Path) -> Result<()> {
    let timeline = Timeline::load(path)?;
    let settings: Settings = config::config()?.settings.clone();

    let report = timeline.run(settings).await?;

    for tick in &report.ticks {
        println!(
            "step {:>3} @ {:>8.2}s  {}",
            tick.step,
            tick.position,
            describe(&tick.outcome)
        );
    }

    if !report.notifications.is_empty() {
        println!();
        println!("Notifications:");
        for notification in &report.notifications {
            println!("  [{}] {}", notification.heading, notification.message);
        }
    }

    Ok(())
}

fn describe(outcome: &TickOutcome) -> String {
    match outcome {
        TickOutcome::NoSession => "no video playing".to_string(),
        TickOutcome::Paused => "paused".to_string(),
        TickOutcome::Unavailable => "player unavailable".to_string(),
        TickOutcome::Initializing => "waiting for playback".to_string(),
        TickOutcome::Idle => "-".to_string(),
        TickOutcome::Action(TickAction::AutoSkipped { id, target }) => {
            format!("auto-skipped {} to {:.2}s", id, target)
        }
        TickOutcome::Action(TickAction::Prompted { id, result }) => match result {
            PromptResult::Accepted { target } => format!("prompted {}: skipped to {:.2}s", id, target),
            PromptResult::Declined(reason) => format!("prompted {}: declined ({:?})", id, reason),
            PromptResult::Failed => format!("prompted {}: dialog failed", id),
        },
        TickOutcome::Action(TickAction::Suppressed { id, reason }) => {
            format!("suppressed {} ({:?})", id, reason)
        }
    }
}

/// Show the resolved configuration
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    print!(
        "{}",
        serde_yaml::to_string(&cfg.settings).context("Failed to render configuration")?
    );

    Ok(())
}
