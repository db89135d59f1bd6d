//! The Realest CLI
//!
//! Mount the landing page headlessly, scroll it, and inspect the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use realest_animation::{global_engine, set_global_engine, EngineAccess, EngineCell, SurfaceLoader};
use realest_app::sections::real_journey;
use realest_app::{LandingPage, SiteConfig, CONFIG_FILE};
use realest_core::{DocumentSnapshot, FixedMotionPreference, MotionPreference, UiStore};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "realest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The Realest landing page", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the page, scroll it and print the document as JSON
    Render {
        /// Scroll offset in pixels
        #[arg(long, conflicts_with = "progress")]
        scroll: Option<f32>,

        /// Progress through the pinned journey, from 0 to 1
        #[arg(long)]
        progress: Option<f32>,

        /// Render as a visitor who prefers reduced motion
        #[arg(long)]
        reduced_motion: bool,

        /// Render as a pre-render pass with no surface to animate on
        #[arg(long)]
        pre_render: bool,

        /// Play this many frames instead of jumping to the end state
        #[arg(long)]
        frames: Option<u32>,
    },

    /// Show or change the persisted theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = SiteConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Render {
            scroll,
            progress,
            reduced_motion,
            pre_render,
            frames,
        } => cmd_render(
            &config,
            RenderOptions {
                scroll,
                progress,
                reduced_motion,
                pre_render,
                frames,
            },
        ),

        Commands::Theme { command } => cmd_theme(&config, command),
    }
}

struct RenderOptions {
    scroll: Option<f32>,
    progress: Option<f32>,
    reduced_motion: bool,
    pre_render: bool,
    frames: Option<u32>,
}

#[derive(Serialize)]
struct RenderOutput {
    scroll: f32,
    sections: Vec<SectionReport>,
    document: DocumentSnapshot,
}

#[derive(Serialize)]
struct SectionReport {
    name: String,
    state: String,
}

fn cmd_render(config: &SiteConfig, options: RenderOptions) -> Result<()> {
    if let Some(scroll) = options.scroll {
        if !scroll.is_finite() {
            anyhow::bail!("--scroll must be a finite offset, got {}", scroll);
        }
    }
    if let Some(progress) = options.progress {
        if !(0.0..=1.0).contains(&progress) {
            anyhow::bail!("--progress must be between 0 and 1, got {}", progress);
        }
    }

    let ui = Arc::new(UiStore::new(config.theme_persistence()));
    let page = LandingPage::new(config.viewport(), ui);

    let motion: Arc<dyn MotionPreference> = if options.reduced_motion {
        Arc::new(FixedMotionPreference(true))
    } else {
        config.motion_preference()
    };

    let headless;
    let engine: &dyn EngineAccess = if options.pre_render {
        headless = EngineCell::new(SurfaceLoader::headless());
        &headless
    } else {
        set_global_engine(EngineCell::new(SurfaceLoader::new(config.engine_config())));
        global_engine()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start the runtime")?;
    runtime.block_on(page.mount_all(engine, motion.as_ref()));

    for (name, state) in page.states() {
        info!("{:<14} {:?}", name, state);
    }

    let target = match (options.scroll, options.progress) {
        (Some(offset), _) => offset,
        (None, Some(progress)) => journey_offset(&page, progress)?,
        (None, None) => 0.0,
    };
    let scroll = page.scroll_to(target);
    if scroll != target {
        warn!("Scroll offset {} clamped to {}", target, scroll);
    }

    match options.frames {
        Some(frames) => {
            let dt = config.engine_config().frame_duration();
            let mut played = 0;
            while played < frames && page.tick(dt) {
                played += 1;
            }
            info!("Played {} frame(s)", played);
        }
        None => page.settle(),
    }

    let output = RenderOutput {
        scroll,
        sections: page
            .states()
            .into_iter()
            .map(|(name, state)| SectionReport {
                name: name.to_string(),
                state: format!("{:?}", state),
            })
            .collect(),
        document: page
            .document()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Page offset at `progress` through the pinned journey
fn journey_offset(page: &LandingPage, progress: f32) -> Result<f32> {
    let doc = page.document().lock().unwrap_or_else(|e| e.into_inner());
    let journey = doc
        .query(doc.root(), real_journey::ROOT)
        .context("The page has no journey section")?;
    let distance = real_journey::PIN_VIEWPORTS * doc.viewport().height;
    Ok(doc.layout_top(journey) + progress * distance)
}

fn cmd_theme(config: &SiteConfig, command: ThemeCommands) -> Result<()> {
    if config.theme.state_path.is_none() {
        warn!("No [theme] state_path configured; the theme will not persist");
    }
    let ui = UiStore::new(config.theme_persistence());
    let dark = match command {
        ThemeCommands::Show => ui.is_dark_mode(),
        ThemeCommands::Toggle => ui.toggle_theme(),
    };
    println!("{}", if dark { "dark" } else { "light" });
    Ok(())
}
