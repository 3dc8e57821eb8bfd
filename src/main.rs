//! a11y-overlay - headless demo session
//!
//! Mounts the widget over an in-memory host, drives a scripted session
//! (overlays, style features, page narration) and prints the resulting
//! status.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use a11y_overlay::config::{default_config_path, load_config, save_config};
use a11y_overlay::host::headless::{HeadlessHost, HeadlessNarrator};
use a11y_overlay::host::{narration_channel, Point, Rect, Voice};
use a11y_overlay::settings::ValueDomain;
use a11y_overlay::{AppConfig, Feature, Host, NarrationLink, Widget, WidgetCommand};

const SAMPLE_TEXT: &str = "Reading aids help people focus. The mask dims everything \
    but one band! Does the magnifier follow the pointer? It does.";

/// a11y-overlay - accessibility widget demo
#[derive(Parser, Debug)]
#[command(name = "a11y-overlay")]
#[command(about = "Run a scripted accessibility widget session over a headless host")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text placed on the page and read aloud
    #[arg(short, long)]
    text: Option<String>,

    /// Print the final status as JSON
    #[arg(long)]
    json: bool,

    /// List feature keys and exit
    #[arg(long)]
    list_features: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if args.list_features {
        println!("Available features:");
        for feature in Feature::ALL {
            let values = match feature.domain() {
                ValueDomain::Binary => "off -> on",
                ValueDomain::Level => "default -> high -> low",
            };
            println!("  {:<16} {}", feature.key(), values);
        }
        return Ok(());
    }

    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = load_settings(&config_path);

    if args.write_config {
        save_config(&config, &config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let host = Arc::new(HeadlessHost::new());
    host.set_language(Some("en-US"));
    host.set_body_text(args.text.as_deref().unwrap_or(SAMPLE_TEXT));
    host.add_element(Rect::new(0.0, 0.0, 1280.0, 2000.0), "<main>...</main>");
    host.add_element(Rect::new(40.0, 120.0, 600.0, 240.0), "<article>...</article>");

    let (tx, rx) = narration_channel();
    let narrator = Arc::new(
        HeadlessNarrator::new(tx)
            .with_voices(vec![Voice::new("Default", "en-US")])
            .auto_complete(),
    );

    let mut widget = Widget::mount(
        Host {
            surface: host.clone(),
            frames: host.clone(),
            styles: host.clone(),
            narration: Some(NarrationLink {
                engine: narrator.clone(),
                events: rx,
            }),
        },
        config,
    );
    let notices = widget.notices();

    widget.execute(WidgetCommand::OpenPanel);
    for feature in [
        Feature::FontSize,
        Feature::Contrast,
        Feature::ReadingMask,
        Feature::ReadingGuide,
        Feature::Magnifier,
    ] {
        let value = widget.toggle(feature);
        info!("{} = {}", feature.key(), value.as_str());
    }

    for y in [100.0, 102.0, 140.0, 220.0, 223.0, 300.0] {
        let events = host.pointer_move(Point::new(200.0, y));
        widget.handle_events(events);
        let frames = host.tick();
        widget.handle_events(frames);
    }

    widget.toggle(Feature::ReadAloud);
    let processed = widget.pump();
    info!("Processed {} narration events", processed);

    for notice in notices.try_iter() {
        println!("notice: {}", notice.message());
    }

    let status = widget.status();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Panel open: {}", status.panel_open);
        println!("Overlays:   {:?}", status.overlays);
        for feature in status.active_features() {
            println!("  {:<16} {}", feature.key(), status.features[&feature].as_str());
        }
        println!("Sentences spoken: {}", narrator.spoken().len());
    }

    widget.unmount();
    info!("Remaining listeners after unmount: {}", host.total_listeners());
    Ok(())
}

/// Load configuration, falling back to defaults when the file is missing
/// or unreadable
fn load_settings(path: &Path) -> AppConfig {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return AppConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load config from {}: {}. Using defaults.", path.display(), e);
            AppConfig::default()
        }
    }
}
