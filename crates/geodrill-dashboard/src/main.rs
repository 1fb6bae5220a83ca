//! Entry point for the geodrill dashboard.
//!
//! Builds one dashboard session from the command line, hydrates its
//! selection from `--query` the way a bookmarked link would, and opens the
//! desktop window.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use clap::Parser;
use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;

use geodrill_core::{
    DashboardConfig, DashboardSession, GeodrillError, GeodrillResult, SelectionEvent,
};
use geodrill_logging::{
    ConsoleFormat, GeodrillSubscriberBuilder, LogConfig, SessionContextGuard, SessionLog,
};

mod app;
mod components;

use app::AppContext;

/// Component CSS (loaded from assets/style.css at compile time)
const STYLE_CSS: &str = include_str!("../assets/style.css");

/// Session shared with the UI once launched.
static CONTEXT: OnceLock<AppContext> = OnceLock::new();

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "geodrill-dashboard")]
#[command(about = "Drill down from continents to cities")]
struct Args {
    /// Initial query string, e.g. "?continent=Europe&country=UK"
    #[arg(short, long)]
    query: Option<String>,

    /// JSON config file (missing fields take defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible failure injection
    #[arg(long)]
    seed: Option<u64>,

    /// Disable simulated provider latency
    #[arg(long)]
    no_latency: bool,

    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Human-readable console logs instead of JSONL
    #[arg(long)]
    pretty: bool,

    /// Also write a JSONL log of this session into the directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn log_config(args: &Args, session: &SessionContextGuard) -> LogConfig {
    let console = ConsoleFormat::from_pretty_flag(args.pretty);
    let config = LogConfig::dashboard(&args.log_level, console);
    match &args.log_dir {
        Some(dir) => {
            config.with_session_log(SessionLog::for_session(dir, session.session_id()))
        }
        None => config,
    }
}

fn load_config(args: &Args) -> GeodrillResult<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.no_latency {
        config = config.with_latency(false);
    }
    config.validate()?;
    Ok(config)
}

/// Session hydrated from `--query`, ready to hand to the window
fn build_context(args: &Args) -> GeodrillResult<AppContext> {
    let config = load_config(args)?;
    tracing::info!(
        cache_capacity = config.cache_capacity,
        latency = config.simulate_latency,
        seed = ?config.seed,
        "starting dashboard"
    );

    let session = Arc::new(DashboardSession::from_config(&config));
    session.dispatch(SelectionEvent::Hydrate(args.query.clone().unwrap_or_default()));
    Ok(AppContext {
        session,
        dismiss_after: config.dismiss_after(),
    })
}

fn main() {
    let args = Args::parse();

    let session_context = SessionContextGuard::new("dashboard");
    let _log_guard = GeodrillSubscriberBuilder::new()
        .with_config(log_config(&args, &session_context))
        .init();
    let _session_span = session_context.span().entered();

    let context = match build_context(&args) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "dashboard failed to start");
            eprintln!("geodrill-dashboard: {e}");
            let code = match e {
                GeodrillError::Config(_) => 2,
                _ => 1,
            };
            std::process::exit(code);
        }
    };
    CONTEXT.set(context).ok();

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title("Geographic Data Dashboard")
                        .with_inner_size(LogicalSize::new(1200.0, 860.0)),
                )
                .with_custom_head(format!(r#"<style>{}</style>"#, STYLE_CSS)),
        )
        .launch(RootApp);
}

/// Root component that hands the session to the app.
#[component]
fn RootApp() -> Element {
    let Some(context) = CONTEXT.get() else {
        return rsx! {
            div { class: "startup-error", "Dashboard session was not initialized." }
        };
    };
    use_context_provider(|| context.clone());

    use_drop(|| tracing::info!("dashboard window closed"));

    rsx! {
        app::App {}
    }
}
