//! embed-host: host page simulator for the inline scheduling embed.
//!
//! Drives embed instances the way a host page would, without a browser.
//!
//! # Usage
//!
//! ```text
//! embed-host resolve --url <URL> [OPTIONS]
//!     Print the frame URL a configuration resolves to, or the notice shown
//!     instead when it is unusable.
//!
//! embed-host run [--config <PATH>] [--host-name <HOST>]
//!     Mount the widgets listed in the config, then read JSON-line commands
//!     on stdin until EOF.  Events dispatched by the widgets and requested
//!     render snapshots are printed to stdout as JSON lines; logs go to
//!     stderr.
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Default           | Description                    |
//! |---------------------|-------------------|--------------------------------|
//! | `EMBED_HOST_CONFIG` | `embed-host.toml` | Host configuration file        |
//! | `EMBED_HOST_NAME`   | `localhost`       | Embedding page's host name     |
//! | `RUST_LOG`          | config log level  | `tracing` filter               |
//!
//! # Architecture overview
//!
//! ```text
//! stdin ──► reader thread ─► HostEvent queue ──► HostPage::run ──► widgets
//!                                 ▲                                  │
//!                    settle timers┘           DispatchedEvent queue ◄┘
//!                                                      │
//!                                              printer task ──► stdout
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use embed_core::{resolve, EmbedContext, WidgetAttributes};
use embed_widget::application::render;
use embed_widget::domain::RenderedStructure;
use embed_widget::infrastructure::{
    load_config, DispatchedEvent, HostCommand, HostEvent, HostHandle, HostPage,
    TokioSettleScheduler,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Host page simulator for the inline scheduling embed.
#[derive(Debug, Parser)]
#[command(name = "embed-host", about = "Host page simulator for the inline scheduling embed", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one widget configuration to its frame URL.
    Resolve(ResolveArgs),
    /// Run a host page driven by JSON-line commands on stdin.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Scheduling page URL (the `url` attribute).
    #[arg(long)]
    url: Option<String>,

    /// Minimum height in pixels (the `height` attribute).
    #[arg(long)]
    height: Option<String>,

    /// Hide the event details panel.
    #[arg(long)]
    hide_details: bool,

    /// Hide the cookie consent banner.
    #[arg(long)]
    hide_gdpr: bool,

    #[arg(long)]
    background_color: Option<String>,

    #[arg(long)]
    text_color: Option<String>,

    #[arg(long)]
    primary_color: Option<String>,

    /// Host name reported as the embedding domain.
    #[arg(long, default_value = "localhost", env = "EMBED_HOST_NAME")]
    host_name: String,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the TOML host configuration.  A missing file means defaults.
    #[arg(long, default_value = "embed-host.toml", env = "EMBED_HOST_CONFIG")]
    config: PathBuf,

    /// Overrides `[host] host_name` from the config file.
    #[arg(long, env = "EMBED_HOST_NAME")]
    host_name: Option<String>,
}

impl ResolveArgs {
    /// The attribute map a component with these flags would carry.
    fn to_attributes(&self) -> WidgetAttributes {
        let mut attributes = WidgetAttributes::new();
        attributes.set("url", self.url.as_deref());
        attributes.set("height", self.height.as_deref());
        attributes.set("hide-details", self.hide_details.then_some("true"));
        attributes.set("hide-gdpr", self.hide_gdpr.then_some("true"));
        attributes.set("background-color", self.background_color.as_deref());
        attributes.set("text-color", self.text_color.as_deref());
        attributes.set("primary-color", self.primary_color.as_deref());
        attributes
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Resolve(args) => {
            init_logging("warn");
            Ok(run_resolve(&args))
        }
        Command::Run(args) => {
            run_host(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Installs the stderr log subscriber.  `RUST_LOG` wins over `fallback`.
fn init_logging(fallback: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn run_resolve(args: &ResolveArgs) -> ExitCode {
    let configuration = args.to_attributes().to_configuration();
    let resolution = resolve(&configuration, &EmbedContext::new(args.host_name.clone()));
    match (&resolution, render(&resolution, configuration.min_height)) {
        (Ok(request), _) => {
            println!("{request}");
            ExitCode::SUCCESS
        }
        (Err(_), RenderedStructure::Notice { message }) => {
            println!("{message}");
            ExitCode::from(2)
        }
        (Err(error), RenderedStructure::Embed(_)) => {
            println!("{error}");
            ExitCode::from(2)
        }
    }
}

async fn run_host(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("failed to load host config from {}", args.config.display()))?;
    if let Some(host_name) = args.host_name {
        config.host.host_name = host_name;
    }
    init_logging(&config.host.log_level);
    info!(host = %config.host.host_name, widgets = config.widgets.len(), "embed host starting");

    let (events_tx, events_rx) = mpsc::unbounded_channel::<HostEvent>();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<DispatchedEvent>();

    let scheduler = Arc::new(TokioSettleScheduler::new(events_tx.clone()));
    let mut page = HostPage::new(config.widget_settings(), scheduler, outbound_tx);
    for widget in config.widgets {
        page.mount(&widget.name, widget.attributes)
            .with_context(|| format!("failed to mount configured widget {:?}", widget.name))?;
    }

    let handle = HostHandle::new(events_tx);

    // ── Printer: dispatched events → stdout ───────────────────────────────────
    let printer = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("failed to encode dispatched event: {e}"),
            }
        }
    });

    // ── Ctrl+C → shutdown ─────────────────────────────────────────────────────
    let interrupt = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                let _ = interrupt.send(HostEvent::Shutdown);
            }
            Err(e) => error!("failed to listen for Ctrl+C: {e}"),
        }
    });

    // ── Reader: stdin commands → host events ──────────────────────────────────
    //
    // A pending tokio stdin read cannot be cancelled and would hold up runtime
    // shutdown after Ctrl+C.  A detached OS thread is simply abandoned when
    // `main` returns.
    std::thread::spawn(move || {
        read_commands(std::io::stdin().lock(), &mut std::io::stdout(), &handle);
    });

    page.run(events_rx).await;

    // The page and every dispatcher are gone, so the printer drains and ends.
    printer.await.context("printer task failed")?;
    info!("embed host stopped");
    Ok(())
}

/// Feeds command lines from `input` to the host until EOF, then requests
/// shutdown.  Render snapshots are written to `output` as JSON lines.
///
/// Blocks; run it on a dedicated thread, never on the runtime.
fn read_commands<R: BufRead, W: Write>(input: R, output: &mut W, handle: &HostHandle) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("failed to read stdin: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match HostCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("ignoring malformed command: {e}");
                continue;
            }
        };

        let (event, reply) = command.into_event();
        if handle.send(event).is_err() {
            return;
        }
        if let Some(reply) = reply {
            match reply.blocking_recv() {
                Ok(Some(snapshot)) => write_json_line(output, &snapshot),
                Ok(None) => warn!("render requested for a widget that is not mounted"),
                Err(_) => return,
            }
        }
    }
    let _ = handle.send(HostEvent::Shutdown);
}

fn write_json_line<W: Write, T: serde::Serialize>(output: &mut W, value: &T) {
    let written = serde_json::to_string(value)
        .map_err(std::io::Error::from)
        .and_then(|json| writeln!(output, "{json}"))
        .and_then(|()| output.flush());
    if let Err(e) = written {
        warn!("failed to write output line: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
