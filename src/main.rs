//! Binary entrypoint: a headless gallery driven from the terminal.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use artwork_gallery::catalog::{ItunesClient, MediaCategory, SearchQuery};
use artwork_gallery::config::Configuration;
use artwork_gallery::console::{ConsoleCommand, HELP};
use artwork_gallery::events::{GalleryCommand, GallerySnapshot};
use artwork_gallery::frontend::TracingFrontend;
use artwork_gallery::surface::DisplaySurface;
use artwork_gallery::tasks::gallery;

#[derive(Debug, Parser)]
#[command(
    name = "artwork-gallery",
    version,
    about = "Rotating artwork grid fed by the iTunes Search API"
)]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initial search term
    #[arg(long, value_name = "TEXT")]
    term: Option<String>,

    /// Initial media category
    #[arg(long, value_name = "CATEGORY")]
    media: Option<MediaCategory>,

    /// Run the initial search immediately
    #[arg(long)]
    autoload: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("artwork_gallery={level}").parse()?)
        .add_directive("reqwest=warn".parse()?);
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    }
    .validated()
    .context("invalid configuration values")?;
    tracing::debug!("configuration:\n{cfg:#?}");
    info!("Images provided by iTunes Search API.");

    // The search inputs: what a text field and a media selector would hold.
    let mut query = cfg.default_query.clone();
    if let Some(term) = cli.term {
        query.term = term;
    }
    if let Some(media) = cli.media {
        query.media = media;
    }

    let (command_tx, command_rx) = mpsc::channel::<GalleryCommand>(16);
    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    // Detached so a pending read never holds up runtime shutdown; EOF ends the session.
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("stdin read failed: {err}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn stdin reader")?;

    let gallery_task = tokio::spawn({
        let catalog = Arc::new(ItunesClient::new(cfg.request_timeout));
        let cancel = cancel.clone();
        gallery::run(cfg, catalog, TracingFrontend::default(), command_rx, cancel)
    });

    if cli.autoload {
        command_tx
            .send(GalleryCommand::Load(query.clone()))
            .await
            .context("gallery stopped before the first search")?;
    }
    println!("{HELP}");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            maybe_line = line_rx.recv() => {
                let Some(line) = maybe_line else {
                    info!("stdin closed; initiating shutdown");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(cmd) => {
                        if !dispatch(cmd, &mut query, &command_tx).await {
                            warn!("gallery loop is gone");
                            break;
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    cancel.cancel();
    match gallery_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("gallery error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }
    Ok(())
}

/// Returns `false` once the gallery loop no longer accepts commands.
async fn dispatch(
    cmd: ConsoleCommand,
    query: &mut SearchQuery,
    gallery: &mpsc::Sender<GalleryCommand>,
) -> bool {
    let command = match cmd {
        ConsoleCommand::Term(term) => {
            query.term = term;
            println!("term: {}", query.term);
            return true;
        }
        ConsoleCommand::Media(media) => {
            query.media = media;
            println!("media: {media}");
            return true;
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            return true;
        }
        ConsoleCommand::Get => GalleryCommand::Load(query.clone()),
        ConsoleCommand::Play => GalleryCommand::TogglePlay,
        ConsoleCommand::Pause => GalleryCommand::Pause,
        ConsoleCommand::Show => {
            let (tx, rx) = oneshot::channel();
            if gallery.send(GalleryCommand::Snapshot(tx)).await.is_err() {
                return false;
            }
            return match rx.await {
                Ok(snapshot) => {
                    print_snapshot(&snapshot);
                    true
                }
                Err(_) => false,
            };
        }
        ConsoleCommand::Quit => return true,
    };
    gallery.send(command).await.is_ok()
}

fn print_snapshot(snapshot: &GallerySnapshot) {
    println!(
        "# state: {:?}  progress: {:.0}%  play: {}  buffer: {}",
        snapshot.state,
        snapshot.progress * 100.0,
        snapshot.controls.play_label,
        snapshot.buffer.len()
    );
    println!("# {}", snapshot.status);
    for (slot, image) in snapshot.slots.iter().enumerate() {
        let pos = DisplaySurface::position(slot);
        if pos.col == 0 {
            println!("row {}:", pos.row);
        }
        println!("  [{:>2}] {}", pos.col, image);
    }
}
