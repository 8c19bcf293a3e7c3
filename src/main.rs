//! Strictly Arena - Unified CLI

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use strictly_arena::{
    AppState, ArenaConfig, AutoplayEvent, AutoplayExit, AutoplayOrchestrator, GameApi,
    HttpGameClient, MoveSubmitter, create_app, render, shutdown_signal, status_line,
};
use strictly_connect4::{Column, GameMode, ParticipantLabels, Player, reconstruct};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let config = ArenaConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve {
            port,
            host,
            db_path,
        } => run_server(config.with_server(host, port, db_path)).await,
        Command::Start {
            mode,
            player_a,
            player_b,
            server_url,
        } => run_start(config.with_base_url(server_url), mode, player_a, player_b).await,
        Command::Watch { game, server_url } => {
            run_watch(config.with_base_url(server_url), game).await
        }
        Command::Play { game, server_url } => run_play(config.with_base_url(server_url), game).await,
    }
}

/// Logs go to stderr so boards printed on stdout stay readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_arena=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the HTTP game server
#[instrument(skip(config))]
async fn run_server(config: ArenaConfig) -> Result<()> {
    let state = Arc::new(
        AppState::from_config(&config)
            .with_context(|| format!("Failed to open {}", config.server().db_path()))?,
    );
    let app = create_app(state);

    let host = config.server().host().clone();
    let port = *config.server().port();
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    info!(
        %host,
        port,
        db_path = %config.server().db_path(),
        first_mover = ?config.first_mover(),
        "Server ready"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Start a game and print its id
async fn run_start(
    config: ArenaConfig,
    mode: GameMode,
    player_a: Option<String>,
    player_b: Option<String>,
) -> Result<()> {
    let defaults = config.labels();
    let labels = ParticipantLabels::new(
        player_a.unwrap_or_else(|| defaults.player_a.clone()),
        player_b.unwrap_or_else(|| defaults.player_b.clone()),
    );
    let client = HttpGameClient::new(config.client().base_url().clone());
    let game_id = client.start_game(mode, &labels).await?;
    println!("{}", game_id);
    Ok(())
}

/// Watch an automated game until it ends or Ctrl+C
#[instrument(skip(config))]
async fn run_watch(config: ArenaConfig, game: String) -> Result<()> {
    let client = Arc::new(HttpGameClient::new(config.client().base_url().clone()));
    let labels = client.fetch_state(&game).await?.participant_labels;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let orchestrator = Arc::new(AutoplayOrchestrator::new(
        client,
        game,
        config.autoplay().timing(),
        event_tx,
    ));
    let handle = orchestrator.handle();
    let task = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move { orchestrator.run().await }
    });
    drop(orchestrator);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(AutoplayEvent::ViewChanged(view)) => println!("{}\n", render(&view, &labels)),
                Some(AutoplayEvent::Thinking) => {}
                Some(AutoplayEvent::Error(message)) => eprintln!("Error: {}", message),
                Some(AutoplayEvent::Finished(status)) => info!(?status, "Game finished"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                handle.dispose();
                break;
            }
        }
    }

    match task.await?? {
        AutoplayExit::Finished(status) => info!(?status, "Autoplay complete"),
        AutoplayExit::Disposed => info!("Autoplay stopped"),
    }
    Ok(())
}

/// Play the human side of a game from stdin
#[instrument(skip(config))]
async fn run_play(config: ArenaConfig, game: String) -> Result<()> {
    let client = Arc::new(HttpGameClient::new(config.client().base_url().clone()));
    let snapshot = client.fetch_state(&game).await?;
    let labels = snapshot.participant_labels.clone();
    let mut view = reconstruct(&snapshot);

    let submitter = MoveSubmitter::new(client, game, Player::A);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render(&view, &labels));
    while !view.is_terminal() {
        println!("Column (1-7)?");
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let column = match line.trim().parse::<u8>().map(Column::from_number) {
            Ok(Ok(column)) => column,
            Ok(Err(e)) => {
                println!("{}", e);
                continue;
            }
            Err(_) => {
                println!("Enter a column number from 1 to 7");
                continue;
            }
        };

        let pending = match submitter.submit(&view, column) {
            Ok(pending) => pending,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        println!("{}\n", pending.optimistic_view().board.display());

        let settled = pending.reconcile().await;
        if let Some(error) = settled.error() {
            warn!(error = %error, "Move not accepted");
            println!("Move failed: {}", error);
        }
        view = settled.view().clone();
        println!("{}", render(&view, &labels));
    }

    println!("{}", status_line(&view, &labels));
    Ok(())
}
