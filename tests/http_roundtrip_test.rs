//! End-to-end tests over a loopback HTTP server.

use std::sync::Arc;
use std::time::Duration;
use strictly_arena::{
    AppState, AutoplayEvent, AutoplayExit, AutoplayOrchestrator, AutoplayTiming, ClientError,
    GameApi, HttpGameClient, MoveSubmitter, Reconciliation, SimpleProvider, create_app,
};
use strictly_connect4::{Column, GameMode, ParticipantLabels, Player};
use tokio::sync::mpsc;

async fn spawn_server() -> HttpGameClient {
    let state = Arc::new(AppState::new(
        Arc::new(SimpleProvider),
        Player::A,
        ParticipantLabels::default(),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });
    HttpGameClient::new(format!("http://{}", addr))
}

fn fast_timing() -> AutoplayTiming {
    AutoplayTiming::new(
        Duration::from_millis(1),
        Duration::from_millis(1),
        Duration::from_millis(1),
        3,
    )
}

#[tokio::test]
async fn test_start_returns_fresh_game() {
    let client = spawn_server().await;
    let labels = ParticipantLabels::new("Red", "Yellow");
    let id = client.start_game(GameMode::AutoVsAuto, &labels).await.unwrap();

    let snapshot = client.fetch_state(&id).await.unwrap();
    assert_eq!(snapshot.game_id, id);
    assert!(snapshot.moves.is_empty());
    assert_eq!(snapshot.participant_labels, labels);
}

#[tokio::test]
async fn test_human_move_round_trip() {
    let client = Arc::new(spawn_server().await);
    let id = client
        .start_game(GameMode::HumanVsAuto, &ParticipantLabels::default())
        .await
        .unwrap();

    let submitter = MoveSubmitter::new(Arc::clone(&client), id.clone(), Player::A);
    let view = submitter.load().await.unwrap();
    let settled = submitter
        .play(&view, Column::from_number(4).unwrap())
        .await
        .unwrap();

    let view = match settled {
        Reconciliation::Confirmed(view) => view,
        other => panic!("expected confirmation, got {:?}", other),
    };
    assert_eq!(view.move_count, 2);
    assert_eq!(view.current_player, Player::A);
    assert!(view.is_consistent());
}

#[tokio::test]
async fn test_rejected_move_surfaces_status() {
    let client = spawn_server().await;
    let id = client
        .start_game(GameMode::AutoVsAuto, &ParticipantLabels::default())
        .await
        .unwrap();

    let err = client
        .submit_move(&id, Column::from_number(1).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 409, .. }));

    let err = client.fetch_state("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = HttpGameClient::new("http://127.0.0.1:1");
    let err = client.fetch_state("game-1").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn test_autoplay_plays_to_completion() {
    let client = Arc::new(spawn_server().await);
    let id = client
        .start_game(GameMode::AutoVsAuto, &ParticipantLabels::default())
        .await
        .unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = AutoplayOrchestrator::new(Arc::clone(&client), id.clone(), fast_timing(), tx);
    let exit = orchestrator.run().await.unwrap();

    let snapshot = client.fetch_state(&id).await.unwrap();
    assert!(snapshot.status.is_terminal());
    assert_eq!(exit, AutoplayExit::Finished(snapshot.status));

    let mut counts = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let AutoplayEvent::ViewChanged(view) = event {
            assert!(view.is_consistent());
            counts.push(view.move_count);
        }
    }
    let expected: Vec<usize> = (0..=snapshot.moves.len()).collect();
    assert_eq!(counts, expected);
}
