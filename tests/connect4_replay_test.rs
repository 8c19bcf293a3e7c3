//! Replay and reconstruction properties of the connect-four engine.

use strictly_arena::{FirstOpenProvider, GameSession, MoveProvider, SimpleProvider};
use strictly_connect4::{
    Board, Cell, Column, GameMode, GameSnapshot, GameStatus, Move, Outcome, ParticipantLabels,
    Player, detect_outcome, reconstruct, replay,
};

fn col(number: u8) -> Column {
    Column::from_number(number).unwrap()
}

fn alternating(columns: &[u8]) -> Vec<Move> {
    columns
        .iter()
        .enumerate()
        .map(|(i, &n)| Move::new(if i % 2 == 0 { Player::A } else { Player::B }, col(n)))
        .collect()
}

fn snapshot(moves: Vec<Move>, status: GameStatus) -> GameSnapshot {
    GameSnapshot {
        game_id: "replay".to_string(),
        moves,
        status,
        mode: GameMode::AutoVsAuto,
        participant_labels: ParticipantLabels::default(),
        first_mover: Player::A,
    }
}

#[test]
fn test_first_move_in_column_seven_lands_bottom_right() {
    let view = reconstruct(&snapshot(
        vec![Move::new(Player::A, col(7))],
        GameStatus::InProgress,
    ));
    assert_eq!(view.board.get(5, 6), Some(Cell::Occupied(Player::A)));
    assert_eq!(view.board.token_count(), 1);
}

#[test]
fn test_vertical_win_in_column_four() {
    let moves = alternating(&[4, 5, 4, 5, 4, 5, 4]);
    let view = reconstruct(&snapshot(moves, GameStatus::PlayerAWon));

    for row in 2..=5 {
        assert_eq!(view.board.get(row, 3), Some(Cell::Occupied(Player::A)));
    }
    assert_eq!(view.board.get(1, 3), Some(Cell::Empty));
    assert_eq!(view.detected_outcome(), Some(Outcome::Winner(Player::A)));
    assert!(view.is_consistent());
    assert!(view.is_terminal());
}

#[test]
fn test_reconstruction_is_idempotent() {
    let log = snapshot(alternating(&[4, 4, 3, 5, 2, 6, 1]), GameStatus::PlayerAWon);
    let first = reconstruct(&log);
    let second = reconstruct(&log);
    assert_eq!(first, second);
}

#[test]
fn test_prefix_then_suffix_equals_whole_log() {
    let moves = alternating(&[4, 3, 4, 3, 5, 2, 6, 6, 1, 7, 7, 2]);
    let whole = replay(Board::new(), &moves).board;

    for split in 0..=moves.len() {
        let (prefix, suffix) = moves.split_at(split);
        let partial = replay(Board::new(), prefix).board;
        assert_eq!(replay(partial, suffix).board, whole, "split at {}", split);
    }
}

#[test]
fn test_overfull_column_is_skipped_and_replay_continues() {
    let moves = alternating(&[1, 1, 1, 1, 1, 1, 1, 2]);
    let result = replay(Board::new(), &moves);
    assert_eq!(result.skipped, vec![6]);
    assert_eq!(result.applied, 7);
    assert_eq!(result.board.get(5, 1), Some(Cell::Occupied(Player::B)));
}

#[test]
fn test_detector_agrees_with_server_status_on_every_prefix() {
    for provider in [
        &SimpleProvider as &dyn MoveProvider,
        &FirstOpenProvider,
    ] {
        let mut game = GameSession::new(
            "consistency".to_string(),
            GameMode::AutoVsAuto,
            ParticipantLabels::default(),
            Player::A,
        );
        let made = game.play_automated(provider).unwrap();
        let full = game.snapshot();
        assert_eq!(made, full.moves.len());
        assert!(full.status.is_terminal());

        for n in 0..=full.moves.len() {
            let view = reconstruct(&full.prefix(n));
            assert!(view.is_consistent(), "{} at {} moves", provider.name(), n);
            assert!(view.skipped.is_empty());
        }
        assert_eq!(
            detect_outcome(&reconstruct(&full).board).map(Outcome::status),
            Some(full.status)
        );
    }
}

#[test]
fn test_first_mover_only_matters_for_empty_log() {
    let mut empty = snapshot(Vec::new(), GameStatus::InProgress);
    empty.first_mover = Player::B;
    assert_eq!(reconstruct(&empty).current_player, Player::B);

    let mut one = snapshot(vec![Move::new(Player::B, col(2))], GameStatus::InProgress);
    assert_eq!(reconstruct(&one).current_player, Player::A);
    one.first_mover = Player::B;
    assert_eq!(reconstruct(&one).current_player, Player::A);
}
