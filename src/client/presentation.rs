//! Text rendering of views for the terminal.

use strictly_connect4::{GameStatus, ParticipantLabels, ReconstructedView};

/// One-line status: whose turn, who won, or draw.
pub fn status_line(view: &ReconstructedView, labels: &ParticipantLabels) -> String {
    match view.status {
        GameStatus::InProgress => format!("Current turn: {}", labels.label(view.current_player)),
        GameStatus::Draw => "It's a draw!".to_string(),
        GameStatus::PlayerAWon | GameStatus::PlayerBWon => match view.status.winner() {
            Some(winner) => format!("Winner: {}!", labels.label(winner)),
            None => "Game over".to_string(),
        },
    }
}

/// Board grid followed by the status line.
pub fn render(view: &ReconstructedView, labels: &ParticipantLabels) -> String {
    format!("{}{}", view.board.display(), status_line(view, labels))
}
