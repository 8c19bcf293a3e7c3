//! SQLite persistence for game sessions and their move logs.

mod error;
mod models;
mod repository;
mod schema;

pub use error::DbError;
pub use models::{GameRow, MoveRow, StoredText};
pub use repository::GameRepository;
