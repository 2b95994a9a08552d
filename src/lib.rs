pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod range;
pub mod session;
pub mod source;
pub mod ui;
pub mod worker;

// Re-exports for convenience
pub use app::App;
pub use auth::{Account, AccountStore, StaticToken, TokenProvider};
pub use catalog::AnswerVariant;
pub use config::{Config, SourceConfig};
pub use error::SourceError;
pub use models::{AnswerKey, AttemptRecord, Cell, ExerciseRecord, Grid, Screen};
pub use session::{reduce, Effect, Event, Phase, SessionState, Step};
pub use source::{
    AnswerRecorder, Backend, CsvSource, Outcome, OutcomeEcho, SheetsSource, TabularSource,
};
pub use worker::{spawn_io_worker, IoRequest, IoResponse};
