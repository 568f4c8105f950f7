pub mod app;
pub mod artwork;
pub mod error;
pub mod history;
pub mod player;
pub mod projector;
pub mod queue;
pub mod theme;
pub mod ui;
