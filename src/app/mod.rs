pub mod config;

pub mod cli;
pub mod events;
pub mod inputs;
pub mod logging;
pub mod service;

pub use service::{NowPlayingService, ServiceHandle, Stores};
