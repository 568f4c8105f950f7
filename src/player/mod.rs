pub mod local;
pub mod traits;

pub use local::LocalEngine;
pub use traits::{PlaybackEngine, Song};
