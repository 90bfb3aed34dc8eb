#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod progress;
pub mod sequence;

pub use error::Error;
pub use progress::Progress;
