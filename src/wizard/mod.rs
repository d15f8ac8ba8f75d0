mod draft;
mod error;
mod input;
mod messages;
mod steps;

pub use draft::*;
pub use error::*;
pub use input::*;
pub use steps::*;
