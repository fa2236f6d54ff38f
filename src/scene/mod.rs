//! Scene state

mod camera;

pub use camera::*;
