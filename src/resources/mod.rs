//! CPU-side resource construction

mod quad;

pub use quad::*;
