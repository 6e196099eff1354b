pub mod drawing;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod host;
pub mod math;
pub mod sampler;
pub mod tessellation;

#[cfg(test)]
mod testing;

pub use error::{DrawerError, Result};
