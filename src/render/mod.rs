//! Materialization of dirty parameter cells into render targets.

pub mod backend;
pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod mesh;
