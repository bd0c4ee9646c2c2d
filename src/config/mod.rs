// src/config/mod.rs - Configuration module

/// Solver settings
pub mod settings;

pub use settings::{SolverConfig, DEFAULT_KERNEL_PATH};
