// src/lib.rs - Main library file for the equigpu Equihash solver
// Tree location: ./src/lib.rs

//! equigpu - GPU Equihash (200,9) solver
//!
//! Plugs into a mining node as an alternative to a CPU Equihash solver.
//! The caller owns the block header state, the solution validator and the
//! cancellation policy; this crate owns the OpenCL device lifecycle for each
//! solve attempt.
//!
//! # Version History
//! - 0.1.0: Solver facade, OpenCL list generation (round 0), scoped device sessions
//!
//! # Example
//! ```no_run
//! use equigpu::{GpuSolver, HashState, EquihashParams, SolveOutcome};
//!
//! let params = EquihashParams::N200_K9;
//! let mut state = HashState::new(params, &[0u8; 108])?;
//! state.absorb(&[0u8; 32])?;
//!
//! let solver = GpuSolver::new();
//! let outcome = solver.run(200, 9, &state, |_solution| true, |_stage| false)?;
//! assert!(!matches!(outcome, SolveOutcome::Solved));
//! # Ok::<(), equigpu::EquigpuError>(())
//! ```

#![warn(missing_docs)]
// Note: OpenCL dispatch and scalar kernel arguments require unsafe calls
#![allow(unsafe_code)]

/// Solver configuration
pub mod config;
pub mod equihash;
/// Compute backends and device session management
pub mod gpu;
pub mod solver;

// Re-export main types for convenience
pub use config::SolverConfig;
pub use equihash::{EquihashParams, HashState};
pub use gpu::{ComputeBackend, DeviceSelection, DeviceSelector, DeviceSession, OpenClBackend};
pub use solver::{GpuSolver, ListGenEngine, SolveOutcome, SolverStage};

use hex::FromHexError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for equigpu
#[derive(Error, Debug)]
pub enum EquigpuError {
    /// Requested (n, k) pair has no solver
    #[error("Unsupported Equihash parameters: n={n}, k={k}")]
    UnsupportedParameters {
        /// Hash output width in bits
        n: u32,
        /// Number of collision rounds
        k: u32,
    },

    /// No platform or no matching GPU device
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Kernel source file could not be read
    #[error("Failed to load kernel source {}: {source}", .path.display())]
    SourceLoad {
        /// Path that was opened
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Kernel program failed to build for the selected device
    #[error("Kernel build failed (status: {status}):\n{log}")]
    Build {
        /// Build status reported by the device compiler
        status: String,
        /// Full build log
        log: String,
    },

    /// Any other OpenCL call failure
    #[error("OpenCL error: {0}")]
    OpenCL(String),

    /// Device session used out of order
    #[error("Device session error: {0}")]
    Session(String),

    /// Hash state construction errors
    #[error("Invalid hash state: {0}")]
    InvalidState(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO operation errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Hex decode errors
    #[error("Hex decode error: {0}")]
    Hex(#[from] FromHexError),
}

// Implement conversion from OCL errors
impl From<ocl::Error> for EquigpuError {
    fn from(err: ocl::Error) -> Self {
        EquigpuError::OpenCL(format!("OpenCL operation failed: {}", err))
    }
}

/// Result type alias for equigpu operations
pub type Result<T> = std::result::Result<T, EquigpuError>;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Application description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Initialize logging for the harness binary
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("{} v{} - {}", NAME, VERSION, DESCRIPTION);

    Ok(())
}
