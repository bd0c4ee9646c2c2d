// src/solver/mod.rs - Solver facade
// Tree location: ./src/solver/mod.rs

//! Solver facade
//!
//! [`GpuSolver::run`] is the entry point used by the mining harness. It
//! validates the (n, k) pair and dispatches to the parameter-specific engine.
//! The harness supplies two callbacks:
//! - `valid_block`: full validation of a candidate solution (minimal encoding)
//! - `cancelled`: polled with a [`SolverStage`] after each device stage
//!
//! Cancellation is reported as [`SolveOutcome::Cancelled`], never as an error,
//! so callers can tell a deliberate abort from a failure.

pub mod list_gen;

pub use list_gen::{ListGenEngine, LIST_GEN_KERNEL};

use std::fmt;

use crate::config::SolverConfig;
use crate::equihash::{EquihashParams, HashState};
use crate::gpu::{ComputeBackend, OpenClBackend};
use crate::{EquigpuError, Result};

/// Pipeline stage passed to the cancellation predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SolverStage {
    /// List generation just finished on the GPU
    ListGenerationGpu,
}

impl fmt::Display for SolverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStage::ListGenerationGpu => write!(f, "list generation on GPU"),
        }
    }
}

/// Result of one solve attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A candidate passed `valid_block`
    Solved,
    /// Attempt completed without a verified solution
    NoSolution,
    /// The caller aborted after the given stage
    Cancelled(SolverStage),
}

impl SolveOutcome {
    /// Boolean form of the outcome: true only when a solution was verified
    pub fn found(&self) -> bool {
        matches!(self, SolveOutcome::Solved)
    }

    /// Whether the attempt was aborted by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SolveOutcome::Cancelled(_))
    }
}

/// GPU Equihash solver
pub struct GpuSolver<B: ComputeBackend = OpenClBackend> {
    backend: B,
    config: SolverConfig,
}

impl GpuSolver<OpenClBackend> {
    /// Create solver on the OpenCL backend with default configuration
    pub fn new() -> Self {
        Self {
            backend: OpenClBackend::new(),
            config: SolverConfig::default(),
        }
    }

    /// Create solver on the OpenCL backend with custom configuration
    pub fn with_config(config: SolverConfig) -> Result<Self> {
        Self::with_backend(OpenClBackend::new(), config)
    }
}

impl Default for GpuSolver<OpenClBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ComputeBackend> GpuSolver<B> {
    /// Create solver on any backend
    pub fn with_backend(backend: B, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Solve one attempt for the given parameters.
    ///
    /// Fails with [`EquigpuError::UnsupportedParameters`] for anything but
    /// (200, 9), before touching the device.
    pub fn run<V, C>(
        &self,
        n: u32,
        k: u32,
        base_state: &HashState,
        valid_block: V,
        cancelled: C,
    ) -> Result<SolveOutcome>
    where
        V: FnMut(&[u8]) -> bool,
        C: FnMut(SolverStage) -> bool,
    {
        let params = EquihashParams::new(n, k)?;

        match (params.n(), params.k()) {
            (200, 9) => ListGenEngine::new(&self.backend, &self.config).solve_200_9(base_state, valid_block, cancelled),
            _ => Err(EquigpuError::UnsupportedParameters { n, k }),
        }
    }

    /// Backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Active configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}
