// src/solver/list_gen.rs - Equihash(200, 9) list generation on the GPU
// Tree location: ./src/solver/list_gen.rs

//! List-generation engine for Equihash(200, 9)
//!
//! One attempt opens a [`DeviceSession`], compiles the `list_gen` kernel from
//! source, binds the prepared BLAKE2b state by value and runs one lane per
//! initial list entry. The caller is polled once for cancellation after the
//! queue drains.
//!
//! # Version History
//! - 0.1.0: Round 0 list generation, cancellation poll after sync

use std::time::Instant;

use super::{SolveOutcome, SolverStage};
use crate::config::SolverConfig;
use crate::equihash::{EquihashParams, HashState};
use crate::gpu::{ComputeBackend, DeviceSession};
use crate::Result;

/// Kernel entry point in the list-generation source
pub const LIST_GEN_KERNEL: &str = "list_gen";

/// Per-attempt driver for the (200, 9) pipeline
pub struct ListGenEngine<'a, B: ComputeBackend> {
    backend: &'a B,
    config: &'a SolverConfig,
}

impl<'a, B: ComputeBackend> ListGenEngine<'a, B> {
    /// Create engine over a backend and configuration
    pub fn new(backend: &'a B, config: &'a SolverConfig) -> Self {
        Self { backend, config }
    }

    /// Run one attempt.
    ///
    /// Device handles are released on every return path, including errors
    /// and cancellation, when the session goes out of scope.
    pub fn solve_200_9<V, C>(&self, base_state: &HashState, _valid_block: V, mut cancelled: C) -> Result<SolveOutcome>
    where
        V: FnMut(&[u8]) -> bool,
        C: FnMut(SolverStage) -> bool,
    {
        let params = EquihashParams::N200_K9;
        let init_size = params.init_size() as usize;
        let start = Instant::now();

        base_state.validate(params)?;
        tracing::info!("⚡ {} attempt: init_size={} lanes", params, init_size);

        let mut session = DeviceSession::open(self.backend, &self.config.device_selection)?;

        let source = session.load_source(&self.config.kernel_path)?;
        session.build(&source, &self.config.build_options)?;

        // The kernel gets its own copy; later changes to base_state are not seen
        session.prepare_kernel(LIST_GEN_KERNEL, *base_state)?;

        session.dispatch(init_size, self.config.local_work_size)?;
        session.synchronize()?;

        tracing::debug!("📊 List generation finished in {}ms", start.elapsed().as_millis());

        if cancelled(SolverStage::ListGenerationGpu) {
            tracing::info!("🛑 Attempt cancelled after {}", SolverStage::ListGenerationGpu);
            session.cancel();
            return Ok(SolveOutcome::Cancelled(SolverStage::ListGenerationGpu));
        }

        // TODO: collision rounds 1..k and candidate checks through valid_block
        session.complete();
        Ok(SolveOutcome::NoSolution)
    }
}
