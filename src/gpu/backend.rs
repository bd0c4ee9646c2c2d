// src/gpu/backend.rs - Heterogeneous compute backend abstraction
// Tree location: ./src/gpu/backend.rs

//! Compute backend trait
//!
//! The solver is a client of this capability set:
//! platform → device → context → queue → program → kernel → bind →
//! dispatch → sync → release. Any backend exposing it is substitutable; the
//! OpenCL implementation lives in [`crate::gpu::opencl`].
//!
//! Handles are plain owned values. A backend must not release anything
//! behind the caller's back: every acquired handle comes back through
//! exactly one `release_*` call, issued by [`crate::gpu::DeviceSession`].

use super::device::DeviceCapabilities;
use crate::equihash::HashState;
use crate::Result;

/// Heterogeneous compute API used by the solver
pub trait ComputeBackend {
    /// Platform handle
    type Platform: Clone;
    /// Device handle
    type Device: Clone;
    /// Context handle
    type Context;
    /// Command queue handle
    type Queue;
    /// Compiled program handle
    type Program;
    /// Executable kernel handle
    type Kernel;

    /// Human-readable backend name for logs
    fn name(&self) -> &'static str;

    /// Enumerate compute platforms (may be empty)
    fn platforms(&self) -> Result<Vec<Self::Platform>>;

    /// Enumerate GPU-class devices on a platform (may be empty)
    fn gpu_devices(&self, platform: &Self::Platform) -> Result<Vec<Self::Device>>;

    /// Query device capabilities. Platform and device indexes are filled in by the caller.
    fn describe_device(&self, device: &Self::Device) -> Result<DeviceCapabilities>;

    /// Create a context bound to one device
    fn create_context(&self, platform: &Self::Platform, device: &Self::Device) -> Result<Self::Context>;

    /// Create a command queue on a context
    fn create_queue(&self, context: &Self::Context, device: &Self::Device) -> Result<Self::Queue>;

    /// Compile kernel source for a device.
    ///
    /// On failure the error carries the build status and the full build log,
    /// and no program handle is left alive.
    fn build_program(
        &self,
        context: &Self::Context,
        device: &Self::Device,
        source: &str,
        options: &str,
    ) -> Result<Self::Program>;

    /// Extract a named entry point from a compiled program
    fn create_kernel(&self, program: &Self::Program, name: &str) -> Result<Self::Kernel>;

    /// Bind the hash state as argument 0, copied by value
    fn bind_hash_state(&self, kernel: &mut Self::Kernel, state: HashState) -> Result<()>;

    /// Enqueue a 1-dimensional dispatch
    fn enqueue_kernel(
        &self,
        queue: &Self::Queue,
        kernel: &Self::Kernel,
        global_work_size: usize,
        local_work_size: Option<usize>,
    ) -> Result<()>;

    /// Block until every command on the queue has completed
    fn finish(&self, queue: &Self::Queue) -> Result<()>;

    /// Release a kernel
    fn release_kernel(&self, kernel: Self::Kernel);

    /// Release a program
    fn release_program(&self, program: Self::Program);

    /// Release a command queue
    fn release_queue(&self, queue: Self::Queue);

    /// Release a context
    fn release_context(&self, context: Self::Context);
}
