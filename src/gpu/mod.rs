// src/gpu/mod.rs - GPU Module Organization and Public API
// Tree location: ./src/gpu/mod.rs

//! GPU compute module for equigpu
//!
//! A backend-neutral device pipeline ([`ComputeBackend`]), the scoped
//! per-attempt [`DeviceSession`], pluggable device selection, and the
//! OpenCL backend.

/// Compute backend trait
pub mod backend;
/// Device capabilities and vendor detection
pub mod device;
/// OpenCL backend
pub mod opencl;
/// Device selection strategies
pub mod select;
/// Per-attempt device session
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types for easy access
pub use backend::ComputeBackend;
pub use device::{DeviceCapabilities, GpuVendor};
pub use opencl::{OpenClBackend, PlatformCapabilities};
pub use select::{DeviceSelection, DeviceSelector};
pub use session::{DeviceSession, SessionState};

/// Check OpenCL platform availability
pub fn opencl_available() -> bool {
    OpenClBackend::available()
}

/// List all available GPU platforms for diagnostics
pub fn list_gpu_platforms() -> crate::Result<Vec<PlatformCapabilities>> {
    opencl::list_platforms()
}
