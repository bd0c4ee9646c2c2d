// src/gpu/opencl/mod.rs - OpenCL compute backend
// Tree location: ./src/gpu/opencl/mod.rs

//! OpenCL backend for the Equihash list-generation pipeline
//!
//! Thin mapping of [`ComputeBackend`] onto the `ocl` crate. `ocl` handles are
//! reference counted and released on drop, so the `release_*` calls consume
//! the handle and let it go out of scope.
//!
//! # Version History
//! - 0.1.0: Platform/device enumeration, program build with build log capture
//! - 0.1.1: Scalar hash-state kernel argument, optional local work size

pub mod platform;

pub use platform::{list_platforms, PlatformCapabilities};

use std::ffi::CString;

use ocl::enums::{ArgVal, ProgramBuildInfo, ProgramBuildInfoResult};
use ocl::flags::CommandQueueProperties;
use ocl::{Context, Device, Kernel, Platform, Program, Queue};

use super::backend::ComputeBackend;
use super::device::DeviceCapabilities;
use crate::equihash::HashState;
use crate::{EquigpuError, Result};

/// OpenCL implementation of [`ComputeBackend`]
#[derive(Debug, Clone)]
pub struct OpenClBackend {
    profiling: bool,
}

impl Default for OpenClBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenClBackend {
    /// Create backend; queue profiling follows the `profile` feature
    pub fn new() -> Self {
        Self {
            profiling: cfg!(feature = "profile"),
        }
    }

    /// Check OpenCL platform availability
    pub fn available() -> bool {
        !platform::enumerate_platforms().is_empty()
    }
}

impl ComputeBackend for OpenClBackend {
    type Platform = Platform;
    type Device = Device;
    type Context = Context;
    type Queue = Queue;
    type Program = Program;
    type Kernel = Kernel;

    fn name(&self) -> &'static str {
        "OpenCL"
    }

    fn platforms(&self) -> Result<Vec<Platform>> {
        Ok(platform::enumerate_platforms())
    }

    fn gpu_devices(&self, platform: &Platform) -> Result<Vec<Device>> {
        Ok(platform::list_gpus(platform))
    }

    fn describe_device(&self, device: &Device) -> Result<DeviceCapabilities> {
        platform::describe_device(device)
    }

    fn create_context(&self, platform: &Platform, device: &Device) -> Result<Context> {
        Context::builder()
            .platform(*platform)
            .devices(*device)
            .build()
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to create context: {}", e)))
    }

    fn create_queue(&self, context: &Context, device: &Device) -> Result<Queue> {
        let queue_properties = if self.profiling {
            Some(CommandQueueProperties::PROFILING_ENABLE)
        } else {
            None
        };

        Queue::new(context, *device, queue_properties)
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to create queue: {}", e)))
    }

    fn build_program(&self, context: &Context, device: &Device, source: &str, options: &str) -> Result<Program> {
        let src = CString::new(source).map_err(|e| EquigpuError::Build {
            status: "invalid source".to_string(),
            log: format!("kernel source contains a NUL byte: {}", e),
        })?;
        let opts = CString::new(options)
            .map_err(|e| EquigpuError::Config(format!("build options contain a NUL byte: {}", e)))?;

        let core_program = ocl::core::create_program_with_source(context, &[src])
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to create program: {}", e)))?;
        let program = Program::from(core_program);

        // Build through the core API so the status and log survive a failure
        if let Err(build_err) = ocl::core::build_program(program.as_core(), Some(&[*device][..]), &opts, None, None) {
            let status = match program.build_info(*device, ProgramBuildInfo::BuildStatus) {
                Ok(info) => info.to_string(),
                Err(e) => format!("unavailable ({})", e),
            };
            let log = match program.build_info(*device, ProgramBuildInfo::BuildLog) {
                Ok(ProgramBuildInfoResult::BuildLog(log)) => log,
                Ok(other) => other.to_string(),
                Err(_) => build_err.to_string(),
            };
            return Err(EquigpuError::Build { status, log });
        }

        Ok(program)
    }

    fn create_kernel(&self, program: &Program, name: &str) -> Result<Kernel> {
        Kernel::builder()
            .program(program)
            .name(name)
            .arg(HashState::default())
            .build()
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to create kernel '{}': {}", name, e)))
    }

    fn bind_hash_state(&self, kernel: &mut Kernel, state: HashState) -> Result<()> {
        // ArgVal::scalar copies the blob into the kernel argument immediately
        unsafe { kernel.set_arg_unchecked(0, ArgVal::scalar(&state))? };
        Ok(())
    }

    fn enqueue_kernel(
        &self,
        queue: &Queue,
        kernel: &Kernel,
        global_work_size: usize,
        local_work_size: Option<usize>,
    ) -> Result<()> {
        let cmd = kernel.cmd().queue(queue).global_work_size(global_work_size);
        let cmd = match local_work_size {
            Some(local) => cmd.local_work_size(local),
            None => cmd,
        };

        unsafe { cmd.enq() }
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to enqueue kernel: {}", e)))
    }

    fn finish(&self, queue: &Queue) -> Result<()> {
        queue
            .finish()
            .map_err(|e| EquigpuError::OpenCL(format!("Failed to finish queue: {}", e)))
    }

    fn release_kernel(&self, kernel: Kernel) {
        tracing::debug!("Releasing kernel");
        drop(kernel);
    }

    fn release_program(&self, program: Program) {
        tracing::debug!("Releasing program");
        drop(program);
    }

    fn release_queue(&self, queue: Queue) {
        tracing::debug!("Releasing command queue");
        drop(queue);
    }

    fn release_context(&self, context: Context) {
        tracing::debug!("Releasing context");
        drop(context);
    }
}
