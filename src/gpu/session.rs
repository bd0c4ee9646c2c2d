// src/gpu/session.rs - Scoped per-attempt device session
// Tree location: ./src/gpu/session.rs

//! Device session for one solve attempt
//!
//! A [`DeviceSession`] owns every handle acquired during one attempt:
//! context, queue, program and kernel. Dropping the session releases exactly
//! the handles it holds, in reverse acquisition order, on every exit path
//! (normal return, early `?` return, or cancellation).
//!
//! Sessions are never shared or reused across attempts. Concurrent attempts
//! each open their own session.
//!
//! # State machine
//! `Init → PlatformDiscovered → DeviceSelected → ContextReady → SourceLoaded
//! → Compiled → KernelBound → Dispatched → Synchronized → {CancelledOut, Completed}`.
//! Any failure moves the session to `Failed`.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use super::backend::ComputeBackend;
use super::device::DeviceCapabilities;
use super::select::DeviceSelector;
use crate::equihash::HashState;
use crate::{EquigpuError, Result};

/// Lifecycle state of a device session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing acquired yet
    Init,
    /// At least one platform enumerated
    PlatformDiscovered,
    /// A device was chosen
    DeviceSelected,
    /// Context and queue created
    ContextReady,
    /// Kernel source read
    SourceLoaded,
    /// Program built for the device
    Compiled,
    /// Kernel created and its argument bound
    KernelBound,
    /// Kernel enqueued
    Dispatched,
    /// Queue drained
    Synchronized,
    /// Caller asked to abort after synchronization
    CancelledOut,
    /// Attempt finished normally
    Completed,
    /// A step failed; held handles are released on drop
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Exclusive owner of the device handles of one solve attempt
pub struct DeviceSession<'b, B: ComputeBackend> {
    backend: &'b B,
    device: B::Device,
    capabilities: DeviceCapabilities,
    context: Option<B::Context>,
    queue: Option<B::Queue>,
    program: Option<B::Program>,
    kernel: Option<B::Kernel>,
    state: SessionState,
    kernel_name: Option<String>,
}

impl<'b, B: ComputeBackend> DeviceSession<'b, B> {
    /// Discover platforms, select a device, and create its context and queue
    pub fn open(backend: &'b B, selector: &dyn DeviceSelector) -> Result<Self> {
        let platforms = backend.platforms()?;
        if platforms.is_empty() {
            return Err(EquigpuError::DeviceUnavailable(format!(
                "No {} platforms found. Please install GPU drivers.",
                backend.name()
            )));
        }
        tracing::debug!("🔍 {}: {} platform(s) discovered", SessionState::PlatformDiscovered, platforms.len());

        let mut candidates = Vec::new();
        let mut handles = Vec::new();

        let limit = selector.platform_limit().unwrap_or(platforms.len());
        for (platform_index, platform) in platforms.iter().enumerate().take(limit) {
            let devices = match backend.gpu_devices(platform) {
                Ok(devices) => devices,
                Err(e) => {
                    tracing::warn!("⚠️  Platform {} device listing failed: {}", platform_index, e);
                    continue;
                }
            };

            for (device_index, device) in devices.into_iter().enumerate() {
                match backend.describe_device(&device) {
                    Ok(caps) => {
                        candidates.push(DeviceCapabilities {
                            platform_index,
                            device_index,
                            ..caps
                        });
                        handles.push((platform.clone(), device));
                    }
                    Err(e) => {
                        tracing::debug!("Device {}:{} analysis failed: {}", platform_index, device_index, e);
                    }
                }
            }
        }

        let chosen = selector.select(&candidates).ok_or_else(|| {
            EquigpuError::DeviceUnavailable(format!(
                "No GPU device found ({} candidates, selection '{}')",
                candidates.len(),
                selector.name()
            ))
        })?;

        let capabilities = candidates.swap_remove(chosen);
        let (platform, device) = handles.swap_remove(chosen);
        tracing::info!("🎯 {}: {}", SessionState::DeviceSelected, capabilities);

        let context = backend.create_context(&platform, &device)?;
        tracing::debug!("Context created on {}", capabilities.name);

        let mut session = Self {
            backend,
            device,
            capabilities,
            context: Some(context),
            queue: None,
            program: None,
            kernel: None,
            state: SessionState::DeviceSelected,
            kernel_name: None,
        };

        let queue = session
            .context
            .as_ref()
            .map(|context| backend.create_queue(context, &session.device))
            .unwrap_or_else(|| Err(missing("context", "queue creation")));
        session.queue = Some(session.track(queue, SessionState::ContextReady)?);

        Ok(session)
    }

    /// Read kernel source text from `path`
    pub fn load_source(&mut self, path: &Path) -> Result<String> {
        let source = std::fs::read_to_string(path).map_err(|source| EquigpuError::SourceLoad {
            path: path.to_path_buf(),
            source,
        });
        let source = self.track(source, SessionState::SourceLoaded)?;
        tracing::debug!("📄 Loaded {} bytes of kernel source from {}", source.len(), path.display());
        Ok(source)
    }

    /// Build the program for the selected device
    pub fn build(&mut self, source: &str, options: &str) -> Result<()> {
        let start = Instant::now();
        let program = match self.context.as_ref() {
            Some(context) => self.backend.build_program(context, &self.device, source, options),
            None => Err(missing("context", "program build")),
        };

        if let Err(EquigpuError::Build { status, log }) = &program {
            tracing::error!("❌ Kernel build failed; status={}, log:\n{}", status, log);
        }

        self.program = Some(self.track(program, SessionState::Compiled)?);
        tracing::info!("✅ Kernel compilation successful in {}ms", start.elapsed().as_millis());
        Ok(())
    }

    /// Extract the named entry point and bind the hash state to it
    pub fn prepare_kernel(&mut self, name: &str, state: HashState) -> Result<()> {
        let kernel = match self.program.as_ref() {
            Some(program) => self.backend.create_kernel(program, name),
            None => Err(missing("program", "kernel creation")),
        };
        let mut kernel = self.track(kernel, SessionState::Compiled)?;

        let bound = self.backend.bind_hash_state(&mut kernel, state);
        // Hand the kernel to the session before propagating so it is released
        self.kernel = Some(kernel);
        self.track(bound, SessionState::KernelBound)?;

        self.kernel_name = Some(name.to_string());
        tracing::debug!("🔧 Kernel '{}' bound", name);
        Ok(())
    }

    /// Enqueue the kernel over a 1-dimensional index space
    pub fn dispatch(&mut self, global_work_size: usize, local_work_size: Option<usize>) -> Result<()> {
        let result = match (self.queue.as_ref(), self.kernel.as_ref()) {
            (Some(queue), Some(kernel)) => {
                self.backend.enqueue_kernel(queue, kernel, global_work_size, local_work_size)
            }
            _ => Err(missing("queue and kernel", "dispatch")),
        };
        self.track(result, SessionState::Dispatched)?;

        tracing::debug!(
            "🚀 Dispatched '{}' over {} lanes",
            self.kernel_name.as_deref().unwrap_or("?"),
            global_work_size
        );
        Ok(())
    }

    /// Block the calling thread until the queue drains
    pub fn synchronize(&mut self) -> Result<()> {
        let result = match self.queue.as_ref() {
            Some(queue) => self.backend.finish(queue),
            None => Err(missing("queue", "synchronization")),
        };
        self.track(result, SessionState::Synchronized)
    }

    /// Mark the attempt as aborted by the caller
    pub fn cancel(&mut self) {
        self.state = SessionState::CancelledOut;
    }

    /// Mark the attempt as finished normally
    pub fn complete(&mut self) {
        self.state = SessionState::Completed;
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Capabilities of the selected device
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Advance to `next` on success, or to `Failed` on error
    fn track<T>(&mut self, result: Result<T>, next: SessionState) -> Result<T> {
        match result {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("Session failed after {}: {}", self.state, e);
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

impl<B: ComputeBackend> Drop for DeviceSession<'_, B> {
    fn drop(&mut self) {
        if let Some(kernel) = self.kernel.take() {
            self.backend.release_kernel(kernel);
        }
        if let Some(program) = self.program.take() {
            self.backend.release_program(program);
        }
        if let Some(queue) = self.queue.take() {
            self.backend.release_queue(queue);
        }
        if let Some(context) = self.context.take() {
            self.backend.release_context(context);
        }

        tracing::debug!("🧹 Device session on {} released ({})", self.capabilities.name, self.state);
    }
}

fn missing(handle: &str, step: &str) -> EquigpuError {
    EquigpuError::Session(format!("{} missing before {}", handle, step))
}
