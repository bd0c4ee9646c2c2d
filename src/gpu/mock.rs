// src/gpu/mock.rs - In-memory compute backend for tests
// Tree location: ./src/gpu/mock.rs

//! Fake backend that records every call and counts live handles

use std::cell::{Cell, RefCell};

use super::backend::ComputeBackend;
use super::device::{DeviceCapabilities, GpuVendor};
use crate::equihash::HashState;
use crate::{EquigpuError, Result};

/// Calls observed by the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MockEvent {
    CreateContext,
    CreateQueue,
    Build,
    CreateKernel,
    BindArg,
    Dispatch {
        global_work_size: usize,
        local_work_size: Option<usize>,
    },
    Sync,
    ReleaseKernel,
    ReleaseProgram,
    ReleaseQueue,
    ReleaseContext,
}

impl MockEvent {
    pub(crate) fn is_release(&self) -> bool {
        matches!(
            self,
            Self::ReleaseKernel | Self::ReleaseProgram | Self::ReleaseQueue | Self::ReleaseContext
        )
    }
}

/// Opaque owned handle; deliberately not `Clone`
#[derive(Debug)]
pub(crate) struct MockHandle(#[allow(dead_code)] u32);

#[derive(Debug)]
pub(crate) struct MockKernel {
    _handle: MockHandle,
    state: Option<HashState>,
}

pub(crate) struct MockBackend {
    /// GPU count per platform
    platforms: Vec<usize>,
    fail_queue: bool,
    fail_kernel: bool,
    fail_bind: bool,
    fail_dispatch: bool,
    fail_sync: bool,
    build_error: Option<String>,
    events: RefCell<Vec<MockEvent>>,
    dispatched_states: RefCell<Vec<HashState>>,
    next_handle: Cell<u32>,
    described: Cell<usize>,
    live: Cell<i64>,
    acquired: Cell<u32>,
}

impl MockBackend {
    /// One platform with one GPU
    pub(crate) fn new() -> Self {
        Self {
            platforms: vec![1],
            fail_queue: false,
            fail_kernel: false,
            fail_bind: false,
            fail_dispatch: false,
            fail_sync: false,
            build_error: None,
            events: RefCell::new(Vec::new()),
            dispatched_states: RefCell::new(Vec::new()),
            next_handle: Cell::new(1),
            described: Cell::new(0),
            live: Cell::new(0),
            acquired: Cell::new(0),
        }
    }

    pub(crate) fn with_platforms(mut self, gpus_per_platform: Vec<usize>) -> Self {
        self.platforms = gpus_per_platform;
        self
    }

    pub(crate) fn failing_queue(mut self) -> Self {
        self.fail_queue = true;
        self
    }

    pub(crate) fn failing_kernel(mut self) -> Self {
        self.fail_kernel = true;
        self
    }

    pub(crate) fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub(crate) fn failing_dispatch(mut self) -> Self {
        self.fail_dispatch = true;
        self
    }

    pub(crate) fn failing_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    pub(crate) fn failing_build(mut self, log: &str) -> Self {
        self.build_error = Some(log.to_string());
        self
    }

    pub(crate) fn events(&self) -> Vec<MockEvent> {
        self.events.borrow().clone()
    }

    pub(crate) fn count(&self, event: MockEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    /// Handles currently held by callers
    pub(crate) fn live_handles(&self) -> i64 {
        self.live.get()
    }

    /// Handles ever handed out
    pub(crate) fn acquired(&self) -> u32 {
        self.acquired.get()
    }

    /// Devices whose capabilities were queried
    pub(crate) fn described(&self) -> usize {
        self.described.get()
    }

    /// Hash states carried by each dispatch
    pub(crate) fn dispatched_states(&self) -> Vec<HashState> {
        self.dispatched_states.borrow().clone()
    }

    fn record(&self, event: MockEvent) {
        self.events.borrow_mut().push(event);
    }

    fn acquire(&self, event: MockEvent) -> MockHandle {
        self.record(event);
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        self.live.set(self.live.get() + 1);
        self.acquired.set(self.acquired.get() + 1);
        MockHandle(id)
    }

    fn release(&self, event: MockEvent) {
        self.record(event);
        self.live.set(self.live.get() - 1);
    }
}

impl ComputeBackend for MockBackend {
    type Platform = usize;
    type Device = (usize, usize);
    type Context = MockHandle;
    type Queue = MockHandle;
    type Program = MockHandle;
    type Kernel = MockKernel;

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn platforms(&self) -> Result<Vec<usize>> {
        Ok((0..self.platforms.len()).collect())
    }

    fn gpu_devices(&self, platform: &usize) -> Result<Vec<(usize, usize)>> {
        let count = self.platforms.get(*platform).copied().unwrap_or(0);
        Ok((0..count).map(|device| (*platform, device)).collect())
    }

    fn describe_device(&self, device: &(usize, usize)) -> Result<DeviceCapabilities> {
        let (platform, index) = *device;
        self.described.set(self.described.get() + 1);
        Ok(DeviceCapabilities {
            platform_index: 0,
            device_index: 0,
            name: format!("Mock GPU {}-{}", platform, index),
            vendor: GpuVendor::Unknown,
            global_memory: (index as u64 + 1) * 4 * 1024 * 1024 * 1024,
            max_alloc_size: 1024 * 1024 * 1024,
            max_work_group_size: 256,
            compute_units: 16,
            max_clock_freq: 1000,
        })
    }

    fn create_context(&self, _platform: &usize, _device: &(usize, usize)) -> Result<MockHandle> {
        Ok(self.acquire(MockEvent::CreateContext))
    }

    fn create_queue(&self, _context: &MockHandle, _device: &(usize, usize)) -> Result<MockHandle> {
        if self.fail_queue {
            return Err(EquigpuError::OpenCL("Failed to create queue: CL_OUT_OF_RESOURCES".to_string()));
        }
        Ok(self.acquire(MockEvent::CreateQueue))
    }

    fn build_program(
        &self,
        _context: &MockHandle,
        _device: &(usize, usize),
        _source: &str,
        _options: &str,
    ) -> Result<MockHandle> {
        if let Some(log) = &self.build_error {
            self.record(MockEvent::Build);
            return Err(EquigpuError::Build {
                status: "CL_BUILD_ERROR".to_string(),
                log: log.clone(),
            });
        }
        Ok(self.acquire(MockEvent::Build))
    }

    fn create_kernel(&self, _program: &MockHandle, _name: &str) -> Result<MockKernel> {
        if self.fail_kernel {
            return Err(EquigpuError::OpenCL("Failed to create kernel: CL_INVALID_KERNEL_NAME".to_string()));
        }
        Ok(MockKernel {
            _handle: self.acquire(MockEvent::CreateKernel),
            state: None,
        })
    }

    fn bind_hash_state(&self, kernel: &mut MockKernel, state: HashState) -> Result<()> {
        self.record(MockEvent::BindArg);
        if self.fail_bind {
            return Err(EquigpuError::OpenCL("Failed to set kernel argument: CL_INVALID_ARG_SIZE".to_string()));
        }
        kernel.state = Some(state);
        Ok(())
    }

    fn enqueue_kernel(
        &self,
        _queue: &MockHandle,
        kernel: &MockKernel,
        global_work_size: usize,
        local_work_size: Option<usize>,
    ) -> Result<()> {
        self.record(MockEvent::Dispatch {
            global_work_size,
            local_work_size,
        });
        if self.fail_dispatch {
            return Err(EquigpuError::OpenCL("Failed to enqueue kernel: CL_INVALID_WORK_GROUP_SIZE".to_string()));
        }
        if let Some(state) = kernel.state {
            self.dispatched_states.borrow_mut().push(state);
        }
        Ok(())
    }

    fn finish(&self, _queue: &MockHandle) -> Result<()> {
        self.record(MockEvent::Sync);
        if self.fail_sync {
            return Err(EquigpuError::OpenCL("Failed to finish queue: CL_OUT_OF_RESOURCES".to_string()));
        }
        Ok(())
    }

    fn release_kernel(&self, _kernel: MockKernel) {
        self.release(MockEvent::ReleaseKernel);
    }

    fn release_program(&self, _program: MockHandle) {
        self.release(MockEvent::ReleaseProgram);
    }

    fn release_queue(&self, _queue: MockHandle) {
        self.release(MockEvent::ReleaseQueue);
    }

    fn release_context(&self, _context: MockHandle) {
        self.release(MockEvent::ReleaseContext);
    }
}
