// src/gpu/opencl/platform.rs - OpenCL platform and device inspection
// Tree location: ./src/gpu/opencl/platform.rs

//! OpenCL platform detection and device capability queries
//!
//! Used by the backend to describe candidate devices for selection and by
//! the `info` command to list everything the ICD loader exposes.
//!
//! # Version History
//! - 0.1.0: Platform listing and device capability extraction

use ocl::enums::{DeviceInfo, DeviceInfoResult};
use ocl::flags::DeviceType;
use ocl::{Device, Platform};

use crate::gpu::device::{DeviceCapabilities, GpuVendor};
use crate::EquigpuError;

/// OpenCL platform summary
#[derive(Debug, Clone)]
pub struct PlatformCapabilities {
    /// Index in enumeration order
    pub index: usize,
    /// Platform name string
    pub name: String,
    /// OpenCL version supported
    pub version: String,
    /// Vendor guessed from the platform name
    pub vendor: GpuVendor,
    /// GPU devices on this platform
    pub devices: Vec<DeviceCapabilities>,
}

/// List every platform and its GPU devices
pub fn list_platforms() -> Result<Vec<PlatformCapabilities>, EquigpuError> {
    let platforms = enumerate_platforms();

    if platforms.is_empty() {
        return Err(EquigpuError::DeviceUnavailable(
            "No OpenCL platforms found. Please install GPU drivers.".to_string(),
        ));
    }

    tracing::info!("🔍 Detecting OpenCL platforms...");

    let mut summaries = Vec::with_capacity(platforms.len());
    for (index, platform) in platforms.iter().enumerate() {
        match analyze_platform(platform, index) {
            Ok(summary) => {
                tracing::info!("✅ Platform {}: {} ({} GPUs)", index, summary.name, summary.devices.len());
                summaries.push(summary);
            }
            Err(e) => {
                tracing::warn!("⚠️  Platform {} detection failed: {}", index, e);
            }
        }
    }

    Ok(summaries)
}

fn analyze_platform(platform: &Platform, index: usize) -> Result<PlatformCapabilities, EquigpuError> {
    let name = platform
        .name()
        .map_err(|e| EquigpuError::OpenCL(format!("Failed to get platform name: {}", e)))?;
    let version = platform
        .version()
        .map_err(|e| EquigpuError::OpenCL(format!("Failed to get platform version: {}", e)))?;

    tracing::debug!("🔧 Analyzing platform: {} ({})", name, version);

    let mut devices = Vec::new();
    for (device_index, device) in list_gpus(platform).iter().enumerate() {
        match describe_device(device) {
            Ok(caps) => devices.push(DeviceCapabilities {
                platform_index: index,
                device_index,
                ..caps
            }),
            Err(e) => tracing::debug!("Device {} analysis failed: {}", device_index, e),
        }
    }

    Ok(PlatformCapabilities {
        index,
        vendor: GpuVendor::detect(&name),
        name,
        version,
        devices,
    })
}

/// Platforms exposed by the ICD loader; a failed query counts as none
pub(crate) fn enumerate_platforms() -> Vec<Platform> {
    match ocl::core::get_platform_ids() {
        Ok(ids) => ids.into_iter().map(Platform::new).collect(),
        Err(e) => {
            tracing::debug!("OpenCL platform query failed: {}", e);
            Vec::new()
        }
    }
}

/// GPU-class devices on a platform; an error listing them counts as none
pub(crate) fn list_gpus(platform: &Platform) -> Vec<Device> {
    match Device::list(platform, Some(DeviceType::GPU)) {
        Ok(devices) => devices,
        Err(e) => {
            tracing::debug!("No GPU devices on platform: {}", e);
            Vec::new()
        }
    }
}

/// Query capabilities of one device
pub(crate) fn describe_device(device: &Device) -> Result<DeviceCapabilities, EquigpuError> {
    let name = device_info_string(device, DeviceInfo::Name)?;
    let vendor_name = device_info_string(device, DeviceInfo::Vendor).unwrap_or_default();
    let global_memory = device_info_u64(device, DeviceInfo::GlobalMemSize)?;
    let max_alloc_size = device_info_u64(device, DeviceInfo::MaxMemAllocSize)?;
    let max_work_group_size = device_info_usize(device, DeviceInfo::MaxWorkGroupSize)?;
    let compute_units = device_info_u32(device, DeviceInfo::MaxComputeUnits)?;
    let max_clock_freq = device_info_u32(device, DeviceInfo::MaxClockFrequency)?;

    let vendor = match GpuVendor::detect(&vendor_name) {
        GpuVendor::Unknown => GpuVendor::detect(&name),
        known => known,
    };

    tracing::debug!(
        "  📱 {} ({:.1}GB VRAM, {} CUs)",
        name,
        global_memory as f64 / (1024.0 * 1024.0 * 1024.0),
        compute_units
    );

    Ok(DeviceCapabilities {
        platform_index: 0,
        device_index: 0,
        name,
        vendor,
        global_memory,
        max_alloc_size,
        max_work_group_size,
        compute_units,
        max_clock_freq,
    })
}

// Helper functions for device info extraction
fn device_info_string(device: &Device, info: DeviceInfo) -> Result<String, EquigpuError> {
    match device.info(info) {
        Ok(DeviceInfoResult::Name(s)) | Ok(DeviceInfoResult::Vendor(s)) => Ok(s),
        _ => Err(EquigpuError::OpenCL(format!("Failed to get device {:?}", info))),
    }
}

fn device_info_u64(device: &Device, info: DeviceInfo) -> Result<u64, EquigpuError> {
    match device.info(info) {
        Ok(DeviceInfoResult::GlobalMemSize(v)) | Ok(DeviceInfoResult::MaxMemAllocSize(v)) => Ok(v),
        _ => Err(EquigpuError::OpenCL(format!("Failed to get device {:?}", info))),
    }
}

fn device_info_usize(device: &Device, info: DeviceInfo) -> Result<usize, EquigpuError> {
    match device.info(info) {
        Ok(DeviceInfoResult::MaxWorkGroupSize(v)) => Ok(v),
        _ => Err(EquigpuError::OpenCL(format!("Failed to get device {:?}", info))),
    }
}

fn device_info_u32(device: &Device, info: DeviceInfo) -> Result<u32, EquigpuError> {
    match device.info(info) {
        Ok(DeviceInfoResult::MaxComputeUnits(v)) | Ok(DeviceInfoResult::MaxClockFrequency(v)) => Ok(v),
        _ => Err(EquigpuError::OpenCL(format!("Failed to get device {:?}", info))),
    }
}
