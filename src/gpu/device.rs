// src/gpu/device.rs - Backend-neutral device description
// Tree location: ./src/gpu/device.rs

//! Device capabilities and vendor detection shared by all backends

use std::fmt;

/// GPU vendor identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    /// NVIDIA GPUs
    Nvidia,
    /// AMD GPUs
    Amd,
    /// Intel GPUs
    Intel,
    /// Unknown or other vendors
    Unknown,
}

impl GpuVendor {
    /// Detect vendor from a platform or device vendor string
    pub fn detect(name: &str) -> Self {
        let name_lower = name.to_lowercase();

        if name_lower.contains("nvidia") || name_lower.contains("cuda") {
            GpuVendor::Nvidia
        } else if name_lower.contains("amd")
            || name_lower.contains("advanced micro devices")
            || name_lower.contains("rocm")
        {
            GpuVendor::Amd
        } else if name_lower.contains("intel") {
            GpuVendor::Intel
        } else {
            GpuVendor::Unknown
        }
    }
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuVendor::Nvidia => write!(f, "NVIDIA"),
            GpuVendor::Amd => write!(f, "AMD"),
            GpuVendor::Intel => write!(f, "Intel"),
            GpuVendor::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Individual device capabilities, as seen by device selection
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Index of the owning platform in enumeration order
    pub platform_index: usize,
    /// Index of the device within its platform
    pub device_index: usize,
    /// Name of the device
    pub name: String,
    /// Vendor of the device
    pub vendor: GpuVendor,
    /// Total global memory in bytes
    pub global_memory: u64,
    /// Maximum single allocation in bytes
    pub max_alloc_size: u64,
    /// Maximum work group size
    pub max_work_group_size: usize,
    /// Number of compute units
    pub compute_units: u32,
    /// Maximum clock frequency in MHz
    pub max_clock_freq: u32,
}

impl DeviceCapabilities {
    /// Global memory in GiB, for display
    pub fn memory_gb(&self) -> f64 {
        self.global_memory as f64 / (1024.0 * 1024.0 * 1024.0)
    }
}

impl fmt::Display for DeviceCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {} {} ({:.1}GB, {} CUs, max WG {})",
            self.platform_index,
            self.device_index,
            self.vendor,
            self.name,
            self.memory_gb(),
            self.compute_units,
            self.max_work_group_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_detection() {
        assert_eq!(GpuVendor::detect("NVIDIA CUDA"), GpuVendor::Nvidia);
        assert_eq!(GpuVendor::detect("AMD Accelerated Parallel Processing"), GpuVendor::Amd);
        assert_eq!(GpuVendor::detect("Advanced Micro Devices, Inc."), GpuVendor::Amd);
        assert_eq!(GpuVendor::detect("Intel(R) OpenCL HD Graphics"), GpuVendor::Intel);
        assert_eq!(GpuVendor::detect("Portable Computing Language"), GpuVendor::Unknown);
    }

    #[test]
    fn test_capabilities_display() {
        let caps = DeviceCapabilities {
            platform_index: 0,
            device_index: 1,
            name: "Test GPU".to_string(),
            vendor: GpuVendor::Amd,
            global_memory: 8 * 1024 * 1024 * 1024,
            max_alloc_size: 2 * 1024 * 1024 * 1024,
            max_work_group_size: 256,
            compute_units: 36,
            max_clock_freq: 1800,
        };
        let text = caps.to_string();
        assert!(text.contains("[0:1]"));
        assert!(text.contains("AMD Test GPU"));
        assert!(text.contains("8.0GB"));
    }
}
