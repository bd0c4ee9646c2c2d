// src/config/settings.rs - Solver configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::equihash::EquihashParams;
use crate::gpu::DeviceSelection;
use crate::EquigpuError;

/// Kernel source path used when none is configured
pub const DEFAULT_KERNEL_PATH: &str = "./list-gen.cl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Configuration for GPU solve attempts
pub struct SolverConfig {
    /// Path of the list-generation kernel source
    pub kernel_path: PathBuf,
    /// Device selection policy
    pub device_selection: DeviceSelection,
    /// Work-group size; `None` lets the runtime pick
    pub local_work_size: Option<usize>,
    /// Extra compiler options passed to the program build
    pub build_options: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kernel_path: PathBuf::from(DEFAULT_KERNEL_PATH),
            device_selection: DeviceSelection::FirstGpu,
            local_work_size: None,
            build_options: String::new(),
        }
    }
}

impl SolverConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EquigpuError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EquigpuError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!("Loaded solver config from {}", path.display());
        Ok(config)
    }

    /// Check invariants that cannot be expressed in the type
    pub fn validate(&self) -> Result<(), EquigpuError> {
        if self.kernel_path.as_os_str().is_empty() {
            return Err(EquigpuError::Config("kernel_path must not be empty".to_string()));
        }

        if let Some(local) = self.local_work_size {
            let global = EquihashParams::N200_K9.init_size() as usize;
            if local == 0 || global % local != 0 {
                return Err(EquigpuError::Config(format!(
                    "local_work_size {} must be non-zero and divide the global work size {}",
                    local, global
                )));
            }
        }

        Ok(())
    }
}
