// src/gpu/select.rs - Pluggable device selection
// Tree location: ./src/gpu/select.rs

//! Device selection strategies
//!
//! The session enumerates GPUs on the platforms a [`DeviceSelector`] asks
//! for, then scores the candidates; the highest score wins. Ties go to the
//! earliest candidate in enumeration order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::device::DeviceCapabilities;
use crate::EquigpuError;

/// Device selection strategy
pub trait DeviceSelector {
    /// Strategy name for logs
    fn name(&self) -> String;

    /// Score a candidate; `None` rejects it
    fn score(&self, device: &DeviceCapabilities) -> Option<u64>;

    /// Number of leading platforms worth enumerating; `None` means all
    fn platform_limit(&self) -> Option<usize> {
        None
    }

    /// Pick the index of the best candidate
    fn select(&self, candidates: &[DeviceCapabilities]) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            if let Some(score) = self.score(candidate) {
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((idx, score));
                }
            }
        }

        best.map(|(idx, _)| idx)
    }
}

/// Configurable selection policy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSelection {
    /// First GPU on the first platform
    #[default]
    FirstGpu,
    /// GPU with the most global memory
    MostMemory,
    /// GPU with the most compute units
    MostComputeUnits,
    /// First GPU whose name contains the given text (case-insensitive)
    NameContains(String),
}

impl DeviceSelector for DeviceSelection {
    fn name(&self) -> String {
        match self {
            Self::FirstGpu => "first-gpu".to_string(),
            Self::MostMemory => "most-memory".to_string(),
            Self::MostComputeUnits => "most-compute-units".to_string(),
            Self::NameContains(text) => format!("name:{}", text),
        }
    }

    fn platform_limit(&self) -> Option<usize> {
        match self {
            Self::FirstGpu => Some(1),
            _ => None,
        }
    }

    fn score(&self, device: &DeviceCapabilities) -> Option<u64> {
        match self {
            Self::FirstGpu => (device.platform_index == 0).then_some(0),
            Self::MostMemory => Some(device.global_memory),
            Self::MostComputeUnits => Some(device.compute_units as u64),
            Self::NameContains(text) => device
                .name
                .to_lowercase()
                .contains(&text.to_lowercase())
                .then_some(0),
        }
    }
}

impl FromStr for DeviceSelection {
    type Err = EquigpuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-gpu" | "first" => Ok(Self::FirstGpu),
            "most-memory" | "memory" => Ok(Self::MostMemory),
            "most-compute-units" | "compute" => Ok(Self::MostComputeUnits),
            other => match other.strip_prefix("name:") {
                Some(text) if !text.is_empty() => Ok(Self::NameContains(text.to_string())),
                _ => Err(EquigpuError::Config(format!(
                    "Unknown device selection '{}' (expected first-gpu, most-memory, most-compute-units or name:<text>)",
                    other
                ))),
            },
        }
    }
}
