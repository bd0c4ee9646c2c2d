// src/equihash/params.rs - Equihash (n, k) parameters and derived sizes
// Tree location: ./src/equihash/params.rs

//! Equihash (n, k) parameters
//!
//! Only (200, 9) has a GPU solver. All derived sizes follow the generalized
//! birthday construction: a hash output of `n` bits is split into `k + 1`
//! chunks of `collision_bit_length` bits, and the initial list holds
//! `2^(collision_bit_length + 1)` entries.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use super::PERSONALIZATION_PREFIX;
use crate::EquigpuError;

/// Size in bytes of one index in a minimal (unpacked) solution
const INDEX_BYTES: usize = std::mem::size_of::<u32>();

/// Equihash puzzle shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquihashParams {
    n: u32,
    k: u32,
}

impl EquihashParams {
    /// The only parameter set with a GPU solver
    pub const N200_K9: Self = Self { n: 200, k: 9 };

    /// Validate an (n, k) pair
    pub fn new(n: u32, k: u32) -> Result<Self, EquigpuError> {
        let params = Self { n, k };
        if params.is_supported() {
            Ok(params)
        } else {
            Err(EquigpuError::UnsupportedParameters { n, k })
        }
    }

    /// Whether a solver exists for this pair
    pub fn is_supported(&self) -> bool {
        *self == Self::N200_K9
    }

    /// Hash output width in bits
    pub const fn n(&self) -> u32 {
        self.n
    }

    /// Number of collision rounds
    pub const fn k(&self) -> u32 {
        self.k
    }

    /// Bits two entries must share to collide in one round
    pub const fn collision_bit_length(&self) -> usize {
        (self.n / (self.k + 1)) as usize
    }

    /// Bytes needed to hold one collision chunk
    pub const fn collision_byte_length(&self) -> usize {
        (self.collision_bit_length() + 7) / 8
    }

    /// Number of initial list entries, which is also the global work size
    pub const fn init_size(&self) -> u32 {
        1 << (self.collision_bit_length() + 1)
    }

    /// How many n-bit entries one 512-bit BLAKE2b output yields
    pub const fn indices_per_hash_output(&self) -> u32 {
        512 / self.n
    }

    /// BLAKE2b digest length in bytes
    pub const fn hash_output_len(&self) -> usize {
        (self.indices_per_hash_output() * self.n / 8) as usize
    }

    /// Bytes of one list entry as produced by list generation
    pub const fn entry_len(&self) -> usize {
        (self.n / 8) as usize
    }

    /// Expanded hash length in bytes
    pub const fn hash_len(&self) -> usize {
        (self.k as usize + 1) * self.collision_byte_length()
    }

    /// Width of a full intermediate row after the final round
    pub const fn full_width(&self) -> usize {
        2 * self.collision_byte_length() + INDEX_BYTES * (1 << (self.k - 1))
    }

    /// Number of indices in a solution
    pub const fn solution_indices(&self) -> usize {
        1 << self.k
    }

    /// Size in bytes of a minimal (bit-packed) solution
    pub const fn solution_width(&self) -> usize {
        self.solution_indices() * (self.collision_bit_length() + 1) / 8
    }

    /// BLAKE2b personalization: "ZcashPoW" || le32(n) || le32(k)
    pub fn personalization(&self) -> [u8; 16] {
        let mut personal = [0u8; 16];
        personal[..8].copy_from_slice(PERSONALIZATION_PREFIX);
        LittleEndian::write_u32(&mut personal[8..12], self.n);
        LittleEndian::write_u32(&mut personal[12..16], self.k);
        personal
    }
}

impl std::fmt::Display for EquihashParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Equihash({}, {})", self.n, self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_9_supported() {
        assert!(EquihashParams::new(200, 9).is_ok());

        for (n, k) in [(144, 5), (96, 5), (200, 8), (210, 9), (0, 0)] {
            match EquihashParams::new(n, k) {
                Err(EquigpuError::UnsupportedParameters { n: en, k: ek }) => {
                    assert_eq!((en, ek), (n, k));
                }
                other => panic!("expected unsupported parameters, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_init_size_derivation() {
        let params = EquihashParams::N200_K9;
        assert_eq!(params.collision_bit_length(), 20);
        assert_eq!(params.init_size(), 1 << 21);
        assert_eq!(params.init_size(), 2_097_152);
    }

    #[test]
    fn test_derived_sizes() {
        let params = EquihashParams::N200_K9;
        assert_eq!(params.collision_byte_length(), 3);
        assert_eq!(params.indices_per_hash_output(), 2);
        assert_eq!(params.hash_output_len(), 50);
        assert_eq!(params.entry_len(), 25);
        assert_eq!(params.hash_len(), 30);
        assert_eq!(params.full_width(), 2 * 3 + 4 * 256);
        assert_eq!(params.solution_indices(), 512);
        assert_eq!(params.solution_width(), 1344);
    }

    #[test]
    fn test_personalization_layout() {
        let personal = EquihashParams::N200_K9.personalization();
        assert_eq!(&personal[..8], b"ZcashPoW");
        assert_eq!(&personal[8..12], &[200, 0, 0, 0]);
        assert_eq!(&personal[12..16], &[9, 0, 0, 0]);
    }

    #[test]
    fn test_display() {
        assert_eq!(EquihashParams::N200_K9.to_string(), "Equihash(200, 9)");
    }
}
