// src/equihash/state.rs - Kernel-argument hash state
// Tree location: ./src/equihash/state.rs

//! Hash state passed to the list-generation kernel
//!
//! The state is the block header absorbed so far plus the BLAKE2b
//! personalization, packed into a fixed-size `#[repr(C)]` blob so it can be
//! bound as a scalar kernel argument. Binding copies it by value; the solver
//! never mutates the caller's state.
//!
//! Layout must match `hash_state_t` in `list-gen.cl`.

use std::fmt;

use blake2_rfc::blake2b::Blake2b;
use byteorder::{ByteOrder, LittleEndian};

use super::params::EquihashParams;
use crate::EquigpuError;

/// Serialized Zcash block header length including the 32-byte nonce
pub const ZCASH_HEADER_LEN: usize = 140;

/// Bytes reserved for absorbed input (header plus headroom, kept 4-byte aligned)
pub const HASH_STATE_INPUT_CAPACITY: usize = 144;

/// Fixed-size BLAKE2b input state for list generation
#[repr(C)]
#[derive(Clone, Copy, PartialEq)]
pub struct HashState {
    personal: [u8; 16],
    input: [u8; HASH_STATE_INPUT_CAPACITY],
    input_len: u32,
    digest_len: u32,
}

// SAFETY: plain-old-data with a C layout and no padding (16 + 144 + 4 + 4 bytes)
unsafe impl ocl::OclPrm for HashState {}

impl Default for HashState {
    fn default() -> Self {
        Self {
            personal: [0u8; 16],
            input: [0u8; HASH_STATE_INPUT_CAPACITY],
            input_len: 0,
            digest_len: 0,
        }
    }
}

impl fmt::Debug for HashState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashState")
            .field("personal", &hex::encode(self.personal))
            .field("input", &hex::encode(self.input()))
            .field("digest_len", &self.digest_len)
            .finish()
    }
}

impl HashState {
    /// Start a state for `params` with the given header bytes absorbed
    pub fn new(params: EquihashParams, header: &[u8]) -> Result<Self, EquigpuError> {
        let mut state = Self {
            personal: params.personalization(),
            digest_len: params.hash_output_len() as u32,
            ..Self::default()
        };
        state.absorb(header)?;
        Ok(state)
    }

    /// Append bytes (typically the nonce) to the absorbed input
    pub fn absorb(&mut self, data: &[u8]) -> Result<(), EquigpuError> {
        let start = self.input_len as usize;
        let end = start + data.len();
        if end > HASH_STATE_INPUT_CAPACITY {
            return Err(EquigpuError::InvalidState(format!(
                "input of {} bytes exceeds capacity of {} bytes",
                end, HASH_STATE_INPUT_CAPACITY
            )));
        }

        self.input[start..end].copy_from_slice(data);
        self.input_len = end as u32;
        Ok(())
    }

    /// Parameters encoded in the personalization
    pub fn params(&self) -> EquihashParams {
        let n = LittleEndian::read_u32(&self.personal[8..12]);
        let k = LittleEndian::read_u32(&self.personal[12..16]);
        EquihashParams::new(n, k).unwrap_or(EquihashParams::N200_K9)
    }

    /// Absorbed input bytes
    pub fn input(&self) -> &[u8] {
        &self.input[..self.input_len as usize]
    }

    /// BLAKE2b personalization bytes
    pub fn personalization(&self) -> &[u8; 16] {
        &self.personal
    }

    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        self.digest_len as usize
    }

    /// Check that the state carries the personalization and digest length of `params`
    pub fn validate(&self, params: EquihashParams) -> Result<(), EquigpuError> {
        if self.personal != params.personalization() {
            return Err(EquigpuError::InvalidState(format!(
                "personalization {} does not match {}",
                hex::encode(self.personal),
                params
            )));
        }
        if self.digest_len() != params.hash_output_len() {
            return Err(EquigpuError::InvalidState(format!(
                "digest length {} does not match {} ({} bytes)",
                self.digest_len,
                params,
                params.hash_output_len()
            )));
        }
        Ok(())
    }

    /// BLAKE2b output for hash group `group` (input || le32(group))
    pub fn hash_output(&self, group: u32) -> Vec<u8> {
        // BLAKE2b digests are 1..=64 bytes; a default (unbound) state has digest_len 0
        let digest_len = self.digest_len().clamp(1, 64);
        let mut hasher = Blake2b::with_parameter_block(&self.parameter_block(digest_len));
        hasher.update(self.input());

        let mut group_bytes = [0u8; 4];
        LittleEndian::write_u32(&mut group_bytes, group);
        hasher.update(&group_bytes);

        hasher.finalize().as_bytes().to_vec()
    }

    /// Host-side list entry for `index`, identical to what kernel lane `index` computes
    pub fn list_entry(&self, index: u32) -> Result<Vec<u8>, EquigpuError> {
        let params = self.params();
        self.validate(params)?;

        let per_output = params.indices_per_hash_output();
        let entry_len = params.entry_len();

        let output = self.hash_output(index / per_output);
        let offset = (index % per_output) as usize * entry_len;
        Ok(output[offset..offset + entry_len].to_vec())
    }

    /// Unkeyed sequential parameter block: digest length, fanout 1, depth 1, personalization
    fn parameter_block(&self, digest_len: usize) -> [u64; 8] {
        let mut block = [0u64; 8];
        block[0] = 0x0101_0000 ^ digest_len as u64;
        block[6] = LittleEndian::read_u64(&self.personal[..8]);
        block[7] = LittleEndian::read_u64(&self.personal[8..]);
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_state(nonce: u8) -> HashState {
        let params = EquihashParams::N200_K9;
        let mut state = HashState::new(params, &[7u8; 108]).unwrap();
        state.absorb(&[nonce; 32]).unwrap();
        state
    }

    #[test]
    fn test_blob_size_matches_kernel_struct() {
        assert_eq!(std::mem::size_of::<HashState>(), 16 + HASH_STATE_INPUT_CAPACITY + 4 + 4);
    }

    #[test]
    fn test_absorb_tracks_length() {
        let state = header_state(1);
        assert_eq!(state.input().len(), ZCASH_HEADER_LEN);
        assert_eq!(&state.input()[..108], &[7u8; 108][..]);
        assert_eq!(&state.input()[108..], &[1u8; 32][..]);
        assert_eq!(state.digest_len(), 50);
    }

    #[test]
    fn test_absorb_rejects_overflow() {
        let mut state = header_state(1);
        assert!(state.absorb(&[0u8; 4]).is_ok());
        let err = state.absorb(&[0u8; 1]).unwrap_err();
        assert!(matches!(err, EquigpuError::InvalidState(_)));
        // Failed absorb leaves the state untouched
        assert_eq!(state.input().len(), HASH_STATE_INPUT_CAPACITY);
    }

    #[test]
    fn test_params_round_trip_through_personalization() {
        assert_eq!(header_state(0).params(), EquihashParams::N200_K9);
    }

    #[test]
    fn test_list_entries_share_hash_output() {
        let state = header_state(3);
        let output = state.hash_output(5);
        assert_eq!(output.len(), 50);

        // indices 10 and 11 both come from group 5
        assert_eq!(state.list_entry(10).unwrap(), output[..25].to_vec());
        assert_eq!(state.list_entry(11).unwrap(), output[25..].to_vec());
        assert_ne!(state.list_entry(12).unwrap(), state.list_entry(10).unwrap());
    }

    #[test]
    fn test_nonce_changes_entries() {
        assert_ne!(header_state(1).list_entry(0).unwrap(), header_state(2).list_entry(0).unwrap());
        assert_eq!(header_state(1).list_entry(0).unwrap(), header_state(1).list_entry(0).unwrap());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = header_state(9);
        let mut copy = original;
        copy.absorb(&[0xff]).unwrap();
        assert_ne!(copy, original);
        assert_eq!(original.input().len(), ZCASH_HEADER_LEN);
    }

    #[test]
    fn test_hash_output_matches_personalized_blake2b() {
        // BLAKE2b-400, personalization "ZcashPoW" || le32(200) || le32(9)
        let state = header_state(3);
        assert_eq!(
            hex::encode(state.hash_output(0)),
            "ecb7bb1d048eb0fdc0f5368767ed1c38249dc01551a1033ef6badeeb46505b9f6d85194366ff870e7d1a4e91ba708f0d7660"
        );
        assert_eq!(
            hex::encode(state.hash_output(5)),
            "31adfcea2ee0178575b5958b47d037ce6b7bee8e3df77313f027d58c310cca597172ad16e3b582e581e4a8c0347113f1823f"
        );
    }

    #[test]
    fn test_unbound_state_is_rejected() {
        let state = HashState::default();
        assert!(matches!(
            state.validate(EquihashParams::N200_K9),
            Err(EquigpuError::InvalidState(_))
        ));
        assert!(matches!(state.list_entry(0), Err(EquigpuError::InvalidState(_))));
        assert!(header_state(1).validate(EquihashParams::N200_K9).is_ok());

        let mut short_digest = header_state(1);
        short_digest.digest_len = 32;
        assert!(short_digest.validate(EquihashParams::N200_K9).is_err());
    }
}
