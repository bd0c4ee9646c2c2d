// src/equihash/mod.rs - Equihash puzzle model
// Tree location: ./src/equihash/mod.rs

//! Equihash puzzle model
//!
//! Parameter validation, derived sizes, and the hash state handed to the
//! list-generation kernel. Everything in here is device independent.

pub mod params;
pub mod state;

pub use params::EquihashParams;
pub use state::{HashState, HASH_STATE_INPUT_CAPACITY, ZCASH_HEADER_LEN};

/// BLAKE2b personalization prefix used by Zcash-family chains
pub const PERSONALIZATION_PREFIX: &[u8; 8] = b"ZcashPoW";
