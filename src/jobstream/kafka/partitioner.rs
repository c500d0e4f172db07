//! Deterministic key-to-partition routing.
//!
//! Uses 32-bit FNV-1a over the key bytes, so a given key maps to the same
//! partition across calls, processes, and publisher instances. Load spread
//! depends entirely on key choice; a constant key collapses every job onto
//! one partition.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a hash of the given bytes.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Selects the partition for a job key.
///
/// `partitions` must be >= 1; the publisher validates this before routing.
pub fn partition_for_key(key: &[u8], partitions: i32) -> i32 {
    debug_assert!(partitions >= 1);
    (fnv1a_32(key) % partitions as u32) as i32
}
