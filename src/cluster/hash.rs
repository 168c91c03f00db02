//! Ring hashing

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1 hash of a key
///
/// Used both for row keys and for deriving node ids from node names, so
/// the two land on the same ring.
pub fn store_hash(key: &str) -> u32 {
    key.as_bytes().iter().fold(FNV32_OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(FNV32_PRIME) ^ u32::from(*byte)
    })
}
