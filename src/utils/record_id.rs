use std::sync::atomic::{AtomicU64, Ordering};

use crate::common_utils::get_current_timestamp_ms;

/// Snowflake-style record id
/// Format: 44 bits timestamp (ms) + 20 bits sequence
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

const SEQUENCE_BITS: u64 = 20;
const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

pub fn generate_record_id() -> u64 {
    let timestamp_ms = get_current_timestamp_ms().max(0) as u64;
    let seq = SEQUENCE.fetch_add(1, Ordering::SeqCst) % (1 << SEQUENCE_BITS);

    (timestamp_ms << SEQUENCE_BITS) | seq
}

/// Fixed-width Crockford Base32 (13 chars), so string order equals numeric order
pub fn to_base32(val: u64) -> String {
    let mut chars = ['0'; 13];
    let mut v = val;
    for i in (0..13).rev() {
        chars[i] = ALPHABET[(v % 32) as usize] as char;
        v /= 32;
    }
    chars.iter().collect()
}

/// Timestamp part of an id (milliseconds since epoch)
pub fn timestamp_ms(val: u64) -> u64 {
    val >> SEQUENCE_BITS
}

/// New record id rendered as Base32 text, used as document key
pub fn new_record_id() -> String {
    to_base32(generate_record_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let ids: Vec<String> = (0..1000).map(|_| new_record_id()).collect();
        let unique_count = ids.iter().collect::<std::collections::HashSet<_>>().len();
        assert_eq!(unique_count, 1000);
    }

    #[test]
    fn test_base32_preserves_order() {
        let a = to_base32(1);
        let b = to_base32(32);
        let c = to_base32(u64::MAX);
        assert_eq!(a.len(), 13);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(to_base32(0), "0000000000000");
    }

    #[test]
    fn test_timestamp_component() {
        let before = get_current_timestamp_ms() as u64;
        let id = generate_record_id();
        assert!(timestamp_ms(id) >= before);
    }
}
