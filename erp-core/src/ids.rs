//! Identifier and pseudo-hash generation
//!
//! Hashes produced here are random strings shaped like 256-bit digests.
//! Nothing is hashed; they only need to be unique enough to look up.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Previous-hash sentinel for the first ledger entry
pub const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Hex digits after the `0x` prefix
pub const HASH_HEX_DIGITS: usize = 64;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const HEX: &[u8] = b"0123456789abcdef";

/// Random 9-character upper-case base-36 suffix
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Prefixed record ID, e.g. `ORD7K2Q9ZP1M`
pub fn prefixed_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{}{}", prefix, generate_id(rng))
}

/// Sequential seed ID, e.g. `ORD00042`
pub fn sequential_id(prefix: &str, n: usize, width: usize) -> String {
    format!("{}{:0width$}", prefix, n, width = width)
}

/// Random `0x`-prefixed 64 hex digit string
pub fn generate_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut hash = String::with_capacity(2 + HASH_HEX_DIGITS);
    hash.push_str("0x");
    for _ in 0..HASH_HEX_DIGITS {
        hash.push(HEX[rng.gen_range(0..HEX.len())] as char);
    }
    hash
}

/// Shape check for ledger hashes
pub fn is_well_formed_hash(hash: &str) -> bool {
    hash.strip_prefix("0x").is_some_and(|digits| {
        digits.len() == HASH_HEX_DIGITS
            && digits.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    })
}

/// Ticket number from the last six digits of the millisecond clock
pub fn ticket_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().unsigned_abs() % 1_000_000;
    format!("TKT-{:06}", millis)
}

/// Initials for an avatar badge
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}
