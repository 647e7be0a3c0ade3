//! Account id generation.
//!
//! Ids are the current Unix time in milliseconds in base 36 followed by a
//! random base-36 component, e.g. `m2x9k1c0` + `3fz81kq0v2hd`.

use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random: u64 = rand::thread_rng().gen();
    let mut id = to_base36(millis);
    id.push_str(&to_base36(random));
    id
}

/// Generates ids until `taken` rejects none of them.
pub fn generate_unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id();
        if !taken(&id) {
            return id;
        }
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // Only ASCII digits and lowercase letters are pushed.
    digits.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashSet;

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u64::MAX), "3w5e11264sgsf");
    }

    #[test]
    fn test_generated_ids_are_lowercase_alphanumeric() {
        let id = generate_id();
        assert!(!id.is_empty());
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generate_unique_id_retries_on_collision() {
        let attempts = Cell::new(0);
        let id = generate_unique_id(|_| {
            attempts.set(attempts.get() + 1);
            attempts.get() < 3
        });
        assert_eq!(attempts.get(), 3);
        assert!(!id.is_empty());
    }
}
