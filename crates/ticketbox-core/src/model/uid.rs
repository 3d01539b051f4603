//! Ticket identifiers.
//!
//! A uid is two independent random values in `[0, 36^3)`, each rendered as a
//! zero-padded 3-digit base-36 string, concatenated into 6 lowercase
//! characters (e.g. `0k3zq9`). Uniqueness against the live collection is the
//! caller's job; see [`crate::repository::TicketRepository::new_ticket`].

use rand::Rng;

/// Length of a uid in characters.
pub const UID_LEN: usize = 6;

/// Exclusive upper bound of each half (`36^3`).
const HALF_RANGE: u32 = 46_656;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh 6-character uid.
pub fn generate_uid<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = rng.gen_range(0..HALF_RANGE);
    let second = rng.gen_range(0..HALF_RANGE);
    let mut uid = String::with_capacity(UID_LEN);
    push_base36_padded(&mut uid, first);
    push_base36_padded(&mut uid, second);
    uid
}

/// Append `value` as exactly three base-36 digits.
fn push_base36_padded(out: &mut String, value: u32) {
    let value = value % HALF_RANGE;
    for divisor in [36 * 36, 36, 1] {
        let digit = (value / divisor) % 36;
        out.push(char::from(DIGITS[digit as usize]));
    }
}

/// True if `s` has the shape of a generated uid.
#[must_use]
pub fn is_valid_uid(s: &str) -> bool {
    s.len() == UID_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn render(value: u32) -> String {
        let mut out = String::new();
        push_base36_padded(&mut out, value);
        out
    }

    #[test]
    fn halves_are_zero_padded() {
        assert_eq!(render(0), "000");
        assert_eq!(render(35), "00z");
        assert_eq!(render(36), "010");
        assert_eq!(render(46_655), "zzz");
    }

    #[test]
    fn generated_uids_are_six_lowercase_base36_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let uid = generate_uid(&mut rng);
            assert!(is_valid_uid(&uid), "bad uid {uid}");
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(generate_uid(&mut a), generate_uid(&mut b));
        }
    }

    #[test]
    fn thousand_uids_rarely_collide() {
        let mut rng = StdRng::seed_from_u64(1);
        let uids: HashSet<String> = (0..1_000).map(|_| generate_uid(&mut rng)).collect();
        // 36^6 possible ids; a collision among 1000 draws is ~2e-4 likely.
        assert!(uids.len() >= 999);
    }

    #[test]
    fn uid_shape_validation() {
        assert!(is_valid_uid("0k3zq9"));
        assert!(!is_valid_uid("0K3ZQ9"));
        assert!(!is_valid_uid("0k3zq"));
        assert!(!is_valid_uid("0k3zq9a"));
        assert!(!is_valid_uid("0k3-q9"));
    }

    proptest! {
        #[test]
        fn any_half_value_renders_three_digits(value in 0u32..46_656) {
            let rendered = render(value);
            prop_assert_eq!(rendered.len(), 3);
            prop_assert_eq!(u32::from_str_radix(&rendered, 36).unwrap(), value);
        }
    }
}
