//! Input validation predicates.
//!
//! Every public entry point of the façade runs its arguments through these
//! checks before contacting the driver, so a malformed request never reaches
//! the wire. Predicates are pure; [`ensure`] turns a failed predicate into
//! [`ConnexError::BadParameter`].

use crate::error::ConnexError;

/// Largest integer a JSON number can carry without precision loss (2^53 − 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Fail with `BadParameter(msg)` unless `condition` holds.
pub fn ensure(condition: bool, msg: impl Into<String>) -> Result<(), ConnexError> {
    if condition {
        Ok(())
    } else {
        Err(ConnexError::BadParameter(msg.into()))
    }
}

/// `0x` followed by exactly 40 hex digits, any case.
pub fn is_address(s: &str) -> bool {
    is_prefixed_hex_of_len(s, 40)
}

/// `0x` followed by exactly 64 hex digits, any case.
pub fn is_bytes32(s: &str) -> bool {
    is_prefixed_hex_of_len(s, 64)
}

/// Non-negative integer that fits in 32 bits.
pub fn is_uint32(n: u64) -> bool {
    n <= u64::from(u32::MAX)
}

/// Non-negative integer representable exactly as a JSON number.
pub fn is_safe_uint(n: u64) -> bool {
    n <= MAX_SAFE_INTEGER
}

/// `0x` followed by whole bytes of hex (`0x` alone is the empty byte string).
pub fn is_hex_bytes(s: &str) -> bool {
    match s.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("0x") => {
            let digits = &s[2..];
            digits.len() % 2 == 0 && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        _ => false,
    }
}

/// `0x` followed by at least one hex digit.
pub fn is_hex_uint(s: &str) -> bool {
    match s.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("0x") => {
            let digits = &s[2..];
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        _ => false,
    }
}

/// Plain decimal integer without leading zeros: `0` or `[1-9][0-9]*`.
pub fn is_decimal_uint(s: &str) -> bool {
    match s.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        digits => digits.iter().all(u8::is_ascii_digit),
    }
}

/// Canonical (lowercase) form of a validated address or hash.
pub fn canonical(s: &str) -> String {
    s.to_ascii_lowercase()
}

fn is_prefixed_hex_of_len(s: &str, digits: usize) -> bool {
    s.len() == digits + 2
        && matches!(s.get(..2), Some(p) if p.eq_ignore_ascii_case("0x"))
        && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";

    #[test]
    fn address_formats() {
        assert!(is_address(ADDR));
        assert!(is_address(&ADDR.to_uppercase().replacen("0X", "0x", 1)));
        assert!(is_address("0X7567D83B7B8D80ADDCB281A71D54FC7B3364FFED"));
        assert!(!is_address(&ADDR[2..]), "missing prefix");
        assert!(!is_address(&ADDR[..41]), "too short");
        assert!(!is_address(&format!("{ADDR}0")), "too long");
        assert!(!is_address("0x7567d83b7b8d80addcb281a71d54fc7b3364ffeg"), "non-hex");
        assert!(!is_address(""));
    }

    #[test]
    fn bytes32_formats() {
        let h = format!("0x{}", "ab".repeat(32));
        assert!(is_bytes32(&h));
        assert!(!is_bytes32(&h[..65]));
        assert!(!is_bytes32(ADDR));
    }

    #[test]
    fn integer_bounds() {
        assert!(is_uint32(u64::from(u32::MAX)));
        assert!(!is_uint32(u64::from(u32::MAX) + 1));
        assert!(is_safe_uint(MAX_SAFE_INTEGER));
        assert!(!is_safe_uint(MAX_SAFE_INTEGER + 1));
    }

    #[test]
    fn hex_bytes() {
        assert!(is_hex_bytes("0x"));
        assert!(is_hex_bytes("0xA9059cbb"));
        assert!(!is_hex_bytes("0xabc"), "odd length");
        assert!(!is_hex_bytes("a9059cbb"));
        assert!(!is_hex_bytes("0xzz"));
    }

    #[test]
    fn hex_and_decimal_uint_strings() {
        assert!(is_hex_uint("0x10"));
        assert!(!is_hex_uint("0x"));
        assert!(is_decimal_uint("0"));
        assert!(is_decimal_uint("7"));
        assert!(is_decimal_uint("1000000000000000000"));
        assert!(!is_decimal_uint("007"));
        assert!(!is_decimal_uint("-1"));
        assert!(!is_decimal_uint("1e18"));
        assert!(!is_decimal_uint(""));
    }

    #[test]
    fn ensure_maps_to_bad_parameter() {
        assert!(ensure(true, "unused").is_ok());
        let err = ensure(false, "arg0 expected address").unwrap_err();
        assert!(matches!(err, ConnexError::BadParameter(ref m) if m == "arg0 expected address"));
    }
}
