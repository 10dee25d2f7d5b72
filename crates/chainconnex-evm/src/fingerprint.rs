//! keccak256 helpers for event selectors and hashed indexed arguments.

use tiny_keccak::{Hasher, Keccak};

/// keccak256 of arbitrary bytes.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input);
    hasher.finalize(&mut output);
    output
}

/// keccak256 of an event signature string, as a `0x`-prefixed topic.
/// Input: `"EventName(type1,type2,...)"`.
pub fn keccak256_signature(signature: &str) -> String {
    to_topic(&keccak256(signature.as_bytes()))
}

/// Format a 32-byte word as a lowercase `0x`-prefixed topic.
pub fn to_topic(word: &[u8]) -> String {
    format!("0x{}", hex::encode(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_signature() {
        assert_eq!(
            keccak256_signature("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn empty_input_hash() {
        assert_eq!(
            to_topic(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
