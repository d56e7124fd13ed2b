use {
    alloy::{primitives::B256, signers::local::PrivateKeySigner},
    std::str::FromStr,
};

/// The key material itself is never part of the error so that it can't end up
/// in logs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidPrivateKey {
    #[error("private key is empty")]
    Empty,
    #[error("private key must be 32 bytes of hex")]
    Malformed,
    #[error("private key is not a valid secp256k1 scalar")]
    OutOfRange,
}

/// Parses a hex encoded private key, with or without a `0x` prefix.
pub fn parse_private_key(key: &str) -> Result<PrivateKeySigner, InvalidPrivateKey> {
    let key = key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    if key.is_empty() {
        return Err(InvalidPrivateKey::Empty);
    }
    if key.len() != 64 {
        return Err(InvalidPrivateKey::Malformed);
    }
    let bytes = B256::from_str(key).map_err(|_| InvalidPrivateKey::Malformed)?;
    PrivateKeySigner::from_bytes(&bytes).map_err(|_| InvalidPrivateKey::OutOfRange)
}
