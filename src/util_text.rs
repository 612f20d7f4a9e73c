use num_bigint::BigUint;
use serde::Serializer;

/// Serialize a big integer as a base-10 string so JSON consumers never see
/// a lossy float.
pub fn serialize_biguint_as_string<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}

/// Serialize opaque bytes as `0x`-prefixed lowercase hex.
pub fn serialize_bytes_as_hex<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

/// Strip an optional `0x`/`0X` prefix.
#[inline]
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Whether `s` looks like a 20-byte hex account address.
pub fn is_address(s: &str) -> bool {
    let body = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(body) => body,
        None => return false,
    };
    body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Whether `s` looks like a 32-byte hex transaction hash.
pub fn is_tx_hash(s: &str) -> bool {
    let body = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(body) => body,
        None => return false,
    };
    body.len() == 64 && body.bytes().all(|b| b.is_ascii_hexdigit())
}
