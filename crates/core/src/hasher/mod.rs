use sha2::{Digest, Sha256};

/// Stable 64-bit digest of a SKU code: the first eight bytes of the SHA-256
/// of its UTF-8 bytes, big-endian.
pub fn sku_digest(sku: &str) -> u64 {
    let hash = Sha256::digest(sku.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(head)
}

/// Storefront rating in `[4.0, 4.9]`, one decimal.
pub fn rating(digest: u64) -> f64 {
    (40 + digest % 10) as f64 / 10.0
}

/// Review count in `[10, 199]`.
pub fn review_count(digest: u64) -> u32 {
    10 + (digest % 190) as u32
}

/// Stock level in `[20, 99]`.
pub fn stock(digest: u64) -> u32 {
    20 + (digest % 80) as u32
}
