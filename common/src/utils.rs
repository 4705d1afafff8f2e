use sha2::{Digest, Sha256};

/// Length of a hex encoded SHA-256 digest
pub const SOURCE_HASH_LEN: usize = 64;

const URL_PREFIXES: [&str; 3] = ["http://", "https://", "file://"];

/// Hashes the exact string form of an image source. Two strings that
/// point at the same resource still hash differently.
pub fn hash_source(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Whether `hash` looks like something `hash_source` could have produced.
pub fn is_valid_hash(hash: &str) -> bool {
    hash.len() == SOURCE_HASH_LEN
        && hash
            .bytes()
            .all(|byte| byte.is_ascii_digit() || (b'a'..=b'f').contains(&byte))
}

pub fn is_url(image: &str) -> bool {
    URL_PREFIXES.iter().any(|prefix| image.starts_with(prefix))
}
