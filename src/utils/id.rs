use rand::RngCore;
use rand::rngs::OsRng;
use uuid::{Builder, Uuid};

/// Generates a random (version 4) UUID for a stored file name.
///
/// All 122 random bits come straight from the operating system CSPRNG;
/// the builder only fixes the version nibble to `4` and the variant bits
/// to RFC 4122, so the variant nibble is one of `8`, `9`, `a` or `b`.
pub fn generate_file_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let id: Uuid = Builder::from_random_bytes(bytes).into_uuid();
    id.hyphenated().to_string()
}
