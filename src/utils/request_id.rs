//! Random identifiers for per-request scratch directories.

/// Number of random bytes before hex encoding.
const ID_LENGTH_BYTES: usize = 8;

/// Generates a random 16-character lowercase hex identifier.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_request_id() -> String {
    let mut buffer = [0u8; ID_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    hex::encode(buffer)
}
