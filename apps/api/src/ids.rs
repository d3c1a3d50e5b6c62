use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

const SUFFIX_LEN: usize = 9;
const MAX_ID_LEN: usize = 64;

/// Generates a public session identifier: `<prefix>_<unix millis>_<9 lowercase alphanumerics>`.
pub fn generate_session_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{prefix}_{}_{suffix}", Utc::now().timestamp_millis())
}

/// Client-supplied identifiers end up in storage keys, so only ASCII
/// alphanumerics, `_` and `-` are accepted.
pub fn is_valid_public_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
