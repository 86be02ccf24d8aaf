//! Unique tokens for resource names.
//!
//! Tests run in parallel against one shared AWS account and region, so every
//! provisioned stack needs a name nobody else in the run is using. Tokens are
//! 6 base-62 characters; a process-wide registry rejects repeats.

use std::sync::OnceLock;

use dashmap::DashSet;
use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;

/// Length of every generated token.
pub const UNIQUE_ID_LEN: usize = 6;

const LOWER_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Every token handed out in this process. Entries are never removed, so the
/// set grows by one per name for the life of the test binary.
fn issued() -> &'static DashSet<String> {
    static ISSUED: OnceLock<DashSet<String>> = OnceLock::new();
    ISSUED.get_or_init(DashSet::new)
}

/// Draw until the registry accepts a token nobody else has been given.
fn claim(mut draw: impl FnMut() -> String) -> String {
    loop {
        let token = draw();
        if issued().insert(token.clone()) {
            return token;
        }
    }
}

/// Generate a 6-character base-62 token (`0-9A-Za-z`) unique within this process.
pub fn unique_id() -> String {
    claim(|| Alphanumeric.sample_string(&mut rand::thread_rng(), UNIQUE_ID_LEN))
}

/// Generate a 6-character lowercase alphanumeric token unique within this process.
///
/// For resources (S3 buckets, ELB names) that reject upper case.
pub fn unique_id_lower() -> String {
    claim(|| {
        let mut rng = rand::thread_rng();
        (0..UNIQUE_ID_LEN)
            .map(|_| LOWER_ALPHABET[rng.gen_range(0..LOWER_ALPHABET.len())] as char)
            .collect()
    })
}

/// Build `"{prefix}-{token}"`, e.g. `k3s-test-a1B2c3`.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, unique_id())
}
