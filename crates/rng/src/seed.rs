use blake3::Hasher;
use tracing::debug;

/// Derive the cached per-session seed from a session id.
///
/// The session seed is computed once at core construction and reused for
/// every subsequent fill. First 8 little-endian bytes of `blake3(session_id)`.
pub fn session_seed(session_id: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(session_id.as_bytes());
    let digest = hasher.finalize();

    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
    let seed = u64::from_le_bytes(seed_bytes);

    debug!(
        "Session seed derived: id={}, seed={}",
        session_id,
        hex::encode(seed_bytes)
    );
    seed
}

/// Combine the slice seed, session seed, and tick index into one 64-bit seed.
///
/// Sequential blake3 over `session_seed LE || z_seed bytes || tick LE`.
/// The hash input order is part of the determinism contract: the same
/// triple yields the same seed on every platform and in every release.
pub fn combine(z_seed: &str, session_seed: u64, tick: u64) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&session_seed.to_le_bytes());
    hasher.update(z_seed.as_bytes());
    hasher.update(&tick.to_le_bytes());
    let digest = hasher.finalize();

    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Generate a fresh session id from process entropy.
///
/// This is the only entropy draw in the crate and happens at most once per
/// core, at construction time. Everything after it is seed-derived.
pub fn generate_session_id() -> String {
    let raw: [u8; 8] = rand::random();
    hex::encode(raw)
}
