use blake3::Hasher;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Per-fill deterministic tie-break stream.
///
/// One `FillRng` is constructed per fill call from the combined
/// `(z_seed, session_seed, tick)` seed and discarded afterwards. The RNG
/// algorithm is fixed to ChaCha20 (`rand_chacha::ChaCha20Rng`) so the same
/// seed yields the same draw sequence on every platform.
///
/// Invariants:
/// - Consulted only to break exact ties; when scores are distinct the
///   selection set never depends on it.
/// - No global RNG, no shared state between fills.
#[derive(Debug, Clone)]
pub struct FillRng {
    rng: ChaCha20Rng,
}

impl FillRng {
    /// Expand a combined 64-bit seed into a ChaCha20 stream.
    ///
    /// The 32-byte ChaCha key is `blake3(seed LE)`, mirroring how the
    /// session seed itself is derived.
    pub fn new(combined_seed: u64) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(&combined_seed.to_le_bytes());
        let key = *hasher.finalize().as_bytes();

        Self {
            rng: ChaCha20Rng::from_seed(key),
        }
    }

    /// Next raw 64-bit draw.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Pick an index in `[0, n)` to break an n-way tie.
    ///
    /// `n` must be non-zero; a 1-way "tie" short-circuits without
    /// consuming entropy so that callers may pass degenerate tie sets.
    pub fn pick(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "tie set must be non-empty");
        if n <= 1 {
            return 0;
        }
        (self.rng.next_u64() % n as u64) as usize
    }
}
