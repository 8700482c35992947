use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create a deterministic RNG from a seed.
///
/// The world owns exactly one of these; all four stochastic draws (site
/// selection, acceptance test, turn angle, cooldown resample) come from the
/// same stream so runs are reproducible per seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}
