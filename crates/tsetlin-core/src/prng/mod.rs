//! Seeded PRNG services. Exact algorithm is not externally observable per
//! the spec; only reproducibility from a seed matters, so both generators
//! are thin wrappers over `ChaCha8Rng` (grounded in `jeremyhahn-neurlang`'s
//! `rand_chacha` dependency) rather than a hand-rolled twister.

mod frng;
mod irng;

pub use frng::FRng;
pub use irng::IRng;
