//! Deterministic seeded generation utilities.
//!
//! Provides a restart-stable multi-argument hash, seed resolution from user-facing
//! seed strings, per-chunk RNG derivation, and deterministic math via `libm`.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Stable hashing
// ---------------------------------------------------------------------------

const TAG_INT: u8 = b'i';
const TAG_FLOAT: u8 = b'f';
const TAG_STR: u8 = b's';
const TAG_BOOL: u8 = b'b';

/// Incremental, order-sensitive hasher whose output never depends on the process,
/// platform, or Rust release.
///
/// Every value is written in a canonical tagged little-endian form: integers of any
/// width are widened to `i128`, floats are written as `f64` bits, strings are
/// length-prefixed UTF-8. The concatenated bytes are digested with SHA-256 and the
/// first four bytes form the result.
#[derive(Clone, Default)]
pub struct StableHasher {
    digest: Sha256,
}

impl StableHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one value into the hash.
    pub fn update<T: StableHash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.stable_hash(self);
        self
    }

    /// Write an integer of any width.
    pub fn write_int(&mut self, value: i128) {
        self.digest.update([TAG_INT]);
        self.digest.update(value.to_le_bytes());
    }

    /// Write a float (as `f64` bits).
    pub fn write_float(&mut self, value: f64) {
        self.digest.update([TAG_FLOAT]);
        self.digest.update(value.to_bits().to_le_bytes());
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.digest.update([TAG_STR]);
        self.digest.update((value.len() as u64).to_le_bytes());
        self.digest.update(value.as_bytes());
    }

    /// Write a boolean.
    pub fn write_bool(&mut self, value: bool) {
        self.digest.update([TAG_BOOL, value as u8]);
    }

    /// Finish hashing and return the first four digest bytes as a little-endian `i32`.
    pub fn finish(&self) -> i32 {
        let out = self.digest.clone().finalize();
        i32::from_le_bytes([out[0], out[1], out[2], out[3]])
    }
}

/// Values that can be fed into a [`StableHasher`].
pub trait StableHash {
    /// Write the canonical representation of `self` into `hasher`.
    fn stable_hash(&self, hasher: &mut StableHasher);
}

macro_rules! impl_stable_hash_int {
    ($($t:ty),*) => {
        $(
            impl StableHash for $t {
                fn stable_hash(&self, hasher: &mut StableHasher) {
                    hasher.write_int(*self as i128);
                }
            }
        )*
    };
}

impl_stable_hash_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl StableHash for f32 {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_float(f64::from(*self));
    }
}

impl StableHash for f64 {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_float(*self);
    }
}

impl StableHash for bool {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_bool(*self);
    }
}

impl StableHash for str {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_str(self);
    }
}

impl StableHash for String {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.write_str(self);
    }
}

impl<T: StableHash + ?Sized> StableHash for &T {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (**self).stable_hash(hasher);
    }
}

/// Hash an ordered sequence of heterogeneous values.
pub fn multi_hash(values: &[&dyn StableHash]) -> i32 {
    let mut hasher = StableHasher::new();
    for value in values {
        value.stable_hash(&mut hasher);
    }
    hasher.finish()
}

/// Hash any number of [`StableHash`] values in order.
///
/// ```
/// use verdant_terrain::multi_hash;
///
/// let a = multi_hash!(7, 3, -2, "biome_map");
/// let b = multi_hash!(7, 3, -2, "biome_map");
/// assert_eq!(a, b);
/// assert_ne!(multi_hash!(0, 1), multi_hash!(1, 0));
/// ```
#[macro_export]
macro_rules! multi_hash {
    ($($value:expr),+ $(,)?) => {{
        let mut hasher = $crate::seed::StableHasher::new();
        $( hasher.update(&$value); )+
        hasher.finish()
    }};
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Turn a user-facing seed string into a numeric seed.
///
/// A non-empty string, digits included, is hashed and always maps to the same
/// seed. An empty string yields a time-based, non-reproducible seed.
pub fn seed_from_string(seed: &str) -> i32 {
    if seed.is_empty() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let resolved = crate::multi_hash!(nanos as u64, "time_seed");
        log::info!("Empty seed string, using time-based seed {resolved}");
        resolved
    } else {
        crate::multi_hash!(seed)
    }
}

/// Build a deterministic RNG from a stable hash value.
pub fn rng_from_hash(hash: i32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash as u32 as u64)
}

/// Derive the RNG for a chunk. The stream depends only on `(seed, chunk_x, chunk_z)`,
/// never on generation order or thread.
pub fn chunk_rng(seed: i32, chunk_x: i32, chunk_z: i32) -> ChaCha8Rng {
    rng_from_hash(crate::multi_hash!(seed, chunk_x, chunk_z))
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f32) -> f32 {
    libm::sinf(x)
}

/// Deterministic cosine using libm.
#[inline]
pub fn det_cos(x: f32) -> f32 {
    libm::cosf(x)
}

/// Deterministic exponential using libm.
#[inline]
pub fn det_exp(x: f32) -> f32 {
    libm::expf(x)
}

/// Deterministic square root using libm.
#[inline]
pub fn det_sqrt(x: f32) -> f32 {
    libm::sqrtf(x)
}
