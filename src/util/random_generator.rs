use rand::{SeedableRng, RngCore};
use rand_chacha::ChaCha20Rng;

pub const PRNG_SEED_BYTES: usize = 32;

/// Seed of a [BlakeRng].
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct PrngSeed(pub [u8; PRNG_SEED_BYTES]);

impl AsMut<[u8]> for PrngSeed {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl AsRef<[u8]> for PrngSeed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hands out [BlakeRng]s, either freshly seeded from OS entropy or all
/// replaying one fixed seed.
pub struct BlakeRngFactory {
    seed: Option<PrngSeed>,
}

impl Default for BlakeRngFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BlakeRngFactory {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn from_seed(seed: PrngSeed) -> Self {
        Self { seed: Some(seed) }
    }

    pub fn get_rng(&self) -> BlakeRng {
        match self.seed {
            Some(seed) => BlakeRng::from_seed(seed),
            None => {
                let mut seed = PrngSeed::default();
                ChaCha20Rng::from_entropy().fill_bytes(seed.as_mut());
                BlakeRng::from_seed(seed)
            }
        }
    }
}

/// Cryptographic generator for key material, seeded from OS entropy.
pub fn key_material_rng() -> ChaCha20Rng {
    ChaCha20Rng::from_entropy()
}

const BUFFER_SIZE: usize = 4096;

/// Fast statistical generator: blake3 in XOF mode over `seed || counter`.
///
/// Used for random test data (`randint`, `randbits`), never for key material.
pub struct BlakeRng {
    buffer: Box<[u8; BUFFER_SIZE]>,
    seed: PrngSeed,
    counter: u64,
    buffer_current: usize,
}

impl SeedableRng for BlakeRng {
    type Seed = PrngSeed;

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            seed,
            counter: 0,
            buffer: Box::new([0; BUFFER_SIZE]),
            buffer_current: BUFFER_SIZE,
        }
    }
}

impl BlakeRng {
    fn refill_buffer(&mut self) {
        let mut hash = blake3::Hasher::new();
        hash.update(self.seed.as_ref());
        hash.update(&self.counter.to_le_bytes());
        hash.finalize_xof().fill(self.buffer.as_mut_slice());
        self.buffer_current = 0;
        self.counter = self.counter.wrapping_add(1);
    }
}

impl RngCore for BlakeRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut i = 0;
        while i < dest.len() {
            if self.buffer_current >= BUFFER_SIZE {
                self.refill_buffer();
            }
            let len = std::cmp::min(dest.len() - i, BUFFER_SIZE - self.buffer_current);
            dest[i..i + len].copy_from_slice(&self.buffer[self.buffer_current..self.buffer_current + len]);
            i += len;
            self.buffer_current += len;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
