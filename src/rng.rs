//! Named random streams derived from one scenario seed.
//!
//! Each stream's seed depends only on the master seed and the stream name, so
//! adding a new consumer never shifts the draws of an existing one.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let seed = derive_seed(self.seed, name);
        let inner = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed));
        StreamRng { inner }
    }
}

fn derive_seed(master: u64, name: &str) -> u64 {
    // FNV-1a over the name, folded into the master seed.
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    master
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
        ^ hash
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RngCore for StreamRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
