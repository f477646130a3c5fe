// SPDX-License-Identifier: GPL-3.0-or-later

#[derive(Clone, Copy)]
pub struct Prng(u64);

// xorshift64star Pseudo-Random Number Generator
// Based on code dedicated to the public domain by Sebastiano Vigna (2014).
// Outputs 64-bit numbers, needs no warm-up and has period 2^64 - 1.
// Only used to search magic multipliers, so a fixed seed always yields the
// same tables.
//
// For further analysis see
//   <http://vigna.di.unimi.it/ftp/papers/xorshift.pdf>

impl Prng {
    pub fn new(seed: u64) -> Prng {
        debug_assert!(seed != 0);
        Prng(seed)
    }

    pub fn rand64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        u64::wrapping_mul(self.0, 2685821657736338717)
    }

    // Special generator used to fast init magic numbers.
    // Output values only have 1/8th of their bits set on average.
    pub fn sparse_rand(&mut self) -> u64 {
        self.rand64() & self.rand64() & self.rand64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(728);
        let mut b = Prng::new(728);
        for _ in 0..16 {
            assert_eq!(a.rand64(), b.rand64());
        }
    }

    #[test]
    fn sparse_values_are_sparse() {
        let mut rng = Prng::new(10316);
        let bits: u32 = (0..1000).map(|_| rng.sparse_rand().count_ones()).sum();
        // 64 / 8 = 8 bits per value on average
        assert!(bits > 6000 && bits < 10000);
    }
}
