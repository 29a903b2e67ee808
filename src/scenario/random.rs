use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait RandomSource {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32;
}

impl RandomSource for StdRng {
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.gen_range(low..=high)
    }
}

pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
