use std::ops::RangeInclusive;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

pub trait RandomSource {
    /// Returns a value in `[0, bound)`. `bound` is never 0.
    fn next_below(&mut self, bound: u32) -> u32;

    fn next_in(&mut self, range: &RangeInclusive<u32>) -> u32 {
        let span = range.end() - range.start() + 1;
        range.start() + self.next_below(span)
    }
}

impl<R: Rng> RandomSource for R {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.gen_range(0..bound)
    }
}

/// Seed derived from the wall clock, for runs without an explicit seed.
pub fn clock_seed() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64,
        Err(err) => err.duration().as_nanos() as u64,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use super::RandomSource;

    /// Replays a fixed script of draws. Each scripted value is reduced modulo
    /// the requested bound; an exhausted script yields 0.
    pub struct ScriptedRandom {
        values: VecDeque<u32>,
        pub bounds: Vec<u32>,
    }

    impl ScriptedRandom {
        pub fn new(values: &[u32]) -> ScriptedRandom {
            ScriptedRandom {
                values: values.iter().copied().collect(),
                bounds: Vec::new(),
            }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_below(&mut self, bound: u32) -> u32 {
            self.bounds.push(bound);
            self.values.pop_front().unwrap_or(0) % bound
        }
    }
}
