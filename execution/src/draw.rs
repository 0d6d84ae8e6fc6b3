//! Where result digits come from.
//!
//! The store asks a [`ResultSource`] for one digit per settled round and never
//! looks at how it was produced. Fair drawing is the host's concern; the
//! sources here are deterministic so that a run can be replayed from its seed.

use colorbet_types::{Digit, GameMode, PeriodId};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait ResultSource {
    fn draw(&mut self, mode: GameMode, period_id: &PeriodId) -> Digit;
}

/// Uniform digits from a seeded `StdRng`.
#[derive(Clone, Debug)]
pub struct SeededDraw {
    rng: StdRng,
}

impl SeededDraw {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ResultSource for SeededDraw {
    fn draw(&mut self, _mode: GameMode, _period_id: &PeriodId) -> Digit {
        Digit::wrapping(self.rng.gen_range(0..=Digit::MAX))
    }
}

/// Replays a fixed script of digits, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct FixedDraw {
    script: Vec<Digit>,
    next: usize,
}

impl FixedDraw {
    /// An empty script draws zeros.
    pub fn new(script: Vec<Digit>) -> Self {
        Self { script, next: 0 }
    }
}

impl ResultSource for FixedDraw {
    fn draw(&mut self, _mode: GameMode, _period_id: &PeriodId) -> Digit {
        if self.script.is_empty() {
            return Digit::default();
        }
        let digit = self.script[self.next % self.script.len()];
        self.next = self.next.wrapping_add(1);
        digit
    }
}

impl<S: ResultSource + ?Sized> ResultSource for Box<S> {
    fn draw(&mut self, mode: GameMode, period_id: &PeriodId) -> Digit {
        (**self).draw(mode, period_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> PeriodId {
        "20240115F0001".parse().unwrap()
    }

    fn digits(values: &[u8]) -> Vec<Digit> {
        values.iter().map(|v| Digit::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_seeded_draw_is_replayable() {
        let mut a = SeededDraw::new(7);
        let mut b = SeededDraw::new(7);
        let first: Vec<Digit> = (0..50).map(|_| a.draw(GameMode::Fast, &id())).collect();
        let second: Vec<Digit> = (0..50).map(|_| b.draw(GameMode::Fast, &id())).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_draw_covers_all_digits() {
        let mut source = SeededDraw::new(1);
        let mut seen = [false; 10];
        for _ in 0..1_000 {
            seen[source.draw(GameMode::Std, &id()).get() as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_fixed_draw_wraps() {
        let mut source = FixedDraw::new(digits(&[3, 0, 5]));
        let drawn: Vec<u8> = (0..7).map(|_| source.draw(GameMode::Pro, &id()).get()).collect();
        assert_eq!(drawn, vec![3, 0, 5, 3, 0, 5, 3]);
    }

    #[test]
    fn test_fixed_draw_empty_script() {
        let mut source = FixedDraw::new(Vec::new());
        assert_eq!(source.draw(GameMode::Fast, &id()).get(), 0);
    }
}
