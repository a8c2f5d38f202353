// File: agentsim-common/src/traits/random.rs

/// Source of uniform draws for the simulation tasks. Every random decision is
/// expressed through `roll`, so a scripted implementation can force any branch.
pub trait RandomSource: Send {
    /// Uniform value in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform integer in `low..=high`. Always takes exactly one draw, even
    /// for a single-value range, so scripted sequences stay in step.
    fn roll_range(&mut self, low: u64, high: u64) -> u64 {
        let draw = self.roll().clamp(0.0, 1.0);
        if high <= low {
            return low;
        }
        let span = high - low + 1;
        let offset = (draw * span as f64).floor() as u64;
        low + offset.min(span - 1)
    }

    /// Uniform index into a collection of `len` items, `None` when empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.roll_range(0, len as u64 - 1) as usize)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn roll(&mut self) -> f64 {
        (**self).roll()
    }
}

/// Uniformly chosen element of `items`.
pub fn pick<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
{
    rng.pick_index(items.len()).map(|i| &items[i])
}
