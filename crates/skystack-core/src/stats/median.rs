use std::cmp::Ordering;

/// Float types a median can be taken over.
pub trait MedianSample: Copy {
    const NAN: Self;
    fn order(&self, other: &Self) -> Ordering;
    fn halfway(self, other: Self) -> Self;
}

impl MedianSample for f64 {
    const NAN: Self = f64::NAN;
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
    fn halfway(self, other: Self) -> Self {
        (self + other) / 2.0
    }
}

impl MedianSample for f32 {
    const NAN: Self = f32::NAN;
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
    fn halfway(self, other: Self) -> Self {
        (self + other) / 2.0
    }
}

/// Median of a mutable slice, reordering it in place.
///
/// Uses `select_nth_unstable` for O(n) selection. Even counts return the mean
/// of the two middle values. Returns NaN for an empty slice.
pub fn median<T: MedianSample>(values: &mut [T]) -> T {
    let n = values.len();
    if n == 0 {
        return T::NAN;
    }
    if n == 1 {
        return values[0];
    }
    let mid = n / 2;
    let upper = *values.select_nth_unstable_by(mid, |a, b| a.order(b)).1;
    if n % 2 == 1 {
        upper
    } else {
        let lower = *values[..mid]
            .select_nth_unstable_by(mid - 1, |a, b| a.order(b))
            .1;
        lower.halfway(upper)
    }
}

pub fn median_f64(values: &mut [f64]) -> f64 {
    median(values)
}

/// Per-pixel stacks are f32.
pub fn median_f32(values: &mut [f32]) -> f32 {
    median(values)
}
