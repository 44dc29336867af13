use num_traits::PrimInt;
use std::cmp::Ordering::{self};

/// Represent a closed range [start, end]
/// Both ends are inclusive, so a single-base feature has `start == end`.
#[derive(Eq, Debug, Clone)]
pub struct Interval<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: S,
    pub end: S,
    pub val: T,
}

/// Superset-first ordering: ascending start, ties broken by descending end.
impl<S, T> Ord for Interval<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<S, T>) -> Ordering {
        match self.start.cmp(&other.start) {
            Ordering::Less => Ordering::Less,
            Ordering::Greater => Ordering::Greater,
            Ordering::Equal => other.end.cmp(&self.end),
        }
    }
}

impl<S, T> Interval<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Check if this interval overlaps the closed range [start, end]
    #[inline]
    pub fn overlaps(&self, start: S, end: S) -> bool {
        self.start <= end && start <= self.end
    }

    #[inline]
    pub fn contains(&self, point: S) -> bool {
        self.start <= point && point <= self.end
    }

    /// Number of positions covered, counting both ends.
    #[inline]
    pub fn len(&self) -> S {
        if self.end < self.start {
            S::zero()
        } else {
            self.end - self.start + S::one()
        }
    }

    /// Intervals hold at least one position unless malformed (`start > end`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl<S, T> PartialOrd for Interval<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S, T> PartialEq for Interval<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<S, T>) -> bool {
        self.start == other.start && self.end == other.end && self.val == other.val
    }
}
