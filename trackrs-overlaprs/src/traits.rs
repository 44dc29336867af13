use num_traits::PrimInt;

pub use trackrs_core::models::Interval;

/// A static overlap structure over closed intervals.
pub trait Overlapper<S, T>: Send + Sync
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Build a ready-to-query structure from a batch of intervals.
    fn from_intervals(intervals: Vec<Interval<S, T>>) -> Self
    where
        Self: Sized;

    fn find(&self, start: S, end: S) -> Vec<Interval<S, T>>;

    fn find_iter<'a>(
        &'a self,
        start: S,
        end: S,
    ) -> Box<dyn Iterator<Item = Interval<S, &'a T>> + 'a>;

    fn count(&self, start: S, end: S) -> usize {
        self.find_iter(start, end).count()
    }
}
