use std::cmp::{max, min};

use num_traits::PrimInt;

use super::Overlapper;
use trackrs_core::models::Interval;

/// Sentinel in `branch` for "no earlier interval ends at or after this one".
const NO_BRANCH: usize = usize::MAX;

/// A static, array-based interval overlap index over one coordinate space.
///
/// Intervals are closed (`[start, end]`) and stored as parallel arrays. After
/// [`build`](IntervalIndex::build) they are ordered by ascending start with ties
/// broken by descending end, so an interval always precedes any interval it
/// contains and starts together with. On top of that order, `branch[i]` holds
/// the nearest earlier index whose end is `>= ends[i]`. A query walks down
/// from the last interval starting at or before the query end; whenever it
/// meets an interval ending before the query start, every interval between
/// `branch[i]` and `i` ends even earlier, so the walk jumps straight to
/// `branch[i]`.
///
/// # Examples
///
/// ```
/// use trackrs_overlaprs::IntervalIndex;
///
/// let mut index = IntervalIndex::new();
/// index.add(1u32, 5, "a");
/// index.add(2, 3, "b");
/// index.add(4, 10, "c");
/// index.add(6, 8, "d");
/// index.build();
///
/// let mut hits = index.query(3, 4);
/// hits.sort();
/// assert_eq!(hits, vec![&"a", &"b", &"c"]);
/// ```
///
/// `add` after `build` leaves the index stale: queries return nothing until
/// `build` runs again.
#[derive(Debug, Clone)]
pub struct IntervalIndex<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    starts: Vec<S>,
    ends: Vec<S>,
    data: Vec<T>,
    branch: Vec<usize>,
    start_sorted: bool,
    end_sorted: bool,
    indexed: bool,
}

/// Number of overlapping intervals and the summed length of their clipped spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapCoverage<S> {
    pub count: usize,
    pub covered: S,
}

impl<S, T> Default for IntervalIndex<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> Overlapper<S, T> for IntervalIndex<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn from_intervals(intervals: Vec<Interval<S, T>>) -> Self
    where
        Self: Sized,
    {
        let mut index = IntervalIndex::with_capacity(intervals.len());
        for iv in intervals {
            index.add(iv.start, iv.end, iv.val);
        }
        index.build();
        index
    }

    fn find(&self, start: S, end: S) -> Vec<Interval<S, T>> {
        let mut results = Vec::new();
        self.walk(start, end, |i| {
            results.push(Interval {
                start: self.starts[i],
                end: self.ends[i],
                val: self.data[i].clone(),
            })
        });
        results
    }

    fn find_iter<'a>(
        &'a self,
        start: S,
        end: S,
    ) -> Box<dyn Iterator<Item = Interval<S, &'a T>> + 'a> {
        Box::new(self.search(start, end))
    }

    fn count(&self, start: S, end: S) -> usize {
        IntervalIndex::count(self, start, end)
    }
}

impl<S, T> IntervalIndex<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        IntervalIndex {
            starts: Vec::with_capacity(cap),
            ends: Vec::with_capacity(cap),
            data: Vec::with_capacity(cap),
            branch: Vec::new(),
            start_sorted: true,
            end_sorted: true,
            indexed: false,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.starts.reserve(additional);
        self.ends.reserve(additional);
        self.data.reserve(additional);
    }

    /// Drop every interval, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.starts.clear();
        self.ends.clear();
        self.data.clear();
        self.branch.clear();
        self.start_sorted = true;
        self.end_sorted = true;
        self.indexed = false;
    }

    /// Returns the number of intervals in the index.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns `true` if the index contains no intervals.
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Returns `true` once `build` has run with no `add` since.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    ///
    /// Append an interval. `start <= end` is the caller's responsibility.
    ///
    /// Only the previous entry is inspected to keep track of whether the data
    /// still arrives in index order, so `build` can skip sorting.
    ///
    pub fn add(&mut self, start: S, end: S, val: T) {
        if let (Some(&last_start), Some(&last_end)) = (self.starts.last(), self.ends.last()) {
            if start < last_start {
                self.start_sorted = false;
            } else if start == last_start && end > last_end {
                self.end_sorted = false;
            }
        }
        self.starts.push(start);
        self.ends.push(end);
        self.data.push(val);
        self.indexed = false;
    }

    ///
    /// Sort the intervals superset-first and compute the branch links.
    ///
    /// O(n log n) when intervals were added out of order, O(n) otherwise.
    /// Running it again without an intervening `add` changes nothing.
    ///
    pub fn build(&mut self) {
        if self.starts.is_empty() {
            self.branch.clear();
            self.indexed = true;
            return;
        }

        if !(self.start_sorted && self.end_sorted) {
            self.sort_superset_first();
        }
        self.start_sorted = true;
        self.end_sorted = true;

        let n = self.starts.len();
        self.branch.clear();
        self.branch.resize(n, NO_BRANCH);

        // (end, index) pairs, ends decreasing from bottom to top
        let mut stack: Vec<(S, usize)> = Vec::with_capacity(n / 10 + 1);
        for i in 0..n {
            let end = self.ends[i];
            while stack.last().is_some_and(|&(e, _)| e < end) {
                stack.pop();
            }
            if let Some(&(_, j)) = stack.last() {
                self.branch[i] = j;
            }
            stack.push((end, i));
        }

        self.indexed = true;
    }

    fn sort_superset_first(&mut self) {
        let data = std::mem::take(&mut self.data);
        let mut rows: Vec<(S, S, T)> = self
            .starts
            .drain(..)
            .zip(self.ends.drain(..))
            .zip(data)
            .map(|((s, e), v)| (s, e, v))
            .collect();

        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

        for (s, e, v) in rows {
            self.starts.push(s);
            self.ends.push(e);
            self.data.push(v);
        }
    }

    /// Index of the last start `<= value`, or 0 when every start is greater.
    #[inline]
    fn upper_bound(&self, value: S) -> usize {
        let mut idx = 0;
        let mut len = self.starts.len();
        while len > 1 {
            let half = len / 2;
            idx += usize::from(self.starts[idx + half] <= value) * half;
            len -= half;
        }
        idx
    }

    ///
    /// Call `emit` with the position of every interval overlapping
    /// `[start, end]`, in descending start order.
    ///
    /// Returns the number of positions the walk inspected.
    ///
    fn walk<F: FnMut(usize)>(&self, start: S, end: S, mut emit: F) -> usize {
        if !self.indexed || self.starts.is_empty() {
            return 0;
        }

        let mut visited = 0;
        let mut i = self.upper_bound(end);
        while i > 0 {
            visited += 1;
            if start <= self.ends[i] {
                emit(i);
                i -= 1;
            } else {
                let b = self.branch[i];
                if b >= i {
                    return visited;
                }
                i = b;
            }
        }

        visited += 1;
        if start <= self.ends[0] && self.starts[0] <= end {
            emit(0);
        }
        visited
    }

    /// Payloads of every interval overlapping `[start, end]`, in descending start order.
    pub fn query(&self, start: S, end: S) -> Vec<&T> {
        let mut found = Vec::new();
        self.walk(start, end, |i| found.push(&self.data[i]));
        found
    }

    /// Payloads of every interval containing `point`.
    pub fn stab(&self, point: S) -> Vec<&T> {
        self.query(point, point)
    }

    /// Positions (in indexed order) of every interval overlapping `[start, end]`.
    pub fn find_indexes(&self, start: S, end: S) -> Vec<usize> {
        let mut found = Vec::new();
        self.walk(start, end, |i| found.push(i));
        found
    }

    pub fn count(&self, start: S, end: S) -> usize {
        let mut count = 0;
        self.walk(start, end, |_| count += 1);
        count
    }

    pub fn any_overlaps(&self, start: S, end: S) -> bool {
        self.search(start, end).next().is_some()
    }

    ///
    /// Count the overlapping intervals and sum `min(end, qend) - max(start, qstart)`
    /// over them.
    ///
    pub fn coverage(&self, start: S, end: S) -> OverlapCoverage<S> {
        let mut cov = OverlapCoverage {
            count: 0,
            covered: S::zero(),
        };
        self.walk(start, end, |i| {
            cov.count += 1;
            cov.covered = cov.covered + (min(self.ends[i], end) - max(self.starts[i], start));
        });
        cov
    }

    ///
    /// Lazily iterate the intervals overlapping `[start, end]`.
    ///
    /// The iterator is single-pass; start a new search to iterate again.
    ///
    pub fn search(&self, start: S, end: S) -> IterFind<'_, S, T> {
        let cursor = match self.indexed && !self.starts.is_empty() {
            true => Some(self.upper_bound(end)),
            false => None,
        };
        IterFind {
            inner: self,
            cursor,
            start,
            end,
        }
    }

    /// All intervals, in indexed order once built.
    pub fn intervals(&self) -> impl Iterator<Item = Interval<S, &T>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    #[inline]
    fn get(&self, i: usize) -> Interval<S, &T> {
        Interval {
            start: self.starts[i],
            end: self.ends[i],
            val: &self.data[i],
        }
    }
}

/// A lazy search over an [`IntervalIndex`].
///
/// Created by [`IntervalIndex::search`] (or [`Overlapper::find_iter`]); yields
/// overlapping intervals in descending start order, carrying its own cursor so
/// any number of searches can run over one shared index.
#[derive(Debug)]
pub struct IterFind<'a, S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    inner: &'a IntervalIndex<S, T>,
    cursor: Option<usize>,
    start: S,
    end: S,
}

impl<'a, S, T> Iterator for IterFind<'a, S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    type Item = Interval<S, &'a T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.inner;
        loop {
            let i = self.cursor?;
            if i == 0 {
                self.cursor = None;
                let hit = self.start <= index.ends[0] && index.starts[0] <= self.end;
                return hit.then(|| index.get(0));
            }
            if self.start <= index.ends[i] {
                self.cursor = Some(i - 1);
                return Some(index.get(i));
            }
            let b = index.branch[i];
            if b >= i {
                self.cursor = None;
                return None;
            }
            self.cursor = Some(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn scenario() -> IntervalIndex<u32, &'static str> {
        let mut index = IntervalIndex::new();
        index.add(1, 5, "a");
        index.add(2, 3, "b");
        index.add(4, 10, "c");
        index.add(6, 8, "d");
        index.build();
        index
    }

    fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
        v.sort();
        v
    }

    #[rstest]
    fn test_query_excludes_non_overlapping(scenario: IntervalIndex<u32, &'static str>) {
        assert_eq!(sorted(scenario.query(3, 4)), vec![&"a", &"b", &"c"]);
    }

    #[rstest]
    fn test_emission_is_descending_start(scenario: IntervalIndex<u32, &'static str>) {
        let starts: Vec<u32> = scenario.search(0, 20).map(|iv| iv.start).collect();
        assert_eq!(starts, vec![6, 4, 2, 1]);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(11, 50, 0)]
    #[case(10, 10, 1)]
    #[case(5, 6, 3)]
    #[case(1, 1, 1)]
    fn test_count(
        scenario: IntervalIndex<u32, &'static str>,
        #[case] start: u32,
        #[case] end: u32,
        #[case] expected: usize,
    ) {
        assert_eq!(scenario.count(start, end), expected);
        assert_eq!(scenario.search(start, end).count(), expected);
        assert_eq!(scenario.any_overlaps(start, end), expected > 0);
    }

    #[rstest]
    fn test_stab(scenario: IntervalIndex<u32, &'static str>) {
        assert_eq!(sorted(scenario.stab(7)), vec![&"c", &"d"]);
        assert_eq!(sorted(scenario.stab(5)), vec![&"a", &"c"]);
    }

    #[rstest]
    fn test_coverage(scenario: IntervalIndex<u32, &'static str>) {
        // a: min(5,4)-max(1,3)=1, b: min(3,4)-max(2,3)=0, c: min(10,4)-max(4,3)=0
        let cov = scenario.coverage(3, 4);
        assert_eq!(cov.count, 3);
        assert_eq!(cov.covered, 1);
    }

    #[rstest]
    fn test_superset_precedes_subset() {
        let mut index = IntervalIndex::new();
        index.add(5, 6, 0);
        index.add(1, 3, 1);
        index.add(1, 10, 2);
        index.add(1, 5, 3);
        index.build();
        let spans: Vec<(i32, i32)> = index.intervals().map(|iv| (iv.start, iv.end)).collect();
        assert_eq!(spans, vec![(1, 10), (1, 5), (1, 3), (5, 6)]);
        assert_eq!(index.branch, vec![NO_BRANCH, 0, 1, 0]);
    }

    #[rstest]
    fn test_sorted_flags() {
        let mut index: IntervalIndex<i64, ()> = IntervalIndex::new();
        index.add(1, 5, ());
        index.add(1, 4, ());
        index.add(3, 9, ());
        assert_eq!((index.start_sorted, index.end_sorted), (true, true));
        index.add(3, 12, ());
        assert_eq!((index.start_sorted, index.end_sorted), (true, false));
        index.add(2, 3, ());
        assert_eq!(index.start_sorted, false);
    }

    #[rstest]
    fn test_query_before_build_is_empty() {
        let mut index = IntervalIndex::new();
        index.add(1u32, 5, "a");
        assert_eq!(index.query(1, 5).is_empty(), true);
        assert_eq!(index.search(1, 5).next(), None);

        index.build();
        assert_eq!(index.query(1, 5), vec![&"a"]);

        // stale again until rebuilt
        index.add(2, 3, "b");
        assert_eq!(index.is_indexed(), false);
        assert_eq!(index.count(1, 5), 0);
        index.build();
        assert_eq!(index.count(1, 5), 2);
    }

    #[rstest]
    fn test_build_empty_is_noop() {
        let mut index: IntervalIndex<u32, ()> = IntervalIndex::new();
        index.build();
        assert_eq!(index.is_empty(), true);
        assert_eq!(index.query(0, 100).is_empty(), true);
    }

    #[rstest]
    fn test_build_twice_is_idempotent(scenario: IntervalIndex<u32, &'static str>) {
        let mut again = scenario.clone();
        again.build();
        assert_eq!(again.starts, scenario.starts);
        assert_eq!(again.ends, scenario.ends);
        assert_eq!(again.data, scenario.data);
        assert_eq!(again.branch, scenario.branch);
    }

    #[rstest]
    fn test_nested_midpoint_visits_only_ancestors() {
        let mut index = IntervalIndex::new();
        for i in 0..500u32 {
            index.add(i, 1000 - i, i);
        }
        index.build();

        let mut hits = 0;
        let visited = index.walk(500, 500, |_| hits += 1);
        assert_eq!(hits, 500);
        assert_eq!(visited, 500);
    }

    #[rstest]
    fn test_branch_skips_contained_intervals() {
        let mut index = IntervalIndex::new();
        index.add(0u32, 10_000, 0u32);
        for k in 1..1000u32 {
            index.add(2 * k, 2 * k + 1, k);
        }
        index.build();

        let mut found = Vec::new();
        let visited = index.walk(9_990, 9_995, |i| found.push(i));
        assert_eq!(found, vec![0]);
        assert_eq!(visited, 2);
    }

    #[rstest]
    fn test_query_before_first_start() {
        let mut index = IntervalIndex::new();
        index.add(10i32, 20, ());
        index.add(30, 40, ());
        index.build();
        assert_eq!(index.count(0, 9), 0);
        assert_eq!(index.count(-5, 10), 1);
        assert_eq!(index.find_indexes(15, 35), vec![1, 0]);
    }

    #[rstest]
    fn test_overlapper_trait() {
        let intervals = vec![
            Interval { start: 100u32, end: 199, val: "gene1" },
            Interval { start: 150, end: 299, val: "gene2" },
            Interval { start: 400, end: 499, val: "gene3" },
        ];
        let index = <IntervalIndex<u32, &str> as Overlapper<u32, &str>>::from_intervals(intervals);
        let vals: Vec<&str> = Overlapper::find(&index, 180, 250)
            .into_iter()
            .map(|iv| iv.val)
            .collect();
        assert_eq!(vals, vec!["gene2", "gene1"]);
        assert_eq!(Overlapper::find_iter(&index, 300, 399).count(), 0);
        assert_eq!(Overlapper::count(&index, 0, 1000), 3);
    }

    #[rstest]
    fn test_clear() {
        let mut index = IntervalIndex::new();
        index.add(5u32, 6, ());
        index.add(1, 2, ());
        index.build();
        index.clear();
        assert_eq!(index.is_empty(), true);
        assert_eq!(index.is_indexed(), false);
        index.add(1, 2, ());
        assert_eq!(index.start_sorted, true);
    }
}
