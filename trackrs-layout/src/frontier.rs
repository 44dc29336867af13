//! Per-row occupancy for greedy packing.
use fxhash::FxHashMap as HashMap;
use log::debug;

/// `level_start` of a row nothing has been placed on.
const EMPTY_START: i64 = i64::MAX;
/// `level_end` of a row nothing has been placed on.
const EMPTY_END: i64 = i64::MIN;

///
/// The occupied envelope of every row, partitioned by category.
///
/// Each category owns a contiguous block of `rows` entries in the parallel
/// `level_start`/`level_end` arrays. Blocks are appended the first time a
/// category is seen, so the arrays only grow until [`clear`](LevelPartition::clear).
///
/// A row records the leftmost start and the rightmost (exclusive) end placed on
/// it. A span fits a row only if it lies entirely right or entirely left of that
/// envelope with at least one free position in between.
///
#[derive(Debug, Clone)]
pub struct LevelPartition {
    rows: usize,
    level_start: Vec<i64>,
    level_end: Vec<i64>,
    slots: HashMap<u32, usize>,
    order: Vec<u32>,
}

impl LevelPartition {
    pub fn new(rows: usize) -> Self {
        LevelPartition {
            rows,
            level_start: Vec::new(),
            level_end: Vec::new(),
            slots: HashMap::default(),
            order: Vec::new(),
        }
    }

    /// Rows per category.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Categories in the order they were first seen.
    pub fn categories(&self) -> &[u32] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every category and occupied row.
    pub fn clear(&mut self) {
        self.level_start.clear();
        self.level_end.clear();
        self.slots.clear();
        self.order.clear();
    }

    /// Drop all state and change the number of rows per category.
    pub fn resize(&mut self, rows: usize) {
        self.clear();
        self.rows = rows;
    }

    /// The slot of `category`, appending a fresh block of rows if it is new.
    pub fn slot(&mut self, category: u32) -> usize {
        if let Some(slot) = self.slots.get(&category) {
            return *slot;
        }
        let slot = self.order.len();
        self.slots.insert(category, slot);
        self.order.push(category);

        let len = self.level_start.len() + self.rows;
        self.level_start.resize(len, EMPTY_START);
        self.level_end.resize(len, EMPTY_END);
        debug!(
            "frontier grew to {} categories ({} rows)",
            self.order.len(),
            len
        );
        slot
    }

    #[inline]
    fn offset(&self, slot: usize, row: usize) -> usize {
        slot * self.rows + row
    }

    /// Whether `[start, end)` can be placed on `row` of `slot`.
    #[inline]
    pub fn fits(&self, slot: usize, row: usize, start: i64, end: i64) -> bool {
        let i = self.offset(slot, row);
        start > self.level_end[i] || end < self.level_start[i]
    }

    /// The topmost row of `slot` that `[start, end)` fits on.
    pub fn first_fit(&self, slot: usize, start: i64, end: i64) -> Option<usize> {
        (0..self.rows).find(|row| self.fits(slot, *row, start, end))
    }

    /// Mark `[start, end)` as occupied on `row` of `slot`.
    pub fn occupy(&mut self, slot: usize, row: usize, start: i64, end: i64) {
        let i = self.offset(slot, row);
        self.level_start[i] = self.level_start[i].min(start);
        self.level_end[i] = self.level_end[i].max(end);
    }

    /// The occupied envelope of a row, `None` if the row is empty.
    pub fn envelope(&self, slot: usize, row: usize) -> Option<(i64, i64)> {
        let i = self.offset(slot, row);
        match self.level_end[i] {
            EMPTY_END => None,
            end => Some((self.level_start[i], end)),
        }
    }
}
