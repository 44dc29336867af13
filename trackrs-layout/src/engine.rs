use std::ops::AddAssign;

use fxhash::FxHashMap as HashMap;
use log::{debug, warn};

use trackrs_core::alignment::{AlignmentRecord, EXCLUDED, UNASSIGNED};

use crate::config::{LayoutConfig, LinkMode, SortMode};
use crate::frontier::LevelPartition;

/// Outcome counts of one placement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementSummary {
    /// Records given a visible level.
    pub placed: usize,
    /// Records on rows scrolled off the top of the view.
    pub above: usize,
    /// Records that did not fit in any row.
    pub hidden: usize,
    /// Records that take no part in layout.
    pub excluded: usize,
}

impl PlacementSummary {
    pub fn total(&self) -> usize {
        self.placed + self.above + self.hidden + self.excluded
    }
}

impl AddAssign for PlacementSummary {
    fn add_assign(&mut self, other: Self) {
        self.placed += other.placed;
        self.above += other.above;
        self.hidden += other.hidden;
        self.excluded += other.excluded;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}

/// The row a template holds in one category and the span reserved on it.
#[derive(Debug, Clone, Copy)]
struct LinkedRow {
    category: u32,
    row: usize,
    start: i64,
    end: i64,
}

enum Slot {
    Row(usize),
    Full,
}

///
/// Greedy first-fit packing of alignment records into display rows.
///
/// Records are placed in position order (or by the base at the sort locus in
/// the locus sort modes) on the topmost row of their category with room for
/// their layout span. Only [`level`](AlignmentRecord::level) is written, plus
/// the layout span of linked records, which is widened to the span of their
/// whole template.
///
/// The frontier survives between calls, so a view that pans can be extended
/// with [`extend_right`](LayoutEngine::extend_right) and
/// [`extend_left`](LayoutEngine::extend_left) instead of being placed again.
/// Any setting change clears it.
///
/// # Examples
///
/// ```
/// use trackrs_layout::{LayoutConfig, LayoutEngine};
/// use trackrs_core::alignment::AlignmentRecord;
///
/// let mut records: Vec<AlignmentRecord> = [(100, 150), (120, 170), (160, 200)]
///     .into_iter()
///     .map(|(start, end)| AlignmentRecord {
///         position: start,
///         reference_end: end,
///         level: -1,
///         ..Default::default()
///     })
///     .collect();
///
/// let mut engine = LayoutEngine::new(LayoutConfig::default());
/// let summary = engine.place(&mut records);
///
/// let levels: Vec<i32> = records.iter().map(|r| r.level).collect();
/// assert_eq!(levels, vec![0, 1, 0]);
/// assert_eq!(summary.placed, 3);
/// ```
///
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    frontier: LevelPartition,
    links: HashMap<String, Vec<LinkedRow>>,
    warned_categories: bool,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let rows = config.row_budget + config.scroll_offset;
        LayoutEngine {
            config,
            frontier: LevelPartition::new(rows),
            links: HashMap::default(),
            warned_categories: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Categories seen since the last reset, in the order their rows were allocated.
    pub fn categories(&self) -> &[u32] {
        self.frontier.categories()
    }

    /// Clear the frontier and the cached rows of linked templates.
    pub fn reset(&mut self) {
        self.frontier
            .resize(self.config.row_budget + self.config.scroll_offset);
        self.links.clear();
        self.warned_categories = false;
    }

    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        self.config.sort_mode = sort_mode;
        self.reset();
    }

    pub fn set_link_mode(&mut self, link_mode: LinkMode) {
        self.config.link_mode = link_mode;
        self.reset();
    }

    pub fn set_scroll_offset(&mut self, scroll_offset: usize) {
        self.config.scroll_offset = scroll_offset;
        self.reset();
    }

    pub fn set_row_budget(&mut self, row_budget: usize) {
        self.config.row_budget = row_budget;
        self.reset();
    }

    pub fn set_sort_locus(&mut self, sort_locus: Option<i64>) {
        self.config.sort_locus = sort_locus;
        self.reset();
    }

    pub fn set_show_soft_clips(&mut self, show_soft_clips: bool) {
        self.config.show_soft_clips = show_soft_clips;
        self.reset();
    }

    /// Place a whole view from scratch. `records` must be in position order.
    pub fn place(&mut self, records: &mut [AlignmentRecord]) -> PlacementSummary {
        self.reset();
        self.extend(records, Direction::Right)
    }

    /// Place records that continue the view to the right of what is already placed.
    pub fn extend_right(&mut self, records: &mut [AlignmentRecord]) -> PlacementSummary {
        self.extend(records, Direction::Right)
    }

    /// Place records that continue the view to the left. `records` stay in
    /// position order; they are placed from the rightmost one leftward.
    pub fn extend_left(&mut self, records: &mut [AlignmentRecord]) -> PlacementSummary {
        self.extend(records, Direction::Left)
    }

    fn extend(
        &mut self,
        records: &mut [AlignmentRecord],
        direction: Direction,
    ) -> PlacementSummary {
        let locus = match self.config.sort_mode.uses_locus() {
            true => self.config.sort_locus,
            false => None,
        };
        for record in records.iter_mut().filter(|r| r.level != EXCLUDED) {
            record.set_layout_span(self.config.show_soft_clips);
            if let Some(locus) = locus {
                record.set_locus_base(locus);
            }
        }

        let linked = self.widen_linked(records);
        let order = placement_order(records, direction, locus.is_some());

        let mut summary = PlacementSummary::default();
        for i in order {
            let record = &mut records[i];
            if record.level == EXCLUDED {
                summary.excluded += 1;
                continue;
            }
            match self.assign(record, linked[i]) {
                Slot::Row(row) if row >= self.config.scroll_offset => {
                    record.level = (row - self.config.scroll_offset) as i32;
                    summary.placed += 1;
                }
                Slot::Row(_) => {
                    record.level = UNASSIGNED;
                    summary.above += 1;
                }
                Slot::Full => {
                    record.level = UNASSIGNED;
                    summary.hidden += 1;
                }
            }
        }

        debug!(
            "placed {} records: {} visible, {} above, {} hidden, {} excluded",
            summary.total(),
            summary.placed,
            summary.above,
            summary.hidden,
            summary.excluded
        );
        summary
    }

    ///
    /// Widen the layout span of every multi-member template to the span of the
    /// whole template, per category. Returns which records are linked.
    ///
    fn widen_linked(&self, records: &mut [AlignmentRecord]) -> Vec<bool> {
        let mut linked = vec![false; records.len()];
        if self.config.link_mode == LinkMode::None {
            return linked;
        }

        let mut group_of: Vec<Option<usize>> = vec![None; records.len()];
        let mut spans: Vec<(i64, i64, usize)> = Vec::new();
        {
            let mut groups: HashMap<(&str, u32), usize> = HashMap::default();
            for (i, record) in records.iter().enumerate() {
                if record.level == EXCLUDED || !self.config.link_mode.links(record) {
                    continue;
                }
                linked[i] = true;
                let key = (record.qname.as_str(), self.config.sort_mode.category(record));
                let group = *groups.entry(key).or_insert_with(|| {
                    spans.push((record.cov_start, record.cov_end, 0));
                    spans.len() - 1
                });
                let span = &mut spans[group];
                span.0 = span.0.min(record.cov_start);
                span.1 = span.1.max(record.cov_end);
                span.2 += 1;
                group_of[i] = Some(group);
            }
        }

        for (record, group) in records.iter_mut().zip(group_of) {
            if let Some((start, end, members)) = group.map(|g| spans[g]) {
                if members > 1 {
                    record.cov_start = start;
                    record.cov_end = end;
                }
            }
        }
        linked
    }

    fn assign(&mut self, record: &AlignmentRecord, linked: bool) -> Slot {
        let category = self.config.sort_mode.category(record);
        let slot = self.frontier.slot(category);
        if !self.warned_categories && self.frontier.len() > self.config.max_categories {
            warn!(
                "sort mode {:?} produced more than {} categories",
                self.config.sort_mode, self.config.max_categories
            );
            self.warned_categories = true;
        }

        let (start, end) = (record.cov_start, record.cov_end);
        let cached = match linked {
            true => self
                .links
                .get(&record.qname)
                .and_then(|rows| rows.iter().find(|l| l.category == category))
                .filter(|l| {
                    (start >= l.start && end <= l.end) || self.frontier.fits(slot, l.row, start, end)
                })
                .map(|l| l.row),
            false => None,
        };

        let Some(row) = cached.or_else(|| self.frontier.first_fit(slot, start, end)) else {
            return Slot::Full;
        };
        self.frontier.occupy(slot, row, start, end);
        if linked {
            self.remember_link(&record.qname, category, row, start, end);
        }
        Slot::Row(row)
    }

    fn remember_link(&mut self, qname: &str, category: u32, row: usize, start: i64, end: i64) {
        if !self.links.contains_key(qname) {
            self.links.insert(qname.to_string(), Vec::new());
        }
        let Some(rows) = self.links.get_mut(qname) else {
            return;
        };
        match rows.iter_mut().find(|l| l.category == category) {
            Some(link) if link.row == row => {
                link.start = link.start.min(start);
                link.end = link.end.max(end);
            }
            // the template moved rows; later members follow the latest one
            Some(link) => *link = LinkedRow { category, row, start, end },
            None => rows.push(LinkedRow { category, row, start, end }),
        }
    }
}

/// Indices of `records` in the order they are placed.
fn placement_order(records: &[AlignmentRecord], direction: Direction, by_locus: bool) -> Vec<usize> {
    let mut order: Vec<usize> = match direction {
        Direction::Right => (0..records.len()).collect(),
        Direction::Left => (0..records.len()).rev().collect(),
    };
    if by_locus {
        order.sort_by_key(|i| records[*i].sort_key.locus_base);
    }
    order
}
