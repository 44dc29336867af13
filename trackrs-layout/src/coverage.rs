//! Per-base read depth over a window.
use trackrs_core::alignment::{AlignmentRecord, EXCLUDED};

///
/// Accumulates the depth curve of a half-open window `[start, end)`.
///
/// Blocks are recorded in a difference array and resolved by one prefix sum in
/// [`finish`](CoverageAccumulator::finish). Block parts outside the window are
/// clipped away.
///
#[derive(Debug, Clone)]
pub struct CoverageAccumulator {
    start: i64,
    end: i64,
    diff: Vec<i32>,
}

impl CoverageAccumulator {
    pub fn new(start: i64, end: i64) -> Self {
        let width = (end - start).max(0) as usize;
        CoverageAccumulator {
            start,
            end: start + width as i64,
            diff: vec![0; width + 1],
        }
    }

    pub fn width(&self) -> usize {
        self.diff.len() - 1
    }

    pub fn add_block(&mut self, start: i64, end: i64) {
        let start = start.max(self.start);
        let end = end.min(self.end);
        if start >= end {
            return;
        }
        self.diff[(start - self.start) as usize] += 1;
        self.diff[(end - self.start) as usize] -= 1;
    }

    /// Add every aligned block of a record. Excluded records contribute nothing.
    pub fn add_record(&mut self, record: &AlignmentRecord) {
        if record.level == EXCLUDED {
            return;
        }
        for block in record.blocks.iter() {
            self.add_block(block.start, block.end);
        }
    }

    fn depths(&self) -> impl Iterator<Item = u32> + '_ {
        self.diff[..self.width()].iter().scan(0i32, |depth, d| {
            *depth += d;
            Some((*depth).max(0) as u32)
        })
    }

    pub fn max_depth(&self) -> u32 {
        self.depths().max().unwrap_or(0)
    }

    /// Depth at every position of the window.
    pub fn finish(self) -> Vec<u32> {
        self.depths().collect()
    }
}

/// Depth curve of `records` over `[start, end)`.
pub fn collect_coverage<'a, I>(start: i64, end: i64, records: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a AlignmentRecord>,
{
    let mut acc = CoverageAccumulator::new(start, end);
    for record in records {
        acc.add_record(record);
    }
    acc.finish()
}
