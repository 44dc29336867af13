use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record::cigar::{Op, op::Kind};

use super::orientation::{EdgeType, PairOrientation, classify_edge, classify_orientation};

/// Level of a record that has not been given a display row.
pub const UNASSIGNED: i32 = -1;
/// Level of a record that takes no part in layout (e.g. unmapped).
pub const EXCLUDED: i32 = -2;

/// Locus-base rank of a record that does not cover the sort locus.
pub const LOCUS_NOT_COVERED: u8 = u8::MAX;
/// Locus-base rank of an ambiguous base, or of a record without a sequence.
pub const LOCUS_OTHER: u8 = 4;
/// Locus-base rank of a record with a deletion or skip over the sort locus.
pub const LOCUS_DELETED: u8 = 5;

///
/// The fields an alignment decoder supplies for one alignment.
///
/// Positions are 0-based. Reference ids index whatever reference dictionary
/// the decoder uses; only equality between them matters here.
///
#[derive(Debug, Clone)]
pub struct RawAlignment {
    pub qname: String,
    pub flags: Flags,
    pub reference_id: Option<usize>,
    pub position: i64,
    pub mapping_quality: u8,
    pub cigar: Vec<Op>,
    pub mate_reference_id: Option<usize>,
    pub mate_position: i64,
    /// Whether the record carries an `SA` (supplementary alignment) tag.
    pub has_sa_tag: bool,
    /// Value of the `HP` tag, if any.
    pub haplotype: Option<u32>,
    pub sequence: Vec<u8>,
}

/// A run of reference positions `[start, end)` aligned base-to-base with the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: i64,
    pub end: i64,
    /// Offset into the read sequence of the base aligned to `start`.
    pub query_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// Reference position the inserted bases sit before.
    pub position: i64,
    pub len: u32,
}

/// Keys the layout engine partitions and orders records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub reverse: bool,
    pub haplotype: u32,
    pub locus_base: u8,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey {
            reverse: false,
            haplotype: 0,
            locus_base: LOCUS_NOT_COVERED,
        }
    }
}

///
/// A decoded genomic alignment.
///
/// Created from a [`RawAlignment`]; the layout engine only ever writes
/// [`level`](AlignmentRecord::level) (and the layout span when linking widens it).
///
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    pub qname: String,
    pub flags: Flags,
    pub reference_id: Option<usize>,
    pub position: i64,
    pub reference_end: i64,
    pub mapping_quality: u8,
    pub blocks: Vec<Block>,
    pub left_soft_clip: u32,
    pub right_soft_clip: u32,
    pub insertions: Vec<Insertion>,
    pub orientation: PairOrientation,
    pub edge: EdgeType,
    pub has_sa_tag: bool,
    pub sort_key: SortKey,
    /// Layout span `[cov_start, cov_end)`.
    pub cov_start: i64,
    pub cov_end: i64,
    pub level: i32,
    pub sequence: Vec<u8>,
}

impl Default for AlignmentRecord {
    fn default() -> Self {
        AlignmentRecord {
            qname: String::new(),
            flags: Flags::empty(),
            reference_id: None,
            position: 0,
            reference_end: 0,
            mapping_quality: 0,
            blocks: Vec::new(),
            left_soft_clip: 0,
            right_soft_clip: 0,
            insertions: Vec::new(),
            orientation: PairOrientation::Normal,
            edge: EdgeType::Normal,
            has_sa_tag: false,
            sort_key: SortKey::default(),
            cov_start: 0,
            cov_end: 0,
            level: UNASSIGNED,
            sequence: Vec::new(),
        }
    }
}

impl AlignmentRecord {
    ///
    /// Decode a raw alignment.
    ///
    /// Match-like operations (`M`, `=`, `X`) extend the current block; `D`, `N`
    /// and `I` close it. Soft clips before the first reference-consuming
    /// operation count as the left clip, all others as the right clip.
    ///
    pub fn from_raw(raw: &RawAlignment) -> Self {
        let mut blocks: Vec<Block> = Vec::new();
        let mut insertions: Vec<Insertion> = Vec::new();
        let mut left_soft_clip = 0u32;
        let mut right_soft_clip = 0u32;

        let mut ref_pos = raw.position;
        let mut query_pos = 0usize;
        let mut open: Option<Block> = None;
        let mut consumed_reference = false;

        for op in raw.cigar.iter() {
            let len = op.len();
            match op.kind() {
                Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                    match open.as_mut() {
                        Some(block) => block.end += len as i64,
                        None => {
                            open = Some(Block {
                                start: ref_pos,
                                end: ref_pos + len as i64,
                                query_start: query_pos,
                            })
                        }
                    }
                    ref_pos += len as i64;
                    query_pos += len;
                    consumed_reference = true;
                }
                Kind::Deletion | Kind::Skip => {
                    blocks.extend(open.take());
                    ref_pos += len as i64;
                    consumed_reference = true;
                }
                Kind::Insertion => {
                    blocks.extend(open.take());
                    insertions.push(Insertion {
                        position: ref_pos,
                        len: len as u32,
                    });
                    query_pos += len;
                }
                Kind::SoftClip => {
                    if consumed_reference {
                        right_soft_clip += len as u32;
                    } else {
                        left_soft_clip += len as u32;
                    }
                    query_pos += len;
                }
                Kind::HardClip | Kind::Pad => {}
            }
        }
        blocks.extend(open);

        let same_reference = raw.reference_id.is_some() && raw.reference_id == raw.mate_reference_id;
        let orientation =
            classify_orientation(raw.flags, same_reference, raw.position, raw.mate_position);
        let edge = classify_edge(raw.flags, raw.has_sa_tag);

        let level = match raw.flags.is_unmapped() || raw.reference_id.is_none() {
            true => EXCLUDED,
            false => UNASSIGNED,
        };

        let mut record = AlignmentRecord {
            qname: raw.qname.clone(),
            flags: raw.flags,
            reference_id: raw.reference_id,
            position: raw.position,
            reference_end: ref_pos,
            mapping_quality: raw.mapping_quality,
            blocks,
            left_soft_clip,
            right_soft_clip,
            insertions,
            orientation,
            edge,
            has_sa_tag: raw.has_sa_tag,
            sort_key: SortKey {
                reverse: raw.flags.is_reverse_complemented(),
                haplotype: raw.haplotype.unwrap_or(0),
                locus_base: LOCUS_NOT_COVERED,
            },
            cov_start: 0,
            cov_end: 0,
            level,
            sequence: raw.sequence.clone(),
        };
        record.set_layout_span(false);
        record
    }

    ///
    /// Recompute the layout span, optionally widened by the soft clips.
    ///
    /// The span always covers at least one position.
    ///
    pub fn set_layout_span(&mut self, show_soft_clips: bool) {
        let (start, end) = match show_soft_clips {
            true => (
                self.position - self.left_soft_clip as i64,
                self.reference_end + self.right_soft_clip as i64,
            ),
            false => (self.position, self.reference_end),
        };
        self.cov_start = start;
        self.cov_end = end.max(start + 1);
    }

    pub fn is_reverse(&self) -> bool {
        self.sort_key.reverse
    }

    /// Records in a proper pair without split alignments carry no link.
    pub fn is_split_or_discordant(&self) -> bool {
        self.edge == EdgeType::Split
            || (self.flags.is_segmented() && !self.flags.is_properly_segmented())
    }

    ///
    /// The read base aligned to a reference position.
    ///
    /// Returns `None` outside the aligned blocks (clips, deletions, skips) or
    /// when the record carries no sequence.
    ///
    pub fn base_at(&self, position: i64) -> Option<u8> {
        let block = self.block_at(position)?;
        let offset = block.query_start + (position - block.start) as usize;
        self.sequence.get(offset).copied()
    }

    /// The aligned block holding a reference position.
    pub fn block_at(&self, position: i64) -> Option<&Block> {
        let i = self.blocks.partition_point(|b| b.end <= position);
        self.blocks.get(i).filter(|block| position >= block.start)
    }

    ///
    /// Set the locus-base sort key for a sort locus.
    ///
    /// Bases rank `A < C < G < T < N`, then deletions, then records that do not
    /// span the locus at all. A record without a sequence that aligns to the
    /// locus ranks with `N`.
    ///
    pub fn set_locus_base(&mut self, locus: i64) {
        self.sort_key.locus_base = if locus < self.position || locus >= self.reference_end {
            LOCUS_NOT_COVERED
        } else if self.block_at(locus).is_none() {
            LOCUS_DELETED
        } else {
            self.base_at(locus).map_or(LOCUS_OTHER, base_rank)
        };
    }
}

fn base_rank(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' => 3,
        _ => LOCUS_OTHER,
    }
}
