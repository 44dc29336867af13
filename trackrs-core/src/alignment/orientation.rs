//! Pair orientation and link/edge classification.
//!
//! The pair orientation of a paired read is a pure function of four bits:
//! whether the pair is proper, the strands of the read and its mate, and
//! which of the two sits leftmost on the reference.
use noodles::sam::alignment::record::Flags;

/// Structural interpretation of a read pair's relative orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairOrientation {
    #[default]
    Normal,
    DeletionLike,
    InversionForward,
    InversionReverse,
    DuplicationLike,
    Translocation,
}

/// How a record links to other records of the same template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeType {
    #[default]
    Normal,
    Split,
    MateUnmapped,
}

/// The bit pattern a pair orientation is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairBits(u8);

impl PairBits {
    pub const PROPER: u8 = 0b0001;
    pub const READ_REVERSE: u8 = 0b0010;
    pub const MATE_REVERSE: u8 = 0b0100;
    pub const READ_LEFTMOST: u8 = 0b1000;

    pub fn new(proper: bool, read_reverse: bool, mate_reverse: bool, read_leftmost: bool) -> Self {
        let mut bits = 0;
        if proper {
            bits |= Self::PROPER;
        }
        if read_reverse {
            bits |= Self::READ_REVERSE;
        }
        if mate_reverse {
            bits |= Self::MATE_REVERSE;
        }
        if read_leftmost {
            bits |= Self::READ_LEFTMOST;
        }
        PairBits(bits)
    }

    /// Build the pattern from SAM flags and the read/mate leftmost positions.
    ///
    /// When both mates start at the same position the forward-strand mate is
    /// treated as leftmost, so both mates of a pair classify identically.
    pub fn from_flags(flags: Flags, position: i64, mate_position: i64) -> Self {
        let read_reverse = flags.is_reverse_complemented();
        let read_leftmost =
            position < mate_position || (position == mate_position && !read_reverse);
        PairBits::new(
            flags.is_properly_segmented(),
            read_reverse,
            flags.is_mate_reverse_complemented(),
            read_leftmost,
        )
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// Classify a same-reference pair from its bit pattern.
pub fn classify_pair(bits: PairBits) -> PairOrientation {
    let read_reverse = bits.has(PairBits::READ_REVERSE);
    let mate_reverse = bits.has(PairBits::MATE_REVERSE);
    let (left_reverse, right_reverse) = match bits.has(PairBits::READ_LEFTMOST) {
        true => (read_reverse, mate_reverse),
        false => (mate_reverse, read_reverse),
    };

    match (left_reverse, right_reverse) {
        (false, true) if bits.has(PairBits::PROPER) => PairOrientation::Normal,
        (false, true) => PairOrientation::DeletionLike,
        (true, false) => PairOrientation::DuplicationLike,
        (false, false) => PairOrientation::InversionForward,
        (true, true) => PairOrientation::InversionReverse,
    }
}

///
/// Classify the orientation of a record.
///
/// Unpaired records, and pairs with either mate unmapped, are always `Normal`;
/// mates mapped to different references are always `Translocation`.
///
pub fn classify_orientation(
    flags: Flags,
    same_reference: bool,
    position: i64,
    mate_position: i64,
) -> PairOrientation {
    if !flags.is_segmented() || flags.is_unmapped() || flags.is_mate_unmapped() {
        return PairOrientation::Normal;
    }
    if !same_reference {
        return PairOrientation::Translocation;
    }
    classify_pair(PairBits::from_flags(flags, position, mate_position))
}

/// Split alignments (supplementary or carrying an SA tag) take precedence over
/// an unmapped mate.
pub fn classify_edge(flags: Flags, has_sa_tag: bool) -> EdgeType {
    if flags.is_supplementary() || has_sa_tag {
        EdgeType::Split
    } else if flags.is_segmented() && flags.is_mate_unmapped() {
        EdgeType::MateUnmapped
    } else {
        EdgeType::Normal
    }
}
