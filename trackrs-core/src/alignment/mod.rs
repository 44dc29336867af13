pub mod decode;
pub mod orientation;
pub mod record;

// re-exports
pub use self::decode::{decode_records, parse_cigar, raw_alignment};
pub use self::orientation::{EdgeType, PairBits, PairOrientation};
pub use self::record::{
    AlignmentRecord, Block, EXCLUDED, Insertion, RawAlignment, SortKey, UNASSIGNED,
};
pub use noodles::sam::alignment::record::Flags;
pub use noodles::sam::alignment::record::cigar::{Op, op::Kind};
