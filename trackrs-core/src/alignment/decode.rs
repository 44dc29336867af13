//! Turning decoder output into [`AlignmentRecord`]s.
//!
//! Records come from any noodles [`Record`] (text SAM here) and are lowered to
//! [`RawAlignment`]s, which are then decoded in parallel: the output array is
//! sized up front and split into disjoint chunks, each filled by one rayon task.
use std::io;

use log::{debug, warn};
use noodles::sam::{self, Header};
use noodles::sam::alignment::Record;
use noodles::sam::alignment::record::cigar::Op;
use noodles::sam::alignment::record::data::field::{Tag, Value};
use rayon::prelude::*;

use super::record::{AlignmentRecord, RawAlignment};
use crate::errors::DecodeError;

/// Minimum records handed to one task.
const MIN_CHUNK: usize = 256;

/// Haplotype tag written by phasing tools.
const HAPLOTYPE: Tag = Tag::new(b'H', b'P');
const OTHER_ALIGNMENTS: Tag = Tag::new(b'S', b'A');

/// Mapping quality noodles reports as missing.
const MISSING_MAPPING_QUALITY: u8 = 255;

///
/// Decode raw alignments into records, preserving input order.
///
/// # Arguments
/// - raws: decoder output
/// - threads: size of a dedicated pool; `0` runs on the global rayon pool
///
pub fn decode_records(
    raws: &[RawAlignment],
    threads: usize,
) -> Result<Vec<AlignmentRecord>, DecodeError> {
    let mut records = vec![AlignmentRecord::default(); raws.len()];
    if raws.is_empty() {
        return Ok(records);
    }

    let fill = |records: &mut [AlignmentRecord]| {
        let chunk = chunk_size(raws.len(), rayon::current_num_threads());
        records
            .par_chunks_mut(chunk)
            .zip(raws.par_chunks(chunk))
            .for_each(|(out, input)| {
                for (slot, raw) in out.iter_mut().zip(input) {
                    *slot = AlignmentRecord::from_raw(raw);
                }
            });
    };

    match threads {
        0 => fill(&mut records),
        n => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|err| DecodeError::ThreadPool(err.to_string()))?;
            pool.install(|| fill(&mut records));
        }
    }

    debug!("decoded {} alignment records", records.len());
    Ok(records)
}

fn chunk_size(len: usize, threads: usize) -> usize {
    len.div_ceil(threads.max(1) * 4).max(MIN_CHUNK)
}

///
/// Parse a text CIGAR string such as `5S90M2D5M`. `*` is an empty CIGAR.
///
pub fn parse_cigar(s: &str) -> Result<Vec<Op>, DecodeError> {
    if s == "*" {
        return Ok(Vec::new());
    }
    sam::record::Cigar::new(s.as_bytes())
        .iter()
        .collect::<Result<Vec<Op>, _>>()
        .map_err(|err| DecodeError::InvalidCigar(format!("{s}: {err}")))
}

///
/// Lower a noodles alignment record to the fields a [`RawAlignment`] carries.
///
/// Reference ids are indices into the header's reference sequences. Of the
/// data fields only `SA` and `HP` are looked at.
///
pub fn raw_alignment(record: &dyn Record, header: &Header) -> io::Result<RawAlignment> {
    let cigar = record.cigar().iter().collect::<io::Result<Vec<Op>>>()?;
    let data = record.data();

    Ok(RawAlignment {
        qname: record.name().map(|name| name.to_string()).unwrap_or_default(),
        flags: record.flags()?,
        reference_id: record.reference_sequence_id(header).transpose()?,
        position: record
            .alignment_start()
            .transpose()?
            .map_or(0, |p| p.get() as i64 - 1),
        mapping_quality: record
            .mapping_quality()
            .transpose()?
            .map_or(MISSING_MAPPING_QUALITY, |mq| mq.get()),
        cigar,
        mate_reference_id: record.mate_reference_sequence_id(header).transpose()?,
        mate_position: record
            .mate_alignment_start()
            .transpose()?
            .map_or(0, |p| p.get() as i64 - 1),
        has_sa_tag: data.get(&OTHER_ALIGNMENTS).is_some(),
        haplotype: data.get(&HAPLOTYPE).transpose()?.and_then(|value| haplotype(&value)),
        sequence: record.sequence().iter().collect(),
    })
}

/// Haplotype number of an `HP` value, integer-typed or numeric text.
fn haplotype(value: &Value<'_>) -> Option<u32> {
    let n = match value {
        Value::String(s) => std::str::from_utf8(s).ok().and_then(|s| s.trim().parse::<i64>().ok()),
        Value::Character(c) => char::from(*c).to_digit(10).map(i64::from),
        other => other.as_int(),
    };
    match n.and_then(|n| u32::try_from(n).ok()) {
        Some(n) => Some(n),
        None => {
            warn!("ignoring unusable HP tag value {:?}", value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::orientation::{EdgeType, PairOrientation};
    use crate::alignment::record::EXCLUDED;
    use noodles::sam::alignment::record::cigar::op::Kind;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:100000\n@SQ\tSN:chr2\tLN:100000\n";

    fn read_sam(lines: &[String]) -> Vec<io::Result<RawAlignment>> {
        let text = format!("{HEADER}{}\n", lines.join("\n"));
        let mut reader = sam::io::Reader::new(text.as_bytes());
        let header = reader.read_header().unwrap();
        reader
            .records()
            .map(|result| result.and_then(|record| raw_alignment(&record, &header)))
            .collect()
    }

    fn read_one(line: &str) -> RawAlignment {
        read_sam(&[line.to_string()]).pop().unwrap().unwrap()
    }

    #[rstest]
    fn test_parse_cigar() {
        let ops = parse_cigar("5S90M2D5M").unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[0].kind(), Kind::SoftClip);
        assert_eq!(ops[1].len(), 90);
        assert_eq!(ops[2].kind(), Kind::Deletion);
        assert_eq!(parse_cigar("*").unwrap().is_empty(), true);
    }

    #[rstest]
    #[case("10")]
    #[case("M10")]
    #[case("10Q")]
    #[case("5M5")]
    fn test_parse_cigar_rejects(#[case] cigar: &str) {
        assert!(matches!(parse_cigar(cigar), Err(DecodeError::InvalidCigar(_))));
    }

    #[rstest]
    fn test_raw_alignment() {
        let raw = read_one(
            "r1\t99\tchr1\t101\t60\t10M\t=\t301\t210\tACGTACGTAC\t*\tHP:i:2\tSA:Z:chr2,5,+,10M,60,0;",
        );

        assert_eq!(raw.qname, "r1");
        assert_eq!(raw.position, 100);
        assert_eq!(raw.mate_position, 300);
        assert_eq!(raw.reference_id, Some(0));
        assert_eq!(raw.mate_reference_id, Some(0));
        assert_eq!(raw.mapping_quality, 60);
        assert_eq!(raw.cigar, vec![Op::new(Kind::Match, 10)]);
        assert_eq!(raw.haplotype, Some(2));
        assert_eq!(raw.has_sa_tag, true);
        assert_eq!(raw.sequence, b"ACGTACGTAC".to_vec());
        assert_eq!(raw.flags.is_properly_segmented(), true);
    }

    #[rstest]
    fn test_raw_alignment_unmapped() {
        let raw = read_one("u1\t4\t*\t0\t255\t*\t*\t0\t0\t*\t*");
        assert_eq!(raw.reference_id, None);
        assert_eq!(raw.position, 0);
        assert_eq!(raw.mapping_quality, MISSING_MAPPING_QUALITY);
        assert_eq!(raw.cigar.is_empty(), true);
        assert_eq!(raw.sequence.is_empty(), true);
        assert_eq!(raw.haplotype, None);
        assert_eq!(raw.has_sa_tag, false);
    }

    #[rstest]
    #[case("HP:i:2", Some(2))]
    #[case("HP:i:300", Some(300))]
    #[case("HP:Z:1", Some(1))]
    #[case("HP:A:3", Some(3))]
    #[case("HP:i:-1", None)]
    #[case("HP:Z:maternal", None)]
    #[case("XS:A:+", None)]
    fn test_haplotype_tag(#[case] tag: &str, #[case] expected: Option<u32>) {
        let raw = read_one(&format!("r1\t0\tchr1\t1\t60\t4M\t*\t0\t0\tACGT\t*\t{tag}"));
        assert_eq!(raw.haplotype, expected);
    }

    #[rstest]
    fn test_reference_missing_from_header() {
        let results = read_sam(&["r1\t0\tchr9\t1\t60\t4M\t*\t0\t0\t*\t*".to_string()]);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn test_decode_records_preserves_order(#[case] threads: usize) {
        let lines: Vec<String> = (0..1000)
            .map(|i| {
                format!(
                    "r{i}\t{}\tchr1\t{}\t60\t50M\t{}\t{}\t0\t*\t*",
                    if i % 10 == 0 { 4 } else { 97 },
                    i + 1,
                    if i % 7 == 0 { "chr2" } else { "=" },
                    i + 301,
                )
            })
            .collect();
        let raws: Vec<RawAlignment> = read_sam(&lines).into_iter().map(|r| r.unwrap()).collect();

        let records = decode_records(&raws, threads).unwrap();
        assert_eq!(records.len(), 1000);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.qname, format!("r{i}"));
            assert_eq!(record.position, i as i64);
            assert_eq!(record.reference_end, i as i64 + 50);
        }
        assert_eq!(records[10].level, EXCLUDED);
        assert_eq!(records[7].orientation, PairOrientation::Translocation);
        assert_eq!(records[1].orientation, PairOrientation::DeletionLike);
        assert_eq!(records[1].edge, EdgeType::Normal);
    }

    #[rstest]
    fn test_decode_empty() {
        assert_eq!(decode_records(&[], 0).unwrap().is_empty(), true);
    }
}
