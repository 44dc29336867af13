use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use noodles::sam;

use trackrs_core::alignment::{AlignmentRecord, decode_records, raw_alignment};
use trackrs_core::models::Region;
use trackrs_core::utils::{FileType, get_dynamic_reader, get_file_info};

///
/// Read the alignments of a SAM (or SAM.gz) file that overlap `region`, in
/// position order.
///
/// Malformed records are logged and skipped. Unmapped records placed inside
/// the region are kept; they decode as excluded from layout.
///
pub fn read_region(path: &Path, region: &Region, threads: usize) -> Result<Vec<AlignmentRecord>> {
    if get_file_info(path).file_type != FileType::SAM {
        warn!("{} has no .sam extension, reading it as SAM text", path.display());
    }
    let mut reader = sam::io::Reader::new(get_dynamic_reader(path)?);
    let header = reader
        .read_header()
        .with_context(|| format!("Failed to read SAM header from {}", path.display()))?;

    let Some(reference_id) = header
        .reference_sequences()
        .get_index_of(region.chr.as_bytes())
    else {
        debug!("{} is not a reference of {}", region.chr, path.display());
        return Ok(Vec::new());
    };

    let mut raws = Vec::new();
    let mut skipped = 0usize;
    for (n, result) in reader.records().enumerate() {
        let raw = match result {
            Ok(record) => raw_alignment(&record, &header),
            Err(err) if matches!(
                err.kind(),
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
            ) =>
            {
                Err(err)
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        match raw {
            Ok(raw) if raw.reference_id == Some(reference_id) => raws.push(raw),
            Ok(_) => {}
            Err(err) => {
                if skipped == 0 {
                    warn!("skipping malformed record {}: {}", n + 1, err);
                }
                skipped += 1;
            }
        }
    }
    if skipped > 1 {
        warn!("skipped {} malformed records in {}", skipped, path.display());
    }

    let (start, end) = (i64::from(region.start), i64::from(region.end));
    let mut records = decode_records(&raws, threads)?;
    records.retain(|r| r.position < end && r.reference_end.max(r.position + 1) > start);
    records.sort_by_key(|r| r.position);

    debug!(
        "{} of {} alignments overlap {}",
        records.len(),
        raws.len(),
        region.as_locus()
    );
    Ok(records)
}
