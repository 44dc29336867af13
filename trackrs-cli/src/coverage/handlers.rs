use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use trackrs_core::alignment::AlignmentRecord;
use trackrs_core::models::Region;
use trackrs_layout::collect_coverage;

use crate::reads::read_region;

pub fn run_coverage(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to a SAM file is required.")?;
    let region: Region = matches
        .get_one::<String>("region")
        .context("A region is required.")?
        .parse()?;
    let threads = matches.get_one::<usize>("threads").copied().unwrap_or(0);

    let records = read_region(Path::new(input), &region, threads)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_bedgraph(&records, &region, &mut writer)?;
    writer.flush()?;

    Ok(())
}

///
/// Write the depth curve of `records` over `region` as bedGraph lines, merging
/// runs of equal depth. Zero-depth runs are left out.
///
/// The window is trimmed to the span the records cover.
///
pub fn write_bedgraph<W: Write>(
    records: &[AlignmentRecord],
    region: &Region,
    writer: &mut W,
) -> Result<()> {
    let first = records.iter().map(|r| r.position).min().unwrap_or(0);
    let last = records.iter().map(|r| r.reference_end).max().unwrap_or(0);
    let start = i64::from(region.start).max(first);
    let end = i64::from(region.end).min(last).max(start);

    let depths = collect_coverage(start, end, records);

    let mut run_start = start;
    for run in depths.chunk_by(|a, b| a == b) {
        let run_end = run_start + run.len() as i64;
        if run[0] > 0 {
            writeln!(writer, "{}\t{}\t{}\t{}", region.chr, run_start, run_end, run[0])?;
        }
        run_start = run_end;
    }
    Ok(())
}
