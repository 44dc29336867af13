use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use trackrs_core::alignment::AlignmentRecord;
use trackrs_core::models::Region;
use trackrs_layout::{LayoutConfig, LayoutEngine, LinkMode, PlacementSummary, SortMode};

use crate::reads::read_region;

pub fn run_layout(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to a SAM file is required.")?;
    let region: Region = matches
        .get_one::<String>("region")
        .context("A region is required.")?
        .parse()?;

    let config = layout_config(matches)?;
    let mut records = read_region(Path::new(input), &region, config.threads)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    let summary = write_layout(&mut records, config, &mut writer)?;
    writer.flush()?;

    eprintln!(
        "{} placed, {} above, {} hidden, {} excluded",
        summary.placed, summary.above, summary.hidden, summary.excluded
    );
    Ok(())
}

/// Config file first, then command line overrides.
fn layout_config(matches: &ArgMatches) -> Result<LayoutConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => LayoutConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load layout config {path}"))?,
        None => LayoutConfig::default(),
    };

    if let Some(mode) = matches.get_one::<String>("sort") {
        config.sort_mode = mode.parse::<SortMode>()?;
    }
    if let Some(mode) = matches.get_one::<String>("link") {
        config.link_mode = mode.parse::<LinkMode>()?;
    }
    if let Some(locus) = matches.get_one::<i64>("locus") {
        config.sort_locus = Some(locus - 1);
    }
    if let Some(rows) = matches.get_one::<usize>("rows") {
        config.row_budget = *rows;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }
    config.validate()?;

    Ok(config)
}

pub fn write_layout<W: Write>(
    records: &mut [AlignmentRecord],
    config: LayoutConfig,
    writer: &mut W,
) -> Result<PlacementSummary> {
    let mut engine = LayoutEngine::new(config);
    let summary = engine.place(records);

    for record in records.iter() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            record.qname, record.cov_start, record.cov_end, record.level
        )?;
    }
    Ok(summary)
}
