use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::debug;

use trackrs_core::models::RegionSet;
use trackrs_overlaprs::IntoFeatureStore;

pub fn run_overlap(matches: &ArgMatches) -> Result<()> {
    let query_file = matches
        .get_one::<String>("query")
        .context("A path to a query file is required.")?;
    let universe_file = matches
        .get_one::<String>("universe")
        .context("A path to a universe file is required.")?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_overlaps(Path::new(query_file), Path::new(universe_file), &mut writer)?;
    writer.flush()?;

    Ok(())
}

/// Write every universe interval hit by a query region as a BED line.
pub fn write_overlaps<W: Write>(query: &Path, universe: &Path, writer: &mut W) -> Result<usize> {
    let universe = RegionSet::try_from(universe)
        .with_context(|| format!("Failed to read universe {}", universe.display()))?;
    let queries = RegionSet::try_from(query)
        .with_context(|| format!("Failed to read queries {}", query.display()))?;

    let store = universe.into_feature_store();

    let mut hits = 0;
    for (chr, hit) in store.find_overlaps_iter(&queries) {
        // closed back to half-open
        writeln!(writer, "{}\t{}\t{}", chr, hit.start, hit.end + 1)?;
        hits += 1;
    }
    debug!("{} overlaps for {} query regions", hits, queries.len());

    Ok(hits)
}
