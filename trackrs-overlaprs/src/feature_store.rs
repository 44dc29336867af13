//! Per-chromosome feature indexing.
//!
//! A [`FeatureStore`] keeps one [`IntervalIndex`] per chromosome, so distinct
//! chromosomes are built (in parallel) and queried independently.
//!
//! # Examples
//!
//! ```
//! use trackrs_overlaprs::feature_store::IntoFeatureStore;
//! use trackrs_core::models::{Region, RegionSet};
//!
//! let genes = RegionSet::from(vec![
//!     Region { chr: "chr1".to_string(), start: 1000, end: 2000, rest: Some("BRCA1".to_string()) },
//!     Region { chr: "chr1".to_string(), start: 5000, end: 6000, rest: Some("TP53".to_string()) },
//!     Region { chr: "chr2".to_string(), start: 1000, end: 3000, rest: Some("EGFR".to_string()) },
//! ]);
//! let store = genes.into_feature_store();
//!
//! let queries = RegionSet::from(vec![
//!     Region { chr: "chr1".to_string(), start: 1500, end: 2500, rest: None },
//!     Region { chr: "chr2".to_string(), start: 2000, end: 4000, rest: None },
//! ]);
//! assert_eq!(store.find_overlaps_iter(&queries).count(), 2);
//! ```
use std::fmt::Debug;

use fxhash::FxHashMap as HashMap;
use log::{debug, warn};
use num_traits::PrimInt;
use rayon::prelude::*;
use thiserror::Error;

use crate::interval_index::{IntervalIndex, IterFind, OverlapCoverage};
use trackrs_core::models::{Interval, Region, RegionSet};

/// Errors that can occur when working with a [`FeatureStore`].
#[derive(Debug, Error)]
pub enum FeatureStoreError {
    /// Error converting region coordinates to the store's coordinate type.
    #[error("Error converting region coordinates: {0}")]
    CoordinateConversionError(String),
}

/// A map from chromosome name to an [`IntervalIndex`] of feature payloads.
#[derive(Debug, Clone)]
pub struct FeatureStore<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    index_maps: HashMap<String, IntervalIndex<S, T>>,
}

impl<S, T> Default for FeatureStore<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn default() -> Self {
        FeatureStore {
            index_maps: HashMap::default(),
        }
    }
}

impl<S, T> FeatureStore<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature on `chrom`. Run [`build`](FeatureStore::build) before querying.
    pub fn add(&mut self, chrom: &str, start: S, end: S, val: T) {
        match self.index_maps.get_mut(chrom) {
            Some(index) => index.add(start, end, val),
            None => {
                let mut index = IntervalIndex::new();
                index.add(start, end, val);
                self.index_maps.insert(chrom.to_string(), index);
            }
        }
    }

    /// Build every chromosome's index, in parallel.
    pub fn build(&mut self) {
        self.index_maps
            .par_iter_mut()
            .for_each(|(_, index)| index.build());
        debug!(
            "indexed {} features over {} chromosomes",
            self.len(),
            self.index_maps.len()
        );
    }

    pub fn get(&self, chrom: &str) -> Option<&IntervalIndex<S, T>> {
        self.index_maps.get(chrom)
    }

    /// Chromosome names, in no particular order.
    pub fn chroms(&self) -> impl Iterator<Item = &String> {
        self.index_maps.keys()
    }

    /// Total number of features across all chromosomes.
    pub fn len(&self) -> usize {
        self.index_maps.values().map(|index| index.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index_maps.values().all(|index| index.is_empty())
    }

    pub fn find(&self, chrom: &str, start: S, end: S) -> Vec<Interval<S, T>> {
        self.find_iter(chrom, start, end)
            .map(|iv| Interval {
                start: iv.start,
                end: iv.end,
                val: iv.val.clone(),
            })
            .collect()
    }

    /// Lazily iterate the features on `chrom` overlapping `[start, end]`.
    /// An unknown chromosome yields nothing.
    pub fn find_iter<'a>(
        &'a self,
        chrom: &str,
        start: S,
        end: S,
    ) -> impl Iterator<Item = Interval<S, &'a T>> + use<'a, S, T> {
        self.index_maps
            .get(chrom)
            .into_iter()
            .flat_map(move |index| index.search(start, end))
    }

    pub fn stab(&self, chrom: &str, point: S) -> Vec<&T> {
        self.index_maps
            .get(chrom)
            .map(|index| index.stab(point))
            .unwrap_or_default()
    }

    pub fn count(&self, chrom: &str, start: S, end: S) -> usize {
        self.index_maps
            .get(chrom)
            .map_or(0, |index| index.count(start, end))
    }

    pub fn coverage(&self, chrom: &str, start: S, end: S) -> OverlapCoverage<S> {
        match self.index_maps.get(chrom) {
            Some(index) => index.coverage(start, end),
            None => OverlapCoverage {
                count: 0,
                covered: S::zero(),
            },
        }
    }

    ///
    /// Iterate every feature overlapping any region of `rs`.
    ///
    /// Regions are half-open, so `[start, end)` is searched as `[start, end - 1]`.
    /// Regions on chromosomes without features are skipped, as are regions whose
    /// coordinates do not fit the store's coordinate type.
    ///
    pub fn find_overlaps_iter<'a, 'b>(
        &'a self,
        rs: &'b RegionSet,
    ) -> IterFindOverlaps<'a, 'b, S, T> {
        IterFindOverlaps {
            inner: &self.index_maps,
            rs,
            region_idx: 0,
            current_chr: None,
            current_iter: None,
        }
    }

    /// Collect all overlaps, failing if any region does not fit the coordinate type.
    pub fn find_overlaps<'b>(
        &self,
        rs: &'b RegionSet,
    ) -> Result<Vec<(&'b str, Interval<S, T>)>, FeatureStoreError> {
        if let Some(region) = rs.regions.iter().find(|r| closed_span::<S>(r).is_none() && r.end > r.start) {
            return Err(FeatureStoreError::CoordinateConversionError(region.as_locus()));
        }
        Ok(self
            .find_overlaps_iter(rs)
            .map(|(chr, iv)| {
                (
                    chr,
                    Interval {
                        start: iv.start,
                        end: iv.end,
                        val: iv.val.clone(),
                    },
                )
            })
            .collect())
    }
}

/// Closed span of a half-open region; `None` for empty regions or unrepresentable coordinates.
fn closed_span<S: PrimInt>(region: &Region) -> Option<(S, S)> {
    if region.end <= region.start {
        return None;
    }
    Some((S::from(region.start)?, S::from(region.end - 1)?))
}

/// An iterator over features overlapping the regions of a [`RegionSet`].
///
/// Created by [`FeatureStore::find_overlaps_iter`]; yields `(chromosome, feature)`.
pub struct IterFindOverlaps<'a, 'b, S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    inner: &'a HashMap<String, IntervalIndex<S, T>>,
    rs: &'b RegionSet,
    region_idx: usize,
    current_chr: Option<&'b str>,
    current_iter: Option<IterFind<'a, S, T>>,
}

impl<'a, 'b, S, T> Iterator for IterFindOverlaps<'a, 'b, S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    type Item = (&'b str, Interval<S, &'a T>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let (Some(iter), Some(chr)) = (self.current_iter.as_mut(), self.current_chr) {
                if let Some(interval) = iter.next() {
                    return Some((chr, interval));
                }
            }

            // current iterator exhausted or doesn't exist, move to next region
            let region = self.rs.regions.get(self.region_idx)?;
            self.region_idx += 1;
            self.current_iter = None;

            let Some(index) = self.inner.get(&region.chr) else {
                continue;
            };
            match closed_span::<S>(region) {
                Some((start, end)) => {
                    self.current_chr = Some(region.chr.as_str());
                    self.current_iter = Some(index.search(start, end));
                }
                None if region.end > region.start => {
                    warn!("skipping region {} not representable in the store", region.as_locus());
                }
                None => {}
            }
        }
    }
}

/// A trait for converting region-based data into a [`FeatureStore`].
pub trait IntoFeatureStore<S, T>
where
    S: PrimInt + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Consumes the input and builds a ready-to-query [`FeatureStore`].
    fn into_feature_store(self) -> FeatureStore<S, T>;
}

impl IntoFeatureStore<u32, Option<String>> for RegionSet {
    fn into_feature_store(self) -> FeatureStore<u32, Option<String>> {
        let mut store = FeatureStore::new();
        let mut skipped = 0usize;

        for region in self.regions.into_iter() {
            match closed_span::<u32>(&region) {
                Some((start, end)) => store.add(&region.chr, start, end, region.rest),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("skipped {skipped} empty regions while building feature store");
        }

        store.build();
        store
    }
}
