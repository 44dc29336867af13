use std::collections::HashSet;
use std::fmt::{self, Display};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::RegionSetError;
use crate::models::Region;
use crate::utils::get_dynamic_reader;

///
/// RegionSet struct, the representation of a track file of intervals,
/// such as a bed file feeding a [`FeatureStore`].
///
/// [`FeatureStore`]: https://docs.rs/trackrs-overlaprs
#[derive(Clone, Debug)]
pub struct RegionSet {
    pub regions: Vec<Region>,
    pub header: Option<String>,
    pub path: Option<PathBuf>,
}

pub struct RegionSetIterator<'a> {
    region_set: &'a RegionSet,
    index: usize,
}

/// Returns `true` for `browser`, `track` and `#` lines.
fn is_header_line(line: &str) -> bool {
    line.starts_with("browser") || line.starts_with("track") || line.starts_with('#')
}

impl TryFrom<&Path> for RegionSet {
    type Error = RegionSetError;

    ///
    /// Create a new [RegionSet] from a bed or bed.gz file.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        if !value.is_file() {
            return Err(RegionSetError::InvalidPathOrUrl(value.display().to_string()));
        }

        let reader = get_dynamic_reader(value)
            .map_err(|err| RegionSetError::FileReadError(format!("{err:#}")))?;

        let mut regions: Vec<Region> = Vec::new();
        let mut header = String::new();
        let mut first_line = true;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if is_header_line(&line) {
                header.push_str(&line);
                first_line = false;
                continue;
            }

            let mut fields = line.split('\t');
            let chr = fields.next().unwrap_or_default();
            let start = fields.next();
            let end = fields.next();

            // column header like `chr start end` without a leading #
            if first_line {
                first_line = false;
                if start.is_some_and(|s| s.parse::<u32>().is_err()) {
                    header.push_str(&line);
                    continue;
                }
            }

            let (Some(start), Some(end)) = (start, end) else {
                return Err(RegionSetError::RegionParseError(line));
            };
            let start: u32 = start
                .parse()
                .map_err(|_| RegionSetError::RegionParseError(line.clone()))?;
            let end: u32 = end
                .parse()
                .map_err(|_| RegionSetError::RegionParseError(line.clone()))?;

            let rest = fields.collect::<Vec<&str>>().join("\t");

            regions.push(Region {
                chr: chr.to_string(),
                start,
                end,
                rest: Some(rest).filter(|s| !s.is_empty()),
            });
        }

        if regions.is_empty() {
            return Err(RegionSetError::EmptyRegionSet(value.display().to_string()));
        }

        let mut rs = RegionSet {
            regions,
            header: match header.is_empty() {
                true => None,
                false => Some(header),
            },
            path: Some(value.to_owned()),
        };
        rs.sort();

        Ok(rs)
    }
}

impl TryFrom<&str> for RegionSet {
    type Error = RegionSetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RegionSet::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for RegionSet {
    type Error = RegionSetError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        RegionSet::try_from(value.as_path())
    }
}

impl From<Vec<Region>> for RegionSet {
    fn from(regions: Vec<Region>) -> Self {
        RegionSet {
            regions,
            header: None,
            path: None,
        }
    }
}

impl<'a> Iterator for RegionSetIterator<'a> {
    type Item = &'a Region;

    fn next(&mut self) -> Option<Self::Item> {
        let region = self.region_set.regions.get(self.index)?;
        self.index += 1;
        Some(region)
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = RegionSetIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        RegionSetIterator {
            region_set: self,
            index: 0,
        }
    }
}

impl RegionSet {
    ///
    /// Iterate unique chromosomes located in RegionSet
    ///
    pub fn iter_chroms(&self) -> impl Iterator<Item = &String> {
        let unique_chroms: HashSet<&String> = self.regions.iter().map(|r| &r.chr).collect();
        unique_chroms.into_iter()
    }

    ///
    /// Iterate through regions located on specific Chromosome in RegionSet
    ///
    pub fn iter_chr_regions<'a>(&'a self, chr: &'a str) -> impl Iterator<Item = &'a Region> {
        self.regions.iter().filter(move |r| r.chr == chr)
    }

    ///
    /// Sort regions by chromosome, then start.
    /// Sorting is happening inside the object,
    /// where original order will be overwritten
    ///
    pub fn sort(&mut self) {
        self.regions
            .sort_by(|a, b| a.chr.cmp(&b.chr).then_with(|| a.start.cmp(&b.start)));
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }
}

impl Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionSet with {} regions.", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    fn write_bed(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[rstest]
    fn test_open_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bed(
            &dir,
            "peaks.bed",
            "track name=peaks\nchr2\t10\t20\tb\nchr1\t300\t400\ta\t0.5\nchr1\t100\t200\n",
        );

        let rs = RegionSet::try_from(path.as_path()).unwrap();
        assert_eq!(rs.len(), 3);
        assert_eq!(rs.header.as_deref(), Some("track name=peaks"));
        assert_eq!(rs.regions[0].start, 100);
        assert_eq!(rs.regions[1].rest.as_deref(), Some("a\t0.5"));
        assert_eq!(rs.regions[2].chr, "chr2");
    }

    #[rstest]
    fn test_column_header_without_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bed(&dir, "cols.bed", "chrom\tstart\tend\nchr1\t1\t2\n");

        let rs = RegionSet::try_from(path.as_path()).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.header.as_deref(), Some("chrom\tstart\tend"));
    }

    #[rstest]
    fn test_malformed_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bed(&dir, "bad.bed", "chr1\t1\t2\nchr1\tten\t20\n");

        let result = RegionSet::try_from(path.as_path());
        assert!(matches!(result, Err(RegionSetError::RegionParseError(_))));
    }

    #[rstest]
    fn test_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bed(&dir, "empty.bed", "# nothing here\n");

        let result = RegionSet::try_from(path.as_path());
        assert!(matches!(result, Err(RegionSetError::EmptyRegionSet(_))));
    }

    #[rstest]
    fn test_missing_file() {
        let result = RegionSet::try_from("does/not/exist.bed");
        assert!(matches!(result, Err(RegionSetError::InvalidPathOrUrl(_))));
    }

    #[rstest]
    fn test_iterate_chroms() {
        let rs = RegionSet::from(vec![
            Region { chr: "chr1".to_string(), start: 0, end: 5, rest: None },
            Region { chr: "chr2".to_string(), start: 0, end: 5, rest: None },
            Region { chr: "chr1".to_string(), start: 9, end: 12, rest: None },
        ]);
        let mut chroms: Vec<&String> = rs.iter_chroms().collect();
        chroms.sort();
        assert_eq!(chroms, vec!["chr1", "chr2"]);
        assert_eq!(rs.iter_chr_regions("chr1").count(), 2);
        assert_eq!((&rs).into_iter().count(), 3);
    }
}
