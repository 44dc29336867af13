use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::RegionSetError;

///
/// Region struct, one half-open `[start, end)` range on a named chromosome
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub chr: String,
    pub start: u32,
    pub end: u32,

    pub rest: Option<String>,
}

impl Region {
    ///
    /// Get the number of bases spanned by the region
    ///
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    ///
    /// Get BED line of Region
    ///
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}{}",
            self.chr,
            self.start,
            self.end,
            self.rest
                .as_deref()
                .map_or(String::new(), |s| format!("\t{}", s)),
        )
    }

    /// The region as a 1-based inclusive locus string, e.g. `chr1:101-200`.
    pub fn as_locus(&self) -> String {
        format!("{}:{}-{}", self.chr, self.start + 1, self.end)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

///
/// Parse a locus string such as `chr1:1,001-2,000` or `chr1`.
///
/// Text loci are 1-based and inclusive; the resulting region is 0-based half-open.
/// A bare chromosome name spans the whole chromosome (`0..u32::MAX`).
///
impl FromStr for Region {
    type Err = RegionSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (chr, range) = match s.rsplit_once(':') {
            Some((chr, range)) => (chr, Some(range)),
            None => (s, None),
        };
        if chr.is_empty() {
            return Err(RegionSetError::RegionParseError(s.to_string()));
        }

        let (start, end) = match range {
            None => (0, u32::MAX),
            Some(range) => {
                let cleaned = range.replace(',', "");
                let (start, end) = cleaned
                    .split_once('-')
                    .ok_or_else(|| RegionSetError::RegionParseError(s.to_string()))?;
                let start: u32 = start
                    .parse()
                    .map_err(|_| RegionSetError::RegionParseError(s.to_string()))?;
                let end: u32 = end
                    .parse()
                    .map_err(|_| RegionSetError::RegionParseError(s.to_string()))?;
                if start == 0 || end < start {
                    return Err(RegionSetError::RegionParseError(s.to_string()));
                }
                (start - 1, end)
            }
        };

        Ok(Region {
            chr: chr.to_string(),
            start,
            end,
            rest: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("chr1:101-200", "chr1", 100, 200)]
    #[case("chr2:1,001-2,000", "chr2", 1000, 2000)]
    #[case("HLA-A*01:01:1-5", "HLA-A*01:01", 0, 5)]
    #[case("chrX", "chrX", 0, u32::MAX)]
    fn test_parse_locus(
        #[case] locus: &str,
        #[case] chr: &str,
        #[case] start: u32,
        #[case] end: u32,
    ) {
        let region: Region = locus.parse().unwrap();
        assert_eq!(region.chr, chr);
        assert_eq!(region.start, start);
        assert_eq!(region.end, end);
    }

    #[rstest]
    #[case("chr1:200-100")]
    #[case("chr1:0-10")]
    #[case("chr1:abc-10")]
    #[case(":1-10")]
    fn test_parse_locus_rejects_malformed(#[case] locus: &str) {
        assert_eq!(locus.parse::<Region>().is_err(), true);
    }

    #[rstest]
    fn test_locus_round_trip_text() {
        let region: Region = "chr1:101-200".parse().unwrap();
        assert_eq!(region.as_locus(), "chr1:101-200");
        assert_eq!(region.width(), 100);
    }
}
