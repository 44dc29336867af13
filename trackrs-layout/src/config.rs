use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trackrs_core::alignment::AlignmentRecord;

/// How records are partitioned into categories and ordered for placement.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    None,
    Position,
    Strand,
    Haplotype,
    StrandAndPosition,
    HaplotypeAndPosition,
}

impl SortMode {
    /// The category a record is packed in. Modes without a categorical
    /// component put every record in category `0`.
    pub fn category(&self, record: &AlignmentRecord) -> u32 {
        match self {
            SortMode::Strand | SortMode::StrandAndPosition => u32::from(record.sort_key.reverse),
            SortMode::Haplotype | SortMode::HaplotypeAndPosition => record.sort_key.haplotype,
            SortMode::None | SortMode::Position => 0,
        }
    }

    /// Whether placement order follows the base each record carries at the sort locus.
    pub fn uses_locus(&self) -> bool {
        matches!(
            self,
            SortMode::Position | SortMode::StrandAndPosition | SortMode::HaplotypeAndPosition
        )
    }
}

impl FromStr for SortMode {
    type Err = LayoutConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(SortMode::None),
            "position" => Ok(SortMode::Position),
            "strand" => Ok(SortMode::Strand),
            "haplotype" => Ok(SortMode::Haplotype),
            "strand_and_position" => Ok(SortMode::StrandAndPosition),
            "haplotype_and_position" => Ok(SortMode::HaplotypeAndPosition),
            _ => Err(LayoutConfigError::InvalidValue(format!("sort mode `{s}`"))),
        }
    }
}

/// Which records of a template are forced onto one row.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    #[default]
    None,
    /// Only split alignments and pairs that are not properly paired.
    SplitOnly,
    All,
}

impl LinkMode {
    pub fn links(&self, record: &AlignmentRecord) -> bool {
        match self {
            LinkMode::None => false,
            LinkMode::SplitOnly => record.is_split_or_discordant(),
            LinkMode::All => true,
        }
    }
}

impl FromStr for LinkMode {
    type Err = LayoutConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(LinkMode::None),
            "split_only" | "split" => Ok(LinkMode::SplitOnly),
            "all" => Ok(LinkMode::All),
            _ => Err(LayoutConfigError::InvalidValue(format!("link mode `{s}`"))),
        }
    }
}

#[derive(Error, Debug)]
pub enum LayoutConfigError {
    #[error("Invalid value in layout config: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type LayoutConfigResult<T> = std::result::Result<T, LayoutConfigError>;

/// Settings for a [`LayoutEngine`](crate::LayoutEngine).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Visible rows per category.
    pub row_budget: usize,
    /// Rows scrolled off the top of the view.
    pub scroll_offset: usize,
    pub sort_mode: SortMode,
    pub link_mode: LinkMode,
    /// Reserve room for soft-clipped bases when packing.
    pub show_soft_clips: bool,
    /// Reference position (0-based) whose base orders placement in locus sort modes.
    pub sort_locus: Option<i64>,
    /// Decode pool size; `0` uses the global rayon pool.
    pub threads: usize,
    /// Category count above which a warning is logged.
    pub max_categories: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            row_budget: 50,
            scroll_offset: 0,
            sort_mode: SortMode::None,
            link_mode: LinkMode::None,
            show_soft_clips: false,
            sort_locus: None,
            threads: 0,
            max_categories: 64,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> LayoutConfigResult<()> {
        if self.row_budget == 0 {
            return Err(LayoutConfigError::InvalidValue(
                "row_budget must be at least 1".to_string(),
            ));
        }
        if self.max_categories == 0 {
            return Err(LayoutConfigError::InvalidValue(
                "max_categories must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&Path> for LayoutConfig {
    type Error = LayoutConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: LayoutConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use trackrs_core::alignment::{EdgeType, Flags, RawAlignment};

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[rstest]
    fn test_try_from_toml() {
        let file = write_config(
            "row_budget = 20\nsort_mode = \"strand_and_position\"\nlink_mode = \"split_only\"\nsort_locus = 1500\n",
        );
        let config = LayoutConfig::try_from(file.path()).unwrap();

        assert_eq!(config.row_budget, 20);
        assert_eq!(config.sort_mode, SortMode::StrandAndPosition);
        assert_eq!(config.link_mode, LinkMode::SplitOnly);
        assert_eq!(config.sort_locus, Some(1500));
        // unspecified fields keep their defaults
        assert_eq!(config.max_categories, 64);
        assert_eq!(config.show_soft_clips, false);
    }

    #[rstest]
    fn test_empty_toml_is_default() {
        let file = write_config("");
        let config = LayoutConfig::try_from(file.path()).unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[rstest]
    #[case("row_budget = 0\n")]
    #[case("max_categories = 0\n")]
    fn test_invalid_values(#[case] contents: &str) {
        let file = write_config(contents);
        let result = LayoutConfig::try_from(file.path());
        assert!(matches!(result, Err(LayoutConfigError::InvalidValue(_))));
    }

    #[rstest]
    fn test_unknown_sort_mode_is_toml_error() {
        let file = write_config("sort_mode = \"by_color\"\n");
        let result = LayoutConfig::try_from(file.path());
        assert!(matches!(result, Err(LayoutConfigError::Toml(_))));
    }

    #[rstest]
    fn test_missing_file() {
        let result = LayoutConfig::try_from(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(LayoutConfigError::Io(_))));
    }

    #[rstest]
    #[case("none", SortMode::None)]
    #[case("position", SortMode::Position)]
    #[case("Strand", SortMode::Strand)]
    #[case("haplotype-and-position", SortMode::HaplotypeAndPosition)]
    fn test_sort_mode_from_str(#[case] s: &str, #[case] expected: SortMode) {
        assert_eq!(s.parse::<SortMode>().unwrap(), expected);
    }

    #[rstest]
    fn test_link_mode_from_str() {
        assert_eq!("split_only".parse::<LinkMode>().unwrap(), LinkMode::SplitOnly);
        assert_eq!("all".parse::<LinkMode>().unwrap(), LinkMode::All);
        assert!("sometimes".parse::<LinkMode>().is_err());
    }

    #[rstest]
    fn test_category_and_links() {
        let raw = RawAlignment {
            qname: "r".to_string(),
            flags: Flags::REVERSE_COMPLEMENTED | Flags::SUPPLEMENTARY,
            reference_id: Some(0),
            position: 10,
            mapping_quality: 60,
            cigar: Vec::new(),
            mate_reference_id: None,
            mate_position: 0,
            has_sa_tag: false,
            haplotype: Some(2),
            sequence: Vec::new(),
        };
        let record = AlignmentRecord::from_raw(&raw);
        assert_eq!(record.edge, EdgeType::Split);

        assert_eq!(SortMode::Strand.category(&record), 1);
        assert_eq!(SortMode::HaplotypeAndPosition.category(&record), 2);
        assert_eq!(SortMode::Position.category(&record), 0);
        assert_eq!(LinkMode::SplitOnly.links(&record), true);
        assert_eq!(LinkMode::None.links(&record), false);
    }
}
