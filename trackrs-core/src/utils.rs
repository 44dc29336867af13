use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    BED,
    SAM,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(FileType::BED),
            "sam" => Ok(FileType::SAM),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

/// Sniff the file type from the extension, looking through a trailing `.gz`.
pub fn get_file_info(path: &Path) -> FileInfo {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let base = match is_gzipped {
        true => path.file_stem().map(PathBuf::from),
        false => Some(path.to_path_buf()),
    };

    let file_type = base
        .as_deref()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(|e| FileType::from_str(e).ok())
        .unwrap_or(FileType::UNKNOWN);

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    let reader = BufReader::new(file);

    Ok(reader)
}
