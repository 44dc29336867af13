use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionSetError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Can't get file from path: {0}")]
    InvalidPathOrUrl(String),

    #[error("Error parsing region: {0}")]
    RegionParseError(String),

    #[error("Corrupted file. 0 regions found in the file: {0}")]
    EmptyRegionSet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid CIGAR string: {0}")]
    InvalidCigar(String),

    #[error("Failed to build decode thread pool: {0}")]
    ThreadPool(String),
}
