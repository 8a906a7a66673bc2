use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Trail network has no nodes to snap to")]
    EmptyNetwork,
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("External source error: {0}")]
    ExternalSource(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Shared trail graph lock was poisoned")]
    LockPoisoned,
}
