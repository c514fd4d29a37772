//! Core types shared by the tensorstream crates.
//!
//! - [`point_cloud`]: the owned [`PointCloud`] container (xyz + optional intensity)
//! - [`env`]: typed parsing of configuration environment variables
//! - [`Error`] / [`Result`]: the error type every crate in the workspace returns

pub mod env;
pub mod point_cloud;

pub use point_cloud::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The underlying `std::io::ErrorKind`, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Error::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}
