//! Error handling for the transplot CLI

use thiserror::Error;
use transplot_core::error::TrackError;
use transplot_core::io::coverage::CoverageError;
use transplot_core::io::domains::DomainTableError;
use transplot_core::io::exons::ExonTableError;
use transplot_core::io::utr::UtrError;
use transplot_core::io::variants::VariantTableError;
use transplot_core::palette::PaletteError;

/// Main error type for transplot CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("Input table error: {message}")]
    Input { message: String },

    #[error("Layout error: {0}")]
    Layout(#[from] TrackError),
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

macro_rules! table_error_from {
    ($($source:ty),+) => {
        $(impl From<$source> for CliError {
            fn from(err: $source) -> Self {
                Self::input(err.to_string())
            }
        })+
    };
}

table_error_from!(
    CoverageError,
    ExonTableError,
    UtrError,
    DomainTableError,
    VariantTableError,
    PaletteError
);

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CliError::config("test message");
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: test message");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(matches!(cli_err, CliError::Io { .. }));
    }

    #[test]
    fn test_layout_error_conversion() {
        let err: CliError = TrackError::CapacityExceeded {
            required: 20,
            available: 17,
        }
        .into();
        assert!(err.to_string().contains("20"));
    }
}
