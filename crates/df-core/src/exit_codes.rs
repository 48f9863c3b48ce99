//! Exit codes for the dataflame CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.

use df_common::Error;

/// Exit codes for dataflame operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// Configuration error (bad flags, invalid pipeline file)
    ConfigError = 10,

    /// I/O error
    IoError = 13,

    /// Data error: unacceptable label, missing column, wrong cell type
    DataError = 20,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Map a library error onto the exit code reported for it.
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
            Error::InternalConsistency(_) => ExitCode::InternalError,
            e if e.is_data_error() => ExitCode::DataError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // All codes fit in a u8.
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_stable_codes() {
        assert_eq!(ExitCode::from_error(&Error::Config("x".into())), ExitCode::ConfigError);
        assert_eq!(
            ExitCode::from_error(&Error::UnacceptableLabel {
                column: "label".into(),
                label: "C".into(),
            }),
            ExitCode::DataError
        );
        assert_eq!(
            ExitCode::from_error(&Error::MissingColumn("ts".into())),
            ExitCode::DataError
        );
        assert_eq!(
            ExitCode::from_error(&Error::InternalConsistency("x".into())),
            ExitCode::InternalError
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ExitCode::from_error(&Error::Io(io)), ExitCode::IoError);
    }

    #[test]
    fn numeric_values() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(i32::from(ExitCode::ConfigError), 10);
        assert_eq!(ExitCode::IoError.as_i32(), 13);
        assert_eq!(ExitCode::DataError.as_i32(), 20);
        assert_eq!(ExitCode::InternalError.as_i32(), 99);
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::DataError.is_success());
    }
}
