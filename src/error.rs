use std::io;
use std::result;

/// A type alias for `Result<T, csvclean::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when cleaning CSV data.
///
/// Either kind of error stops the stream. Field units written before the
/// error stay written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error that occurred while reading or writing CSV data.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The input is structurally malformed: either a closing quote is
    /// followed by something other than a delimiter, or a carriage return
    /// is not followed by a line feed.
    #[error("CSV normalize error: {0}")]
    Syntax(csvclean_core::Error),
}

impl From<csvclean_core::Error> for Error {
    fn from(err: csvclean_core::Error) -> Error {
        Error::Syntax(err)
    }
}

impl Error {
    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            Error::Syntax(_) => false,
        }
    }

    /// Return the malformed input error, if this is one.
    pub fn syntax(&self) -> Option<&csvclean_core::Error> {
        match *self {
            Error::Io(_) => None,
            Error::Syntax(ref err) => Some(err),
        }
    }
}
