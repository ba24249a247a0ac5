use core::ascii;

/// A fatal error found while normalizing CSV data.
///
/// Both kinds of error indicate structurally malformed input. Once one is
/// returned, the transducer that produced it refuses any further input.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("line {line}, byte {byte}: {kind}")]
pub struct Error {
    kind: ErrorKind,
    byte: u64,
    line: u64,
    field: u64,
}

/// The specific rule of the input grammar that was violated.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// A quote that closed a quoted field was followed by a byte that is
    /// neither another quote, a delimiter nor a carriage return.
    #[error("unpaired double quote in string (found '{}')", escaped(.found))]
    UnpairedQuote {
        /// The byte that followed the closing quote.
        found: u8,
    },
    /// A carriage return was not immediately followed by a line feed.
    ///
    /// `found` is `None` when the input ended right after the carriage
    /// return.
    #[error("stray \\r in input")]
    StrayCarriageReturn {
        /// The byte that followed the carriage return, if any.
        found: Option<u8>,
    },
}

fn escaped(b: &u8) -> ascii::EscapeDefault {
    ascii::escape_default(*b)
}

impl Error {
    pub(crate) fn new(
        kind: ErrorKind,
        byte: u64,
        line: u64,
        field: u64,
    ) -> Error {
        Error { kind: kind, byte: byte, line: line, field: field }
    }

    /// The kind of rule that was violated.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The 0-based offset of the offending byte in the input stream.
    ///
    /// When the input ended before the rule could be satisfied, this is the
    /// total number of bytes consumed.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The 1-based line on which the offending byte occurs, counting every
    /// `\n` seen so far (including ones inside quoted fields).
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The 0-based index of the field unit that was being built.
    pub fn field(&self) -> u64 {
        self.field
    }
}
