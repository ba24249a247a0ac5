use std::io;

use bstr::BStr;
use csvclean_core::{FieldUnit, Transducer};
use tracing::{debug, warn};

use crate::error::Result;

const BUF_SIZE: usize = 64 * 1024;

/// What to do with a final field that is not followed by `,` or `\n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrailingField {
    /// Silently drop the field. Only a warning is logged.
    ///
    /// This is the default.
    Drop,
    /// Write the field as is, without adding a delimiter.
    Emit,
}

impl Default for TrailingField {
    fn default() -> TrailingField {
        TrailingField::Drop
    }
}

/// Cleans CSV data read from an `io::Read` and writes it to an `io::Write`.
///
/// A `Cleaner` holds only configuration, so it can be used for any number of
/// streams. Each stream gets its own [`Transducer`].
#[derive(Clone, Debug)]
pub struct Cleaner {
    trailing: TrailingField,
    capacity: usize,
}

impl Default for Cleaner {
    fn default() -> Cleaner {
        Cleaner { trailing: TrailingField::default(), capacity: BUF_SIZE }
    }
}

/// Builds a CSV cleaner with various configuration knobs.
#[derive(Debug, Default)]
pub struct CleanerBuilder {
    cleaner: Cleaner,
}

impl CleanerBuilder {
    /// Create a new builder.
    pub fn new() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    /// Build a cleaner from this configuration.
    pub fn build(&self) -> Cleaner {
        self.cleaner.clone()
    }

    /// Set the policy for an unterminated final field.
    ///
    /// The default is `TrailingField::Drop`.
    pub fn trailing(&mut self, policy: TrailingField) -> &mut CleanerBuilder {
        self.cleaner.trailing = policy;
        self
    }

    /// Set the capacity (in bytes) of the buffer used to read input.
    ///
    /// The default is 64 KiB. A capacity of `0` is treated as `1`.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut CleanerBuilder {
        self.cleaner.capacity = capacity;
        self
    }
}

impl Cleaner {
    /// Create a new cleaner with a default configuration.
    pub fn new() -> Cleaner {
        CleanerBuilder::new().build()
    }

    /// Returns an iterator over the cleaned field units of `rdr`.
    ///
    /// The reader is buffered for you automatically. The iterator stops
    /// after the first error.
    pub fn field_units<R: io::Read>(&self, rdr: R) -> FieldUnits<R> {
        FieldUnits {
            rdr: rdr,
            buf: vec![0; self.capacity.max(1)],
            pos: 0,
            len: 0,
            eof: false,
            done: false,
            trailing: self.trailing,
            trans: Transducer::new(),
            unit_end: 0,
            dropped: 0,
        }
    }

    /// Clean all of `rdr` into `wtr`.
    ///
    /// Each field unit is written as soon as it is complete, so when an
    /// error occurs, everything before the offending field has already
    /// been written. The writer is flushed in either case.
    pub fn clean<R: io::Read, W: io::Write>(
        &self,
        rdr: R,
        mut wtr: W,
    ) -> Result<Summary> {
        debug!(
            trailing = ?self.trailing,
            capacity = self.capacity,
            "cleaning CSV stream"
        );
        let mut units = self.field_units(rdr);
        let mut summary = Summary::default();
        for result in &mut units {
            let unit = match result {
                Ok(unit) => unit,
                Err(err) => {
                    // A flush failure is logged, but `err` is what's returned.
                    if let Err(flush_err) = wtr.flush() {
                        debug!(%flush_err, "flush failed after error");
                    }
                    return Err(err);
                }
            };
            wtr.write_all(&unit)?;
            summary.bytes_written += unit.len() as u64;
            summary.fields += 1;
            summary.records += unit.is_record_end() as u64;
        }
        wtr.flush()?;
        summary.bytes_read = units.byte();
        summary.dropped_trailing = units.dropped_trailing();
        debug!(?summary, "finished cleaning CSV stream");
        Ok(summary)
    }

    /// Clean an in-memory buffer and return the result.
    pub fn clean_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len());
        self.clean(input, &mut out)?;
        Ok(out)
    }
}

/// Statistics about a cleaned stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    bytes_read: u64,
    bytes_written: u64,
    fields: u64,
    records: u64,
    dropped_trailing: u64,
}

impl Summary {
    /// The number of bytes read from the input.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// The number of bytes written to the output.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// The number of field units written.
    pub fn fields(&self) -> u64 {
        self.fields
    }

    /// The number of field units written that ended a line.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// The number of input bytes discarded with an unterminated final
    /// field, counting from the end of the last written field unit. This is
    /// always `0` with `TrailingField::Emit`.
    pub fn dropped_trailing(&self) -> u64 {
        self.dropped_trailing
    }
}

/// An iterator over the cleaned field units of a reader.
///
/// This is created by [`Cleaner::field_units`].
#[derive(Debug)]
pub struct FieldUnits<R> {
    rdr: R,
    buf: Vec<u8>,
    /// The position of the next unconsumed byte in `buf`.
    pos: usize,
    /// The number of valid bytes in `buf`.
    len: usize,
    eof: bool,
    /// Set after the end of input or the first error.
    done: bool,
    trailing: TrailingField,
    trans: Transducer,
    /// The input offset just past the last emitted field unit.
    unit_end: u64,
    dropped: u64,
}

impl<R: io::Read> FieldUnits<R> {
    /// The number of input bytes consumed so far.
    pub fn byte(&self) -> u64 {
        self.trans.byte()
    }

    /// The current line number of the input, starting at `1`.
    pub fn line(&self) -> u64 {
        self.trans.line()
    }

    /// The number of input bytes discarded with an unterminated final
    /// field.
    pub fn dropped_trailing(&self) -> u64 {
        self.dropped
    }

    fn next_unit(&mut self) -> Result<Option<FieldUnit>> {
        loop {
            if self.pos >= self.len {
                self.fill_buf()?;
                if self.eof {
                    return self.end_of_input();
                }
            }
            let (unit, nin) = self.trans.feed(&self.buf[self.pos..self.len])?;
            self.pos += nin;
            if unit.is_some() {
                self.unit_end = self.trans.byte();
                return Ok(unit);
            }
        }
    }

    fn fill_buf(&mut self) -> io::Result<()> {
        loop {
            match self.rdr.read(&mut self.buf) {
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    self.eof = n == 0;
                    return Ok(());
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn end_of_input(&mut self) -> Result<Option<FieldUnit>> {
        self.done = true;
        match self.trailing {
            TrailingField::Emit => Ok(self.trans.finish()?),
            TrailingField::Drop => {
                if self.trans.is_mid_field() {
                    self.dropped = self.trans.byte() - self.unit_end;
                    warn!(
                        line = self.trans.line(),
                        bytes = self.dropped,
                        field = %BStr::new(self.trans.pending()),
                        "dropping unterminated trailing field"
                    );
                }
                Ok(None)
            }
        }
    }
}

impl<R: io::Read> Iterator for FieldUnits<R> {
    type Item = Result<FieldUnit>;

    fn next(&mut self) -> Option<Result<FieldUnit>> {
        if self.done {
            return None;
        }
        match self.next_unit() {
            Ok(Some(unit)) => Some(Ok(unit)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
