use alloc::vec::Vec;
use core::ascii;
use core::fmt;
use core::ops::Deref;

use memchr::{memchr, memchr3, memchr_iter};

use crate::error::{Error, ErrorKind};

/// One complete field taken from the input, including its trailing
/// delimiter.
///
/// The delimiter is always either `,` or `\n`. A field unit never ends
/// with a carriage return: a `\r\n` terminator has already been collapsed
/// to `\n` by the time a unit is emitted.
///
/// The only field units without a delimiter are those produced by
/// [`Transducer::finish`] for an unterminated final field.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct FieldUnit {
    bytes: Vec<u8>,
    terminated: bool,
}

impl FieldUnit {
    /// Return the bytes of this field unit.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume this field unit and return its underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Return the delimiter that ended this field: either `,` or `\n`.
    ///
    /// This returns `None` only for an unterminated final field.
    pub fn delimiter(&self) -> Option<u8> {
        if self.terminated {
            self.bytes.last().copied()
        } else {
            None
        }
    }

    /// Returns true if this field was the last one of its line.
    pub fn is_record_end(&self) -> bool {
        self.delimiter() == Some(b'\n')
    }
}

impl Deref for FieldUnit {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for FieldUnit {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FieldUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FieldUnit(\"")?;
        for &b in &self.bytes {
            write!(f, "{}", ascii::escape_default(b))?;
        }
        write!(f, "\")")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// No byte of the current field has been consumed.
    Start,
    /// Inside a field. What ends it depends on whether it is quoted.
    InString,
    /// Just saw a quote inside a quoted field. The next byte decides
    /// whether it was an escaped quote or the closing quote.
    AfterQuote,
    /// Just saw a carriage return outside of quotes. Only `\n` may follow.
    AfterCR,
    /// A field unit is complete. This never survives the end of `step`.
    Accept,
}

/// A push based CSV normalizer.
///
/// The transducer consumes one byte at a time and hands back a complete
/// field unit whenever a field is terminated by `,` or `\n`. Along the way
/// it collapses `\r\n` to `\n` and rewrites `""` fields to empty ones.
/// Nothing else about the input changes.
///
/// Unlike a CSV parser, the transducer never unescapes anything. Quoted
/// fields keep their quotes and doubled quotes stay doubled.
///
/// # Errors
///
/// Two kinds of input are rejected:
///
/// * A closing quote followed by anything other than `"`, `,`, `\n` or
///   `\r` (`ErrorKind::UnpairedQuote`).
/// * A carriage return outside of quotes that is not followed by `\n`
///   (`ErrorKind::StrayCarriageReturn`).
///
/// After an error, every subsequent call returns the same error until
/// `reset` is called.
#[derive(Clone, Debug)]
pub struct Transducer {
    state: State,
    /// The partial field unit, including its delimiter once known.
    acc: Vec<u8>,
    /// Whether the current field started with a quote.
    quoted: bool,
    /// Set once a fatal error has been returned.
    poisoned: Option<Error>,
    /// The number of bytes consumed.
    byte: u64,
    /// The current line, counting from `1`.
    line: u64,
    /// The number of field units emitted.
    field: u64,
}

impl Default for Transducer {
    fn default() -> Transducer {
        Transducer {
            state: State::Start,
            acc: Vec::with_capacity(64),
            quoted: false,
            poisoned: None,
            byte: 0,
            line: 1,
            field: 0,
        }
    }
}

impl Transducer {
    /// Create a new transducer positioned at the start of a stream.
    pub fn new() -> Transducer {
        Transducer::default()
    }

    /// Reset the transducer such that it behaves as if it had never been
    /// used. This clears any pending field and any previous error.
    pub fn reset(&mut self) {
        self.state = State::Start;
        self.acc.clear();
        self.quoted = false;
        self.poisoned = None;
        self.byte = 0;
        self.line = 1;
        self.field = 0;
    }

    /// The number of bytes consumed so far.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The current line number, as measured by the number of `\n` bytes
    /// consumed plus one.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The number of field units emitted so far.
    pub fn field(&self) -> u64 {
        self.field
    }

    /// Returns true if some bytes of a field have been consumed but the
    /// field has not been terminated yet.
    pub fn is_mid_field(&self) -> bool {
        self.state != State::Start
    }

    /// The bytes of the current, unterminated field.
    ///
    /// A pending closing quote or carriage return is not included.
    pub fn pending(&self) -> &[u8] {
        &self.acc
    }

    /// Consume a single byte of input.
    ///
    /// If this byte terminates a field, then the complete field unit is
    /// returned. Otherwise `None` is returned and the byte is held until
    /// the field ends.
    pub fn step(&mut self, b: u8) -> Result<Option<FieldUnit>, Error> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        if let Err(kind) = self.transition(b) {
            let err = Error::new(kind, self.byte, self.line, self.field);
            self.poisoned = Some(err);
            return Err(err);
        }
        self.byte += 1;
        self.line += (b == b'\n') as u64;
        if self.state == State::Accept {
            Ok(Some(self.accept()))
        } else {
            Ok(None)
        }
    }

    /// Consume bytes from `input` until either a field unit is complete or
    /// `input` is exhausted.
    ///
    /// The number of bytes consumed is returned along with the field unit,
    /// if one was completed. The remaining bytes should be passed to the
    /// next call. The result is the same as calling `step` on each byte in
    /// order, but runs of bytes that cannot end the current field are
    /// copied in bulk.
    pub fn feed(
        &mut self,
        input: &[u8],
    ) -> Result<(Option<FieldUnit>, usize), Error> {
        let mut nin = 0;
        while nin < input.len() {
            if self.state == State::InString && self.poisoned.is_none() {
                let rest = &input[nin..];
                let skip = if self.quoted {
                    memchr(b'"', rest)
                } else {
                    memchr3(b',', b'\n', b'\r', rest)
                };
                let skip = skip.unwrap_or(rest.len());
                if skip > 0 {
                    let run = &rest[..skip];
                    self.acc.extend_from_slice(run);
                    self.byte += skip as u64;
                    self.line += memchr_iter(b'\n', run).count() as u64;
                    nin += skip;
                    continue;
                }
            }
            let unit = self.step(input[nin])?;
            nin += 1;
            if unit.is_some() {
                return Ok((unit, nin));
            }
        }
        Ok((None, nin))
    }

    /// Signal the end of input and flush any unterminated final field.
    ///
    /// Callers that want to drop an unterminated final field should simply
    /// stop calling `step` instead.
    ///
    /// A pending closing quote is restored, and a quoted empty field
    /// collapses to nothing, so this returns `None` for it. A pending
    /// carriage return is an error since no `\n` can follow it. On success,
    /// the transducer is ready for a new stream (though its position is
    /// kept).
    pub fn finish(&mut self) -> Result<Option<FieldUnit>, Error> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }
        match self.state {
            State::Start => return Ok(None),
            State::InString => {}
            State::AfterQuote => {
                self.acc.push(b'"');
                if self.acc.len() == 2 {
                    self.acc.clear();
                }
            }
            State::AfterCR => {
                let kind = ErrorKind::StrayCarriageReturn { found: None };
                let err = Error::new(kind, self.byte, self.line, self.field);
                self.poisoned = Some(err);
                return Err(err);
            }
            State::Accept => unreachable!("accept state is never at rest"),
        }
        if self.acc.is_empty() {
            self.clear();
            return Ok(None);
        }
        Ok(Some(self.take(false)))
    }

    fn transition(&mut self, b: u8) -> Result<(), ErrorKind> {
        use self::State::*;

        match self.state {
            Start => match b {
                b'\r' => self.state = AfterCR,
                b',' | b'\n' => {
                    self.acc.push(b);
                    self.state = Accept;
                }
                b'"' => {
                    self.quoted = true;
                    self.acc.push(b);
                    self.state = InString;
                }
                _ => {
                    self.acc.push(b);
                    self.state = InString;
                }
            },
            InString if self.quoted => match b {
                b'"' => self.state = AfterQuote,
                _ => self.acc.push(b),
            },
            InString => match b {
                b',' | b'\n' => {
                    self.acc.push(b);
                    self.state = Accept;
                }
                b'\r' => self.state = AfterCR,
                _ => self.acc.push(b),
            },
            AfterQuote => match b {
                b'"' => {
                    self.acc.extend_from_slice(b"\"\"");
                    self.state = InString;
                }
                b',' | b'\n' => {
                    self.acc.push(b'"');
                    self.acc.push(b);
                    self.state = Accept;
                }
                b'\r' => {
                    self.acc.push(b'"');
                    self.state = AfterCR;
                }
                _ => return Err(ErrorKind::UnpairedQuote { found: b }),
            },
            AfterCR => match b {
                b'\n' => {
                    self.acc.push(b);
                    self.state = Accept;
                }
                _ => {
                    return Err(ErrorKind::StrayCarriageReturn {
                        found: Some(b),
                    })
                }
            },
            Accept => unreachable!("accept state is never at rest"),
        }
        Ok(())
    }

    fn accept(&mut self) -> FieldUnit {
        // An opening quote, a closing quote and a delimiter means the quoted
        // field was empty. Keep only the delimiter.
        if self.quoted && self.acc.len() == 3 {
            let delim = self.acc[2];
            self.acc.clear();
            self.acc.push(delim);
        }
        self.take(true)
    }

    fn take(&mut self, terminated: bool) -> FieldUnit {
        let unit = FieldUnit { bytes: self.acc.to_vec(), terminated };
        self.field += 1;
        self.clear();
        unit
    }

    fn clear(&mut self) {
        self.acc.clear();
        self.quoted = false;
        self.state = State::Start;
    }
}
