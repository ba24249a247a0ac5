/*!
The `csvclean` crate cleans up CSV data as it streams from a reader to a
writer. It does not parse records. Instead, it passes every field through
untouched except for two rewrites:

* `\r\n` line terminators become `\n`.
* Quoted empty fields (`""`) become unquoted empty fields.

Quoted fields, including ones with doubled quotes such as
`"50"" flat-screen"`, are otherwise preserved byte for byte.

The byte level state machine lives in the `csvclean-core` crate and is
re-exported here as [`Transducer`]. This crate adds the I/O plumbing.

# Example

```
let cleaned = csvclean::Cleaner::new()
    .clean_bytes(b"city,note\r\nBoston,\"\"\r\n")
    .unwrap();
assert_eq!(cleaned, b"city,note\nBoston,\n");
```

# Malformed input

Input that cannot be normalized safely is an error. A closing quote must be
followed by a delimiter, a line terminator or another quote, and a carriage
return must be followed by a line feed:

```
use csvclean::ErrorKind;

let err = csvclean::Cleaner::new().clean_bytes(b"\"abc\"x,\n").unwrap_err();
let kind = err.syntax().unwrap().kind();
assert_eq!(kind, ErrorKind::UnpairedQuote { found: b'x' });
```

# Unterminated final field

A final field that is not followed by `,` or `\n` is dropped by default.
Use [`TrailingField::Emit`] to keep it.
*/

#![deny(missing_docs)]

pub use csvclean_core::{ErrorKind, FieldUnit, Transducer};

pub use crate::cleaner::{
    Cleaner, CleanerBuilder, FieldUnits, Summary, TrailingField,
};
pub use crate::error::{Error, Result};

mod cleaner;
mod error;
