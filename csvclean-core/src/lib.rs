/*!
`csvclean-core` provides a byte-at-a-time transducer that normalizes CSV
data without parsing it into records.

The transducer makes exactly three promises:

* A quoted empty field (`""`) is rewritten to an unquoted empty field.
* A `\r\n` record terminator is collapsed to `\n`.
* Everything else, including doubled quotes inside quoted fields, passes
  through byte for byte.

Malformed quoting and bare carriage returns are reported as errors. There
is no attempt to guess what the data should have been.

This crate is `no_std` but requires an allocator, since every emitted
field unit is an owned buffer.

# Example

```
use csvclean_core::Transducer;

let mut t = Transducer::new();
let mut out = vec![];
for &b in b"a,\"\",b\r\n".iter() {
    if let Some(unit) = t.step(b).unwrap() {
        out.extend_from_slice(&unit);
    }
}
assert_eq!(out, b"a,,b\n");
```
*/

#![deny(missing_docs)]
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub use crate::error::{Error, ErrorKind};
pub use crate::transducer::{FieldUnit, Transducer};

mod error;
mod transducer;
