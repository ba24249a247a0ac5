#![no_main]

use libfuzzer_sys::fuzz_target;

use csvclean::{CleanerBuilder, Transducer};

fuzz_target!(|data: &[u8]| {
    // Bulk feeding through a tiny buffer must agree with stepping byte by
    // byte, including where it fails.
    let cleaner = CleanerBuilder::new().buffer_capacity(3).build();
    let got = cleaner.clean_bytes(data);

    let mut t = Transducer::new();
    let mut expected = vec![];
    let mut err = None;
    for &b in data {
        match t.step(b) {
            Ok(Some(unit)) => expected.extend_from_slice(&unit),
            Ok(None) => {}
            Err(e) => {
                err = Some(e);
                break;
            }
        }
    }
    match (got, err) {
        (Ok(got), None) => {
            assert_eq!(got, expected);
            assert!(got.len() <= data.len());
            assert_eq!(cleaner.clean_bytes(&got).unwrap(), got);
        }
        (Err(got), Some(err)) => assert_eq!(got.syntax(), Some(&err)),
        (got, err) => panic!("mismatch: {:?} vs {:?}", got, err),
    }
});
