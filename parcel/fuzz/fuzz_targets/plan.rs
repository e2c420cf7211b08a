#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parcel::split_evenly;
use std::num::NonZeroUsize;

#[derive(Arbitrary, Debug)]
struct Input {
    len: u16,
    chunks: u16,
}

fuzz_target!(|input: Input| {
    let len = input.len as usize;
    let chunks = NonZeroUsize::new(input.chunks as usize % 1024 + 1).unwrap();
    let plan = split_evenly(len, chunks);

    // Exactly the requested number of chunks.
    assert_eq!(plan.len(), chunks.get());

    // Contiguous coverage of 0..len.
    let mut next = 0;
    for range in plan.iter() {
        assert_eq!(range.start, next);
        assert!(range.end >= range.start);
        next = range.end;
    }
    assert_eq!(next, len);

    // Sizes are balanced and non-increasing.
    let sizes: Vec<usize> = plan.iter().map(|range| range.len()).collect();
    let min = sizes.iter().min().unwrap();
    let max = sizes.iter().max().unwrap();
    assert!(max - min <= 1);
    assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
});
