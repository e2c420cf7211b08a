#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parcel::Fanout;
use std::num::NonZeroUsize;

#[derive(Arbitrary, Debug)]
struct Input {
    items: Vec<u16>,
    chunks: u8,
}

fuzz_target!(|input: Input| {
    let chunks = NonZeroUsize::new(input.chunks as usize % 64 + 1).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    // Chunked mapping must agree with the sequential result for every input
    // shape, including empty slices and more chunks than items.
    let outputs = runtime
        .block_on(
            Fanout::new(chunks)
                .try_map(&input.items, |item| async move { Ok::<_, ()>(item as u32 + 1) }),
        )
        .unwrap();
    let expected: Vec<u32> = input.items.iter().map(|item| *item as u32 + 1).collect();
    assert_eq!(outputs, expected);
});
