use criterion::criterion_main;


criterion_main!(map::benches, each::benches);
