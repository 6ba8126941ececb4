use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ring_buffer::RingBuffer;

fn push_pop(c: &mut Criterion) {
    let buffer: RingBuffer<4> = RingBuffer::new();

    c.bench_function("push_pop_cycle", |b| {
        b.iter(|| {
            for byte in 0..4u8 {
                buffer.try_push(black_box(byte));
            }
            while let Some(byte) = buffer.try_pop() {
                black_box(byte);
            }
        })
    });
}

criterion_group!(benches, push_pop);
criterion_main!(benches);
