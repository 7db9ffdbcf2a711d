use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use imagescript::artifact::{Artifact, SaveOptions};
use imagescript::interpreter::{Arguments, Encode, Operation};
use imagescript::operators::{Blur, Mosaic};
use imagescript::pixmap::Pixmap;

fn make_image(size: usize) -> Artifact {
    let image = Pixmap::from_fn(size, size, |x, y| [(x % 256) as u8, (y % 256) as u8, 128]);
    let data = image.encode("ppm", &SaveOptions::new()).unwrap();
    Artifact::new(data, "bench.ppm")
}

fn args(operation: &dyn Operation, pairs: &[(&str, i64)]) -> Arguments {
    let supplied: BTreeMap<String, i64> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    Arguments::bind(operation, &supplied).unwrap()
}

fn bench_blur(c: &mut Criterion) {
    let small = make_image(64);
    let large = make_image(512);
    let radius_2 = args(&Blur, &[("amount", 2)]);
    let radius_10 = args(&Blur, &[("amount", 10)]);

    c.bench_function("blur_64_r2", |b| {
        b.iter(|| black_box(Blur.apply(&small, &radius_2).unwrap().encode().unwrap()))
    });

    c.bench_function("blur_512_r10", |b| {
        b.iter(|| black_box(Blur.apply(&large, &radius_10).unwrap().encode().unwrap()))
    });
}

fn bench_mosaic(c: &mut Criterion) {
    let large = make_image(512);
    let size_8 = args(&Mosaic, &[]);

    c.bench_function("mosaic_512_s8", |b| {
        b.iter(|| black_box(Mosaic.apply(&large, &size_8).unwrap().encode().unwrap()))
    });
}

criterion_group!(benches, bench_blur, bench_mosaic);
criterion_main!(benches);
