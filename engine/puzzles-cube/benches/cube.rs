use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use puzzle_core::PuzzleEnv;
use puzzles_cube::{Cube2x2, Cube3x3};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_step");

    group.bench_function("cube3_quarter_turn", |b| {
        b.iter_batched(
            Cube3x3::new,
            |mut cube| {
                cube.step(9); // R
                cube
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cube2_quarter_turn", |b| {
        b.iter_batched(
            Cube2x2::new,
            |mut cube| {
                cube.step(9);
                cube
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_scramble(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_scramble");

    group.bench_function("cube3_20_moves", |b| {
        let mut cube = Cube3x3::new();
        b.iter_batched(
            || ChaCha20Rng::seed_from_u64(42),
            |mut rng| {
                cube.reset_to_solved();
                cube.scramble(20, &mut rng);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_embedding(c: &mut Criterion) {
    let mut group = c.benchmark_group("cube_embedding");

    group.bench_function("cube3_one_hot", |b| {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut cube = Cube3x3::new();
        cube.scramble(20, &mut rng);
        b.iter(|| black_box(cube.state_embedding()));
    });

    group.bench_function("cube3_is_solved", |b| {
        let cube = Cube3x3::new();
        b.iter(|| black_box(cube.is_solved()));
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_scramble, bench_embedding);
criterion_main!(benches);
