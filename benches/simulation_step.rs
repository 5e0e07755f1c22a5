// Tick throughput of the fluid automaton on the built-in levels, straight
// and tilted, plus the cost of rebuilding a gravity frame.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use gravity_drain::grid::levels;
use gravity_drain::{GravityFrame, GridSize, RotationAction, Simulation, SimulationConfig};
use std::time::Duration;

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_step");
    group.measurement_time(Duration::from_secs(5));

    for index in 0..levels::COUNT {
        for roll in [0.0, 30.0] {
            let grid = levels::load(index).expect("built-in level");
            let mut sim = Simulation::new(grid, SimulationConfig::default()).expect("simulation");
            sim.rotate(RotationAction::roll(roll)).expect("rotation");
            let start = sim.capture();

            let id = BenchmarkId::new(levels::NAMES[index], format!("roll {roll}"));
            group.bench_function(id, |b| {
                b.iter(|| {
                    sim.restore(&start).expect("restore");
                    black_box(sim.run(10))
                })
            });
        }
    }
    group.finish();
}

fn bench_frame_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_build");
    let direction = Vec3::new(0.3, -1.0, 0.45);

    for n in [16, 32, 64] {
        let size = GridSize::cube(n).expect("size");
        group.bench_with_input(BenchmarkId::from_parameter(n), &size, |b, &size| {
            b.iter(|| GravityFrame::build(black_box(direction), size).expect("frame"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_frame_build);
criterion_main!(benches);
