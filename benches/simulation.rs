//! Simulation benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;

use endonasal_simulator::config::{Parameters, VesselParameters};
use endonasal_simulator::geometry::AnatomyCatalogue;
use endonasal_simulator::physics::{CollisionEngine, VesselProximityModel};
use endonasal_simulator::simulation::{SimulationEngine, TickInput};
use endonasal_simulator::state::{HandPose, MedialWallState, TumorScenario};
use endonasal_simulator::surgery::{derive_phase, LevelDefinition};
use endonasal_simulator::tracking::ScriptedHandTrack;

fn bench_engine_tick(c: &mut Criterion) {
    let mut engine = SimulationEngine::new(Parameters::default(), LevelDefinition::medial_wall(), 42);
    let mut state = engine.new_game(TumorScenario::default());
    let input = TickInput::new(HandPose::new(Vec3::new(0.3, -0.1, 0.6), 30.0, 0.8));

    c.bench_function("engine_tick", |b| {
        b.iter(|| engine.tick(black_box(&mut state), black_box(&input)))
    });
}

fn bench_scripted_procedure(c: &mut Criterion) {
    c.bench_function("scripted_procedure", |b| {
        b.iter(|| {
            let mut engine =
                SimulationEngine::new(Parameters::default(), LevelDefinition::medial_wall(), 42);
            let mut state = engine.new_game(TumorScenario::default());
            let mut track = ScriptedHandTrack::medial_wall_procedure();
            while let Some(sample) = track.next_sample() {
                if let Some(tool) = sample.tool_change {
                    engine.select_tool(&mut state, tool);
                }
                engine.tick(&mut state, &TickInput::new(sample.hand));
            }
            state.level.score
        })
    });
}

fn bench_collision_check(c: &mut Criterion) {
    let anatomy = AnatomyCatalogue::default();
    let collision = CollisionEngine::new();
    let tip = Vec3::new(-0.5, 0.2, 8.8);

    c.bench_function("collision_check", |b| {
        b.iter(|| collision.check(black_box(tip), anatomy.structures()).is_colliding)
    });
}

fn bench_vessel_distance(c: &mut Criterion) {
    let vessels = VesselProximityModel::with_default_paths(VesselParameters::default());
    let tip = Vec3::new(-1.2, 0.3, 8.5);

    c.bench_function("vessel_nearest_distance", |b| {
        b.iter(|| vessels.nearest_distance(black_box(tip)))
    });
}

fn bench_derive_phase(c: &mut Criterion) {
    let wall = MedialWallState::default();

    c.bench_function("derive_phase", |b| {
        b.iter(|| derive_phase(black_box(82.0), black_box(true), &wall, black_box(Some(35.0))))
    });
}

criterion_group!(
    benches,
    bench_engine_tick,
    bench_scripted_procedure,
    bench_collision_check,
    bench_vessel_distance,
    bench_derive_phase
);
criterion_main!(benches);
