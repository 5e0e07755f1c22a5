use super::*;
use crate::grid::{FluidCell, GridSize};

fn config() -> SimulationConfig {
    SimulationConfig {
        worker_threads: 2,
        ..SimulationConfig::default()
    }
}

fn simulation(map: &str) -> Simulation {
    Simulation::new(Grid::from_ascii(map).unwrap(), config()).unwrap()
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

fn fluid_at(sim: &Simulation, x: i32, y: i32) -> FluidCell {
    *sim.grid()
        .get(IVec3::new(x, y, 0))
        .and_then(Cell::as_fluid)
        .unwrap_or_else(|| panic!("no fluid at ({x}, {y})"))
}

#[test]
fn test_bottom_row_fluid_drains_in_one_tick() {
    let mut sim = simulation(".\nw\n");
    let report = sim.step();

    assert_eq!(report.tick, 1);
    assert_close(report.drained, 1.0);
    assert_close(sim.total_volume(), 0.0);
    assert_close(sim.drained_fraction(), 1.0);
    assert!(sim.grid().get(IVec3::ZERO).unwrap().is_empty());
}

#[test]
fn test_open_bottom_drains_falling_fluid() {
    let mut sim = simulation(".w.\n...\n...\n");
    let drained = sim.run(10);

    assert_close(drained, 1.0);
    assert_close(sim.total_volume(), 0.0);
    assert_eq!(sim.grid().fluid_cell_count(), 0);
}

#[test]
fn test_fluid_settles_and_spreads_on_floor() {
    let mut sim = simulation(
        "
        .w..
        ....
        ....
        oooo
        ",
    );
    let drained = sim.run(10);

    assert_eq!(drained, 0.0);
    assert_eq!(sim.grid().fluid_cell_count(), 4);
    for (p, cell) in sim.grid().iter() {
        if let Cell::Fluid(fluid) = cell {
            assert_eq!(p.y, 1, "fluid left the floor row at {p}");
            assert_close(fluid.volume, 0.25);
            assert_close(fluid.capacity, 1.0);
        }
    }
    assert_close(sim.grid().total_volume(), 1.0);
}

#[test]
fn test_stacked_column_compresses() {
    let mut sim = simulation("w\nw\nw\no\n");
    sim.step();

    let capacities: Vec<f32> = (1..=3).map(|y| fluid_at(&sim, 0, y).capacity).collect();
    assert_close(capacities[0], 1.3);
    assert_close(capacities[1], 1.15);
    assert_close(capacities[2], 1.0);

    // each cell fills the one below it up to that cell's capacity
    assert_close(fluid_at(&sim, 0, 1).volume, 1.3);
    assert_close(fluid_at(&sim, 0, 2).volume, 1.15);
    assert_close(fluid_at(&sim, 0, 3).volume, 0.55);
    assert_close(sim.grid().total_volume(), 3.0);
}

#[test]
fn test_excess_volume_overflows_upward() {
    let mut grid = Grid::from_ascii(".\n.\nw\no\n").unwrap();
    grid.set(
        IVec3::new(0, 1, 0),
        Cell::Fluid(FluidCell::new(2.0, 1.0)),
    )
    .unwrap();
    let mut sim = Simulation::new(grid, config()).unwrap();
    sim.step();

    assert_close(fluid_at(&sim, 0, 1).volume, 1.0);
    assert_close(fluid_at(&sim, 0, 2).volume, 1.0);
    assert_eq!(fluid_at(&sim, 0, 2).momentum, 0.0);
    assert!(sim.grid().get(IVec3::new(0, 3, 0)).unwrap().is_empty());
}

#[test]
fn test_closed_box_conserves_volume_under_tilt() {
    let mut sim = simulation(
        "
        oooooooo
        o.wwww.o
        o..ww..o
        o......o
        o......o
        o..o...o
        o......o
        oooooooo
        ",
    );
    let initial = sim.total_volume();
    assert_close(initial, 6.0);

    for roll in [30.0, 45.0, -70.0] {
        sim.rotate(RotationAction::roll(roll)).unwrap();
        let drained = sim.run(40);
        assert_eq!(drained, 0.0);
        assert!((sim.grid().total_volume() - initial).abs() < 1e-3);
        for cell in sim.grid().cells() {
            assert!(cell.volume() >= 0.0);
        }
    }
    assert_close(sim.total_volume(), initial);
    assert_eq!(sim.drained_fraction(), 0.0);
}

#[test]
fn test_roll_turns_gravity_in_plane() {
    let mut sim = simulation("...\n...\n");
    sim.rotate(RotationAction::roll(90.0)).unwrap();

    let g = sim.gravity_direction();
    assert!((g - Vec3::NEG_X).length() < 1e-5, "gravity {g}");
    assert_eq!(sim.frame().down_axis(), 0);
}

#[test]
fn test_update_gravity_rejects_zero_vector() {
    let mut sim = simulation("...\n...\n");
    sim.update_gravity(Vec3::X).unwrap();
    let before = sim.orientation();

    let err = sim.update_gravity(Vec3::ZERO).unwrap_err();
    assert!(matches!(err, SimError::DegenerateDirection { .. }));
    assert_eq!(sim.orientation(), before);
    assert!((sim.gravity_direction() - Vec3::X).length() < 1e-5);
}

#[test]
fn test_with_gravity_builds_matching_frame() {
    let grid = Grid::new(GridSize::cube(4).unwrap());
    let sim = Simulation::with_gravity(grid, config(), Vec3::new(0.2, 0.3, -1.0)).unwrap();
    assert_eq!(sim.frame().down_axis(), 2);
}

#[test]
fn test_snapshot_restores_and_replays() {
    let mut sim = Simulation::new(crate::grid::levels::load(0).unwrap(), config()).unwrap();
    sim.rotate(RotationAction::roll(20.0)).unwrap();
    let snapshot = sim.capture();

    sim.reseed(7);
    sim.run(15);
    let first = sim.grid().clone();
    let first_total = sim.total_volume();

    sim.restore(&snapshot).unwrap();
    assert_eq!(sim.grid(), snapshot.grid());
    assert_eq!(sim.total_volume(), snapshot.total_volume());

    sim.reseed(7);
    sim.run(15);
    assert_eq!(sim.grid(), &first);
    assert_eq!(sim.total_volume(), first_total);
}

#[test]
fn test_restore_rejects_other_size() {
    let mut sim = simulation("...\n...\n");
    let other = simulation("..\n..\n").capture();
    assert!(matches!(
        sim.restore(&other),
        Err(SimError::SnapshotMismatch { .. })
    ));
}

#[test]
fn test_paint_rebases_volume() {
    let mut sim = Simulation::new(Grid::new(GridSize::planar(5, 5).unwrap()), config()).unwrap();
    sim.set_change_tracking(true);

    let changed = sim.paint(IVec3::new(2, 2, 0), 1.0, BrushKind::Fluid);
    assert_eq!(changed, 5);
    assert_close(sim.total_volume(), 5.0);
    assert_close(sim.initial_volume(), 5.0);
    assert_eq!(sim.drained_fraction(), 0.0);
    assert_eq!(sim.take_changes().len(), 5);
}

#[test]
fn test_change_tracking_reports_moves() {
    let mut sim = simulation("w\n.\n.\no\n");
    sim.step();
    assert!(sim.take_changes().is_empty());

    sim.set_change_tracking(true);
    sim.step();
    assert!(!sim.take_changes().is_empty());

    sim.notify_all();
    assert_eq!(sim.take_changes().len(), sim.grid().size().cell_count());
}

fn floor_with_puddle(volume: f32) -> Simulation {
    let mut grid = Grid::from_ascii("....\n....\noooo\n").unwrap();
    grid.set(
        IVec3::new(1, 1, 0),
        Cell::Fluid(FluidCell::new(volume, 1.0)),
    )
    .unwrap();
    Simulation::new(grid, config()).unwrap()
}

#[test]
fn test_thin_puddle_stays_below_min_flow() {
    // 0.25 over the cell and its two open neighbours is under 0.1 each
    let mut sim = floor_with_puddle(0.25);
    sim.run(5);

    assert_eq!(sim.grid().fluid_cell_count(), 1);
    assert_close(fluid_at(&sim, 1, 1).volume, 0.25);
    assert_eq!(fluid_at(&sim, 1, 1).momentum, 0.0);
}

#[test]
fn test_puddle_spills_just_above_min_flow() {
    let mut sim = floor_with_puddle(0.31);
    sim.step();

    assert_eq!(sim.grid().fluid_cell_count(), 3);
    for x in 0..3 {
        assert_close(fluid_at(&sim, x, 1).volume, 0.31 / 3.0);
    }
    assert!(sim.grid().get(IVec3::new(3, 1, 0)).unwrap().is_empty());

    // spread over four cells the average falls under min_flow again
    sim.step();
    assert_eq!(sim.grid().fluid_cell_count(), 3);
    assert_close(sim.grid().total_volume(), 0.31);
}

#[test]
fn test_change_tracking_from_config() {
    let map = "w\n.\n.\no\n";
    let untracked = simulation(map);
    assert!(!untracked.is_tracking_changes());

    let tracked = SimulationConfig {
        track_changes: true,
        ..config()
    };
    let mut sim = Simulation::new(Grid::from_ascii(map).unwrap(), tracked).unwrap();
    assert!(sim.is_tracking_changes());
    sim.step();
    assert!(!sim.take_changes().is_empty());
}

#[test]
fn test_tall_column_capacity_stops_at_max_volume() {
    let map = format!("{}o\n", "w\n".repeat(20));
    let mut sim = simulation(&map);
    let max_volume = sim.config().max_volume;
    sim.step();

    assert_close(fluid_at(&sim, 0, 1).capacity, max_volume);
    for (_, cell) in sim.grid().iter() {
        if let Cell::Fluid(fluid) = cell {
            assert!(fluid.capacity <= max_volume);
            assert!(fluid.volume <= max_volume + 1e-4);
        }
    }
    assert_close(sim.grid().total_volume(), 20.0);
}
