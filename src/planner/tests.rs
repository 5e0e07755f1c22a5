use super::*;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::grid::{BrushKind, Grid};
use glam::IVec3;

fn sim(map: &str) -> Simulation {
    let config = SimulationConfig {
        worker_threads: 1,
        ..SimulationConfig::default()
    };
    Simulation::new(Grid::from_ascii(map).unwrap(), config).unwrap()
}

fn planner_config() -> PlannerConfig {
    PlannerConfig {
        max_depth: 3,
        window_seconds: 1.0,
        seed: 11,
        ..PlannerConfig::default()
    }
}

#[test]
fn test_rollout_results_prefer_fewer_steps() {
    let quick = RolloutResult {
        steps: 2,
        drained: 0.96,
    };
    let slow = RolloutResult {
        steps: 3,
        drained: 1.0,
    };
    let quick_full = RolloutResult {
        steps: 2,
        drained: 1.0,
    };
    assert!(quick.is_better_than(&slow));
    assert!(!slow.is_better_than(&quick));
    assert!(quick_full.is_better_than(&quick));
    assert!(!quick.is_better_than(&quick));
}

#[test]
fn test_planner_kind_parses_names() {
    assert_eq!("mcts".parse::<PlannerKind>(), Ok(PlannerKind::Mcts));
    assert_eq!("GBFS".parse::<PlannerKind>(), Ok(PlannerKind::Greedy));
    assert_eq!("rollout".parse::<PlannerKind>(), Ok(PlannerKind::Random));
    assert!("astar".parse::<PlannerKind>().is_err());
    assert_eq!(PlannerKind::Greedy.to_string(), "gbfs");
}

#[test]
fn test_build_rejects_invalid_config() {
    let config = PlannerConfig {
        goal_fraction: 0.0,
        ..PlannerConfig::default()
    };
    assert!(matches!(
        PlannerKind::Mcts.build(config),
        Err(SimError::InvalidConfig(_))
    ));
    let planner = PlannerKind::Random.build(planner_config()).unwrap();
    assert_eq!(planner.name(), "random");
}

#[test]
fn test_candidate_sets() {
    let planar = GreedyPlanner::candidate_actions(15.0, true);
    assert_eq!(planar.len(), 24);
    assert_eq!(planar[0], RotationAction::IDENTITY);
    assert_eq!(planar[23], RotationAction::roll(345.0));

    let spatial = GreedyPlanner::candidate_actions(15.0, false);
    assert_eq!(spatial.len(), 24 + 23);
    assert_eq!(spatial[1], RotationAction::pitch(15.0));
    assert_eq!(spatial[24], RotationAction::roll(15.0));
}

#[test]
fn test_exit_distances_follow_open_cells() {
    let grid = Grid::from_ascii(
        "
        ooooo
        ow.wo
        o...o
        oo.oo
        ",
    )
    .unwrap();
    let distances = ExitDistances::compute(&grid);

    assert_eq!(distances.get(IVec3::new(2, 0, 0)), Some(0));
    assert_eq!(distances.get(IVec3::new(2, 1, 0)), Some(1));
    assert_eq!(distances.get(IVec3::new(1, 2, 0)), Some(3));
    assert_eq!(distances.get(IVec3::new(0, 0, 0)), None);
    assert_eq!(distances.max(), 3);
    assert_eq!(distances.heuristic(&grid), 6);
}

#[test]
fn test_sealed_fluid_counts_past_farthest_exit() {
    let grid = Grid::from_ascii("ooo\nowo\nooo\n").unwrap();
    let distances = ExitDistances::compute(&grid);
    assert_eq!(distances.get(IVec3::new(1, 1, 0)), None);
    assert_eq!(distances.heuristic(&grid), 1);
}

#[test]
fn test_search_requires_begin() {
    let mut sim = sim(".w.\n...\n");
    let mut planners: Vec<Box<dyn Planner>> = vec![
        Box::new(RandomRolloutPlanner::new(planner_config())),
        Box::new(MctsPlanner::new(planner_config())),
        Box::new(GreedyPlanner::new(planner_config())),
    ];
    for planner in &mut planners {
        assert!(matches!(
            planner.search_step(&mut sim),
            Err(SimError::SearchNotStarted)
        ));
        assert!(matches!(
            planner.decide(&mut sim),
            Err(SimError::SearchNotStarted)
        ));
        assert_eq!(planner.peek_decision(), None);
    }
}

#[test]
fn test_random_rollout_finds_one_step_drain() {
    let mut sim = sim(".w.\n...\n...\n");
    sim.set_change_tracking(true);
    let mut planner = RandomRolloutPlanner::new(planner_config());

    planner.begin_search(&mut sim).unwrap();
    assert!(!sim.is_tracking_changes());
    for _ in 0..4 {
        planner.search_step(&mut sim).unwrap();
        assert_eq!(sim.total_volume(), 1.0);
    }
    assert_eq!(planner.rollouts(), 4);
    assert_eq!(planner.best().map(|b| b.steps), Some(1));

    let action = planner.decide(&mut sim).unwrap();
    assert_eq!(Some(action), planner.peek_decision());
    assert!(sim.is_tracking_changes());
    assert_eq!(sim.take_changes().len(), sim.grid().size().cell_count());
}

#[test]
fn test_mcts_tree_grows_and_reports() {
    let mut sim = sim(
        "
        o.w.o
        o...o
        ooo.o
        ",
    );
    let mut planner = MctsPlanner::new(planner_config());
    planner.begin_search(&mut sim).unwrap();
    let before = sim.capture();

    for _ in 0..6 {
        planner.search_step(&mut sim).unwrap();
    }
    assert_eq!(sim.capture(), before);
    assert_eq!(planner.nodes()[0].visits(), 6);
    assert!(!planner.nodes()[0].children().is_empty());
    assert!(planner.nodes().iter().all(|n| n.depth() <= 3));

    let report = planner.tree_report();
    let mut lines = report.lines();
    assert!(lines.next().unwrap().starts_with("max_depth=3,"));
    let tree = lines.next().unwrap();
    assert!(tree.starts_with("volume=1,rotation=(0,0,0),depth=0,visits=6,"));
    assert!(tree.ends_with(",]"));
    assert_eq!(planner.report(), Some(report.clone()));
}

#[test]
fn test_greedy_expansion_restores_live_state() {
    let mut sim = sim(
        "
        oo.oo
        ow.wo
        o...o
        ooooo
        ",
    );
    let config = PlannerConfig {
        goal_fraction: 1.0,
        window_seconds: 0.1,
        ..planner_config()
    };
    let mut planner = GreedyPlanner::new(config);
    planner.begin_search(&mut sim).unwrap();
    let before = sim.capture();

    planner.search_step(&mut sim).unwrap();
    assert_eq!(sim.capture(), before);
    assert_eq!(planner.candidate_scores().len(), 24);
    assert_eq!(planner.expansions(), 1);
    assert!(planner.peek_decision().is_some());
}

#[test]
fn test_mcts_expands_root_already_at_goal() {
    let mut sim = sim("....\n....\n....\n.w..\n");
    sim.step();
    assert_eq!(sim.drained_fraction(), 1.0);

    let mut planner = MctsPlanner::new(planner_config());
    planner.begin_search(&mut sim).unwrap();
    planner.search_step(&mut sim).unwrap();
    assert_eq!(planner.nodes()[0].children().len(), 1);

    let expected = planner.peek_decision();
    let action = planner.decide(&mut sim).unwrap();
    assert_eq!(Some(action), expected);
}

#[test]
fn test_greedy_recomputes_distances_when_walls_change() {
    let body = "o....o
        o.ww.o
        o....o
        o....o
        oooooo
    ";
    let mut first = sim(&format!("ooo.oo\n{body}"));
    let mut second = sim(&format!("o.oooo\n{body}"));
    let second_exit = IVec3::new(1, 5, 0);

    let mut planner = GreedyPlanner::new(planner_config());
    planner.begin_search(&mut first).unwrap();
    assert_eq!(planner.distances().unwrap().get(second_exit), None);

    planner.begin_search(&mut second).unwrap();
    assert_eq!(planner.distances().unwrap().get(second_exit), Some(0));
    assert_eq!(planner.distances().unwrap().get(IVec3::new(3, 5, 0)), None);

    // sealing the exit by painting counts as a new structure
    second.paint(second_exit, 0.0, BrushKind::Solid);
    planner.begin_search(&mut second).unwrap();
    assert_eq!(planner.distances().unwrap().get(second_exit), None);
}
