// Planner behaviour against the live simulation.

use gravity_drain::{
    GreedyPlanner, Grid, MctsPlanner, Planner, PlannerConfig, PlannerKind, RolloutResult,
    Simulation, SimulationConfig,
};

const SINGLE_EXIT: &str = "
    oooooooo
    o.wwww.o
    o......o
    o......o
    o..oo..o
    o......o
    o......o
    ooo.oooo
";

fn simulation(map: &str) -> Simulation {
    let config = SimulationConfig {
        worker_threads: 2,
        ..SimulationConfig::default()
    };
    Simulation::new(Grid::from_ascii(map).unwrap(), config).unwrap()
}

#[test]
fn test_greedy_picks_first_lowest_distance_candidate() {
    let mut sim = simulation(SINGLE_EXIT);
    let config = PlannerConfig {
        goal_fraction: 1.0,
        window_seconds: 0.1,
        ..PlannerConfig::default()
    };
    let mut planner = GreedyPlanner::new(config);
    planner.begin_search(&mut sim).unwrap();
    planner.search_step(&mut sim).unwrap();

    let scores = planner.candidate_scores();
    assert_eq!(scores.len(), 24);
    let lowest = *scores.iter().min().unwrap();
    let first = scores.iter().position(|&s| s == lowest).unwrap();

    assert_eq!(planner.peek_decision(), Some(planner.candidates()[first]));

    let action = planner.decide(&mut sim).unwrap();
    assert_eq!(action, planner.candidates()[first]);
    assert_eq!(sim.total_volume(), 4.0);
}

#[test]
fn test_mcts_best_rollouts_never_regress() {
    let mut sim = simulation(SINGLE_EXIT);
    let config = PlannerConfig {
        max_depth: 4,
        window_seconds: 0.5,
        seed: 21,
        ..PlannerConfig::default()
    };
    let mut planner = MctsPlanner::new(config);
    planner.begin_search(&mut sim).unwrap();

    let mut seen: Vec<Option<RolloutResult>> = Vec::new();
    for _ in 0..25 {
        planner.search_step(&mut sim).unwrap();
        let nodes = planner.nodes();
        for (node, before) in nodes.iter().zip(&seen) {
            if let Some(before) = before {
                let now = node.best_rollout().expect("visited node keeps its best rollout");
                assert!(!before.is_better_than(&now), "{before:?} regressed to {now:?}");
            }
        }
        seen = nodes.iter().map(|n| n.best_rollout()).collect();
    }

    let root = &planner.nodes()[0];
    assert_eq!(root.visits(), 25);
    for node in planner.nodes() {
        assert!(node.visits() >= 1);
        assert!((0.0..=1.0).contains(&node.eval()));
    }
}

#[test]
fn test_decide_restores_root_and_renotifies() {
    for kind in [PlannerKind::Random, PlannerKind::Mcts, PlannerKind::Greedy] {
        let mut sim = simulation(SINGLE_EXIT);
        sim.set_change_tracking(true);
        let config = PlannerConfig {
            max_depth: 2,
            window_seconds: 0.2,
            ..PlannerConfig::default()
        };
        let mut planner = kind.build(config).unwrap();

        planner.begin_search(&mut sim).unwrap();
        for _ in 0..3 {
            planner.search_step(&mut sim).unwrap();
        }
        assert!(sim.take_changes().is_empty(), "{kind} leaked search events");

        let expected = planner.peek_decision().expect("a candidate after searching");
        let action = planner.decide(&mut sim).unwrap();
        assert_eq!(action, expected);
        assert_eq!(sim.total_volume(), 4.0);
        assert_eq!(
            sim.take_changes().len(),
            sim.grid().size().cell_count(),
            "{kind} did not re-notify every cell"
        );
    }
}
