//! End-to-end behaviour of the layout engine and drag controller.

use approx::assert_abs_diff_eq;
use corr_graph::dataset::parse_dataset;
use corr_graph::{
    DragController, DragState, LinkSpec, NodeSpec, Point, Simulation, SimulationConfig,
    ValidationError,
};

fn stock_pair(seed: u64) -> Simulation {
    Simulation::build(
        SimulationConfig::default().with_seed(seed),
        [NodeSpec::new("AAPL", 1), NodeSpec::new("GOOGL", 1)],
        [LinkSpec::new("AAPL", "GOOGL", 4.0)],
        100.0,
        100.0,
    )
    .expect("valid dataset")
}

fn position(simulation: &Simulation, id: &str) -> Point {
    simulation.node(id).expect("node exists").position
}

#[test]
fn linked_pair_settles_near_link_distance() {
    for seed in [1, 2, 3, 42, 1234] {
        let mut simulation = stock_pair(seed);
        for node in simulation.nodes() {
            assert!((0.0..=100.0).contains(&node.position.x));
            assert!((0.0..=100.0).contains(&node.position.y));
        }

        let mut tick = simulation.snapshot();
        for _ in 0..300 {
            tick = simulation.step();
        }

        let aapl = tick.position("AAPL").expect("AAPL in tick");
        let googl = tick.position("GOOGL").expect("GOOGL in tick");
        let distance = aapl.distance(googl);
        // The spring rest length is 50; repulsion stretches it slightly.
        assert_abs_diff_eq!(distance, 50.0, epsilon = 10.0);
        assert!(simulation.is_settled());
    }
}

#[test]
fn unknown_link_target_fails_and_leaves_nothing_behind() {
    let mut simulation = Simulation::new(SimulationConfig::default().with_seed(9));
    let result = simulation.initialize(
        [NodeSpec::new("AAPL", 1), NodeSpec::new("GOOGL", 1)],
        [LinkSpec::new("AAPL", "MSFT", 1.0)],
        100.0,
        100.0,
    );

    assert!(matches!(
        result,
        Err(ValidationError::UnknownNode { ref id, .. }) if id == "MSFT"
    ));
    assert!(simulation.nodes().is_empty());
    for _ in 0..3 {
        assert!(simulation.step().is_empty());
    }
}

#[test]
fn dragged_node_stays_put_until_released() {
    let mut simulation = stock_pair(42);
    let mut drag = DragController::default();

    assert!(drag.pointer_down(&mut simulation, "AAPL"));
    drag.pointer_move(&mut simulation, Point::new(10.0, 10.0));
    for _ in 0..5 {
        let tick = simulation.step();
        assert_eq!(tick.position("AAPL"), Some(Point::new(10.0, 10.0)));
        assert_eq!(position(&simulation, "AAPL"), Point::new(10.0, 10.0));
    }

    drag.pointer_up(&mut simulation);
    assert_eq!(drag.state(), &DragState::Idle);
    let tick = simulation.step();
    assert_ne!(tick.position("AAPL"), Some(Point::new(10.0, 10.0)));
}

#[test]
fn pinned_node_ignores_heavy_neighbourhood() {
    let nodes = (0..12).map(|index| NodeSpec::new(format!("S{index}"), 1 + index % 2));
    let links = (1..12).map(|index| LinkSpec::new("S0", format!("S{index}"), 0.9));
    let mut simulation = Simulation::build(
        SimulationConfig::default().with_seed(5),
        nodes,
        links,
        200.0,
        200.0,
    )
    .expect("valid dataset");

    let held = Point::new(3.0, 197.0);
    simulation.pin("S0", held);
    for _ in 0..200 {
        simulation.step();
        assert_eq!(position(&simulation, "S0"), held);
        assert_eq!(simulation.node("S0").expect("node exists").velocity, Point::ZERO);
    }
}

#[test]
fn released_node_integrates_from_drop_point() {
    let mut simulation = stock_pair(7);
    for _ in 0..20 {
        simulation.step();
    }
    let before_drag = position(&simulation, "GOOGL");

    let mut drag = DragController::default();
    drag.pointer_down(&mut simulation, "GOOGL");
    let drop = Point::new(90.0, 15.0);
    drag.pointer_move(&mut simulation, drop);
    drag.pointer_up(&mut simulation);

    let after_release = position(&simulation, "GOOGL");
    assert_eq!(after_release, drop);
    assert_ne!(after_release, before_drag);

    simulation.step();
    let node = simulation.node("GOOGL").expect("node exists");
    // Starting at rest, the first step moves the node by exactly its new velocity.
    assert_eq!(node.position, drop + node.velocity);
    assert_ne!(node.velocity, Point::ZERO);
}

#[test]
fn alpha_never_rises_without_reheat() {
    let mut simulation = stock_pair(3);
    let mut previous = simulation.alpha();
    let mut steps = 0;
    while !simulation.is_settled() {
        let tick = simulation.step();
        assert!(tick.alpha <= previous);
        previous = tick.alpha;
        steps += 1;
        assert!(steps < 1_000);
    }
    assert!(simulation.alpha() < simulation.config().alpha_min);
}

#[test]
fn drag_on_cooled_layout_reheats_then_cools_again() {
    let mut simulation = stock_pair(8);
    while !simulation.is_settled() {
        simulation.step();
    }

    let mut drag = DragController::default();
    drag.pointer_down(&mut simulation, "AAPL");
    assert_eq!(simulation.alpha_target(), 0.3);
    for _ in 0..50 {
        simulation.step();
    }
    assert!(simulation.alpha() > simulation.config().alpha_min);

    drag.pointer_up(&mut simulation);
    assert_eq!(simulation.alpha_target(), 0.0);
    while !simulation.is_settled() {
        simulation.step();
    }
}

#[test]
fn every_initial_position_is_finite() {
    let nodes = (0..40).map(|index| NodeSpec::new(index.to_string(), 1));
    let simulation = Simulation::build(
        SimulationConfig::default(),
        nodes,
        Vec::new(),
        640.0,
        480.0,
    )
    .expect("valid dataset");
    assert!(simulation.nodes().iter().all(|node| node.position.is_finite()));
}

#[test]
fn analysis_response_drives_a_simulation() {
    let raw = r#"{
        "AAPL": {
            "nodes": [{"id": 0, "group": 1}, {"id": 1, "group": 1}, {"id": 2, "group": 1}],
            "links": [
                {"source": 0, "target": 1, "value": 0.91},
                {"source": 1, "target": 2, "value": 0.74}
            ],
            "time_series_image": "/images/AAPL_time_series.png"
        }
    }"#;
    let dataset = parse_dataset(raw).expect("valid dataset");
    let graph = dataset.graph(Some("AAPL")).expect("AAPL exists");
    let mut simulation = Simulation::build(
        SimulationConfig::default().with_seed(4),
        graph.nodes.clone(),
        graph.links.clone(),
        300.0,
        300.0,
    )
    .expect("valid dataset");

    let tick = simulation.step();
    assert_eq!(tick.positions.keys().collect::<Vec<_>>(), vec!["0", "1", "2"]);

    let json = serde_json::to_value(&tick).expect("tick serializes");
    assert!(json["positions"]["1"]["x"].is_f64());
}
