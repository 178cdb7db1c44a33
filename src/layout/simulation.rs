use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::error::ValidationError;
use super::forces::{ForceParams, ForceSnapshot, accumulate_forces};
use super::integrator::{CoolingSchedule, integrate};
use super::model::{Anchor, Link, LinkSpec, Node, NodeSpec};
use super::point::Point;
use super::quadtree::{Quadtree, QuadtreeCell};

fn placement_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Positions produced by one [`Simulation::step`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub alpha: f64,
    pub positions: BTreeMap<String, Point>,
}

impl Tick {
    pub fn position(&self, id: &str) -> Option<Point> {
        self.positions.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Default)]
struct StepScratch {
    positions: Vec<Point>,
    velocities: Vec<Point>,
    forces: Vec<Point>,
}

/// Force-directed layout over one node/link dataset.
///
/// The engine owns no timer: callers invoke [`step`](Self::step) once per frame
/// and render the returned [`Tick`]. Swapping datasets means calling
/// [`initialize`](Self::initialize) again (or building a new simulation);
/// nothing is diffed.
pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
    links: Vec<Link>,
    edges: Vec<(usize, usize)>,
    degrees: Vec<usize>,
    cooling: CoolingSchedule,
    width: f64,
    height: f64,
    step_count: u64,
    scratch: StepScratch,
}

impl Simulation {
    /// Empty simulation; placement is seeded from `config.seed` or entropy.
    pub fn new(config: SimulationConfig) -> Self {
        let rng = placement_rng(config.seed);
        let mut cooling = CoolingSchedule::new(&config);
        cooling.alpha = 0.0;

        Self {
            config,
            rng,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            links: Vec::new(),
            edges: Vec::new(),
            degrees: Vec::new(),
            cooling,
            width: 0.0,
            height: 0.0,
            step_count: 0,
            scratch: StepScratch::default(),
        }
    }

    pub fn build(
        config: SimulationConfig,
        nodes: impl IntoIterator<Item = NodeSpec>,
        links: impl IntoIterator<Item = LinkSpec>,
        width: f64,
        height: f64,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let mut simulation = Self::new(config);
        simulation.initialize(nodes, links, width, height)?;
        Ok(simulation)
    }

    /// Replaces the dataset and restarts the cooling schedule at `alpha = 1`.
    ///
    /// Nodes without a caller position are placed uniformly at random inside
    /// the canvas. On error the simulation is left empty.
    pub fn initialize(
        &mut self,
        nodes: impl IntoIterator<Item = NodeSpec>,
        links: impl IntoIterator<Item = LinkSpec>,
        width: f64,
        height: f64,
    ) -> Result<(), ValidationError> {
        self.clear();

        let result = self.load(nodes, links, width, height);
        if let Err(error) = &result {
            tracing::warn!(%error, "rejected simulation dataset");
        }
        result
    }

    fn load(
        &mut self,
        nodes: impl IntoIterator<Item = NodeSpec>,
        links: impl IntoIterator<Item = LinkSpec>,
        width: f64,
        height: f64,
    ) -> Result<(), ValidationError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ValidationError::InvalidCanvas { width, height });
        }

        let mut resolved_nodes = Vec::new();
        let mut index_by_id = HashMap::new();
        for spec in nodes {
            if index_by_id.contains_key(&spec.id) {
                return Err(ValidationError::DuplicateNode(spec.id));
            }

            let position = match spec.position {
                Some(position) if !position.is_finite() => {
                    return Err(ValidationError::NonFinitePosition(spec.id));
                }
                Some(position) => position,
                None => Point::new(
                    self.rng.gen_range(0.0..=width),
                    self.rng.gen_range(0.0..=height),
                ),
            };

            index_by_id.insert(spec.id.clone(), resolved_nodes.len());
            resolved_nodes.push(Node::new(spec.id, spec.group, position));
        }

        let mut resolved_links = Vec::new();
        let mut degrees = vec![0usize; resolved_nodes.len()];
        for (link_index, spec) in links.into_iter().enumerate() {
            let resolve = |id: &str| {
                index_by_id
                    .get(id)
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownNode {
                        link: link_index,
                        id: id.to_owned(),
                    })
            };
            let source_index = resolve(&spec.source)?;
            let target_index = resolve(&spec.target)?;

            if !(spec.value.is_finite() && spec.value > 0.0) {
                return Err(ValidationError::InvalidLinkValue {
                    link: link_index,
                    value: spec.value,
                });
            }

            degrees[source_index] += 1;
            degrees[target_index] += 1;
            resolved_links.push(Link {
                source: spec.source,
                target: spec.target,
                value: spec.value,
                source_index,
                target_index,
            });
        }

        self.edges = resolved_links
            .iter()
            .map(|link| (link.source_index, link.target_index))
            .collect();
        self.nodes = resolved_nodes;
        self.index_by_id = index_by_id;
        self.links = resolved_links;
        self.degrees = degrees;
        self.width = width;
        self.height = height;
        self.cooling = CoolingSchedule::new(&self.config);

        tracing::debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            width,
            height,
            "simulation initialized"
        );
        Ok(())
    }

    /// Drops every node and link; later steps return empty ticks.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index_by_id.clear();
        self.links.clear();
        self.edges.clear();
        self.degrees.clear();
        self.cooling.alpha = 0.0;
        self.cooling.alpha_target = 0.0;
        self.step_count = 0;
    }

    pub fn step(&mut self) -> Tick {
        if self.nodes.is_empty() {
            return Tick::default();
        }

        let was_settled = self.cooling.is_settled();
        let alpha = self.cooling.advance();

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
        }

        let snapshot = ForceSnapshot {
            positions: &scratch.positions,
            velocities: &scratch.velocities,
            edges: &self.edges,
            degrees: &self.degrees,
        };
        let params = ForceParams {
            alpha,
            link_distance: self.config.link_distance,
            charge: self.config.charge,
            charge_distance_min: self.config.charge_distance_min,
            theta: self.config.theta,
            center: Point::new(self.width * 0.5, self.height * 0.5),
            centering_strength: self.config.centering_strength,
        };
        accumulate_forces(&snapshot, params, &mut scratch.forces);
        integrate(&mut self.nodes, &scratch.forces, self.config.velocity_damping);

        self.step_count += 1;
        if !was_settled && self.cooling.is_settled() {
            tracing::debug!(steps = self.step_count, alpha, "simulation settled");
        }

        self.snapshot()
    }

    /// Current positions without advancing the simulation.
    pub fn snapshot(&self) -> Tick {
        Tick {
            alpha: self.cooling.alpha,
            positions: self
                .nodes
                .iter()
                .map(|node| (node.id().to_owned(), node.position))
                .collect(),
        }
    }

    /// Sets the value `alpha` decays towards; `0.0` lets the layout cool.
    pub fn reheat(&mut self, alpha_target: f64) {
        if !alpha_target.is_finite() {
            return;
        }
        tracing::trace!(alpha_target, alpha = self.cooling.alpha, "reheat");
        self.cooling.alpha_target = alpha_target.max(0.0);
    }

    /// Restarts the schedule at the given `alpha`, e.g. `1.0` to re-run the layout.
    pub fn set_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.cooling.alpha = alpha.max(0.0);
        }
    }

    /// Fixes a node at `at` until [`release`](Self::release).
    ///
    /// Returns `false` and leaves the node untouched for unknown ids or a
    /// non-finite `at`.
    pub fn pin(&mut self, id: &str, at: Point) -> bool {
        if !at.is_finite() {
            return false;
        }
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.anchor = Anchor::Pinned(at);
        true
    }

    /// Lets a node move freely again, starting from its pinned position at rest.
    pub fn release(&mut self, id: &str) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if let Anchor::Pinned(at) = node.anchor {
            node.position = at;
            node.velocity = Point::ZERO;
        }
        node.anchor = Anchor::Free;
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = *self.index_by_id.get(id)?;
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    /// Closest node whose center lies within `radius` of `point`.
    pub fn node_at(&self, point: Point, radius: f64) -> Option<&Node> {
        let radius_sq = radius * radius;
        self.nodes
            .iter()
            .map(|node| (node, (node.position - point).length_sq()))
            .filter(|(_, distance_sq)| *distance_sq <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }

    pub fn alpha(&self) -> f64 {
        self.cooling.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.cooling.alpha_target
    }

    pub fn is_settled(&self) -> bool {
        self.cooling.is_settled()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Moves the centering target to the middle of a new canvas.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ValidationError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ValidationError::InvalidCanvas { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Swaps force and cooling parameters without touching node state.
    ///
    /// A changed `seed` reseeds placement for the next
    /// [`initialize`](Self::initialize). Invalid settings are refused and the
    /// current configuration stays in place.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ValidationError> {
        config.validate()?;
        if config.seed != self.config.seed {
            self.rng = placement_rng(config.seed);
        }
        self.cooling.alpha_decay = config.alpha_decay;
        self.cooling.alpha_min = config.alpha_min;
        self.config = config;
        Ok(())
    }

    /// Outline of the Barnes-Hut tree over the current positions.
    pub fn quadtree_cells(&self) -> Vec<QuadtreeCell> {
        let positions = self.nodes.iter().map(|node| node.position).collect::<Vec<_>>();
        Quadtree::build(&positions, self.config.charge)
            .map(|tree| tree.outline())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn pair() -> Simulation {
        Simulation::build(
            SimulationConfig::default().with_seed(7),
            [NodeSpec::new("AAPL", 1), NodeSpec::new("GOOGL", 1)],
            [LinkSpec::new("AAPL", "GOOGL", 4.0)],
            100.0,
            100.0,
        )
        .expect("valid dataset")
    }

    #[test]
    fn initialize_places_nodes_inside_canvas() {
        let simulation = pair();
        assert_eq!(simulation.alpha(), 1.0);
        for node in simulation.nodes() {
            assert!(node.position.is_finite());
            assert!((0.0..=100.0).contains(&node.position.x));
            assert!((0.0..=100.0).contains(&node.position.y));
        }
    }

    #[test]
    fn caller_positions_are_kept() {
        let simulation = Simulation::build(
            SimulationConfig::default().with_seed(1),
            [NodeSpec::new("a", 1).at(Point::new(-40.0, 300.0))],
            [],
            100.0,
            100.0,
        )
        .expect("valid dataset");
        assert_eq!(simulation.nodes()[0].position, Point::new(-40.0, 300.0));
    }

    #[test]
    fn same_seed_gives_same_placement() {
        let first = pair().snapshot();
        let second = pair().snapshot();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_link_endpoint_is_rejected() {
        let mut simulation = pair();
        let error = simulation
            .initialize(
                [NodeSpec::new("AAPL", 1), NodeSpec::new("GOOGL", 1)],
                [LinkSpec::new("AAPL", "MSFT", 1.0)],
                100.0,
                100.0,
            )
            .expect_err("MSFT is not a node");
        assert_eq!(
            error,
            ValidationError::UnknownNode {
                link: 0,
                id: "MSFT".to_owned()
            }
        );
        assert!(simulation.nodes().is_empty());
        assert!(simulation.links().is_empty());
        assert!(simulation.step().is_empty());
    }

    #[test]
    fn duplicate_ids_and_bad_values_are_rejected() {
        let mut simulation = Simulation::new(SimulationConfig::default().with_seed(3));
        assert_eq!(
            simulation.initialize(
                [NodeSpec::new("a", 1), NodeSpec::new("a", 2)],
                [],
                100.0,
                100.0
            ),
            Err(ValidationError::DuplicateNode("a".to_owned()))
        );
        assert!(matches!(
            simulation.initialize(
                [NodeSpec::new("a", 1), NodeSpec::new("b", 1)],
                [LinkSpec::new("a", "b", 0.0)],
                100.0,
                100.0
            ),
            Err(ValidationError::InvalidLinkValue { link: 0, .. })
        ));
        assert!(matches!(
            simulation.initialize([NodeSpec::new("a", 1)], [], 0.0, 100.0),
            Err(ValidationError::InvalidCanvas { .. })
        ));
        assert!(matches!(
            simulation.initialize(
                [NodeSpec::new("a", 1).at(Point::new(f64::NAN, 0.0))],
                [],
                100.0,
                100.0
            ),
            Err(ValidationError::NonFinitePosition(_))
        ));
    }

    #[test]
    fn degrees_count_both_link_ends() {
        let simulation = Simulation::build(
            SimulationConfig::default().with_seed(5),
            ["hub", "a", "b"].map(|id| NodeSpec::new(id, 1)),
            [LinkSpec::new("hub", "a", 1.0), LinkSpec::new("b", "hub", 1.0)],
            100.0,
            100.0,
        )
        .expect("valid dataset");
        assert_eq!(simulation.degrees(), &[2, 1, 1]);
        assert_eq!(simulation.links()[1].source_index(), 2);
        assert_eq!(simulation.links()[1].target_index(), 0);
    }

    #[test]
    fn pinned_node_holds_position_across_steps() {
        let mut simulation = pair();
        assert!(simulation.pin("AAPL", Point::new(20.0, 80.0)));
        for _ in 0..25 {
            let tick = simulation.step();
            assert_eq!(tick.position("AAPL"), Some(Point::new(20.0, 80.0)));
        }
    }

    #[test]
    fn release_resumes_from_pinned_position_at_rest() {
        let mut simulation = pair();
        simulation.step();
        simulation.pin("AAPL", Point::new(5.0, 5.0));
        assert!(simulation.release("AAPL"));

        let node = simulation.node("AAPL").expect("node exists");
        assert_eq!(node.position, Point::new(5.0, 5.0));
        assert_eq!(node.velocity, Point::ZERO);
        assert_eq!(node.anchor, Anchor::Free);
        assert!(!simulation.release("MSFT"));
    }

    #[test]
    fn non_finite_pin_is_refused() {
        let mut simulation = pair();
        let before = simulation.node("AAPL").expect("node exists").position;

        assert!(!simulation.pin("AAPL", Point::new(f64::NAN, 5.0)));
        assert!(!simulation.pin("AAPL", Point::new(0.0, f64::INFINITY)));
        assert_eq!(simulation.node("AAPL").expect("node exists").anchor, Anchor::Free);

        simulation.release("AAPL");
        assert_eq!(simulation.node("AAPL").expect("node exists").position, before);
        let tick = simulation.step();
        assert!(tick.positions.values().all(|position| position.is_finite()));
    }

    #[test]
    fn set_config_refuses_invalid_cooling_and_keeps_the_old_one() {
        let mut simulation = pair();
        let previous = *simulation.config();
        let broken = SimulationConfig {
            alpha_decay: f64::NAN,
            ..previous
        };

        assert!(matches!(
            simulation.set_config(broken),
            Err(ValidationError::InvalidSetting { field: "alpha_decay", .. })
        ));
        assert_eq!(*simulation.config(), previous);
        assert!(simulation.step().alpha.is_finite());
    }

    #[test]
    fn changed_seed_reseeds_the_next_placement() {
        let nodes = || [NodeSpec::new("AAPL", 1), NodeSpec::new("GOOGL", 1)];
        let mut reseeded = pair();
        reseeded
            .set_config(SimulationConfig::default().with_seed(99))
            .expect("valid config");
        reseeded
            .initialize(nodes(), [], 100.0, 100.0)
            .expect("valid dataset");

        let fresh = Simulation::build(
            SimulationConfig::default().with_seed(99),
            nodes(),
            [],
            100.0,
            100.0,
        )
        .expect("valid dataset");
        assert_eq!(reseeded.snapshot(), fresh.snapshot());
    }

    #[test]
    fn build_refuses_invalid_config() {
        let config = SimulationConfig {
            alpha_min: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(Simulation::build(config, [NodeSpec::new("a", 1)], [], 100.0, 100.0).is_err());
    }

    #[test]
    fn alpha_falls_monotonically_until_settled() {
        let mut simulation = pair();
        let mut previous = simulation.alpha();
        for _ in 0..400 {
            let tick = simulation.step();
            assert!(tick.alpha <= previous);
            previous = tick.alpha;
        }
        assert!(simulation.is_settled());
    }

    #[test]
    fn reheat_holds_alpha_near_target() {
        let mut simulation = pair();
        simulation.reheat(0.3);
        for _ in 0..1_000 {
            simulation.step();
        }
        assert_relative_eq!(simulation.alpha(), 0.3, epsilon = 1e-6);
        simulation.reheat(f64::NAN);
        assert_eq!(simulation.alpha_target(), 0.3);
    }

    #[test]
    fn positions_stay_finite_for_coincident_nodes() {
        let mut simulation = Simulation::build(
            SimulationConfig::default().with_seed(11),
            (0..6).map(|index| NodeSpec::new(index.to_string(), 1).at(Point::new(50.0, 50.0))),
            [LinkSpec::new("0", "1", 1.0)],
            100.0,
            100.0,
        )
        .expect("valid dataset");
        for _ in 0..50 {
            let tick = simulation.step();
            assert!(tick.positions.values().all(|position| position.is_finite()));
        }
        let spread = simulation.nodes()[0]
            .position
            .distance(simulation.nodes()[1].position);
        assert!(spread > 1.0);
    }

    #[test]
    fn node_at_picks_closest_within_radius() {
        let simulation = Simulation::build(
            SimulationConfig::default(),
            [
                NodeSpec::new("a", 1).at(Point::new(10.0, 10.0)),
                NodeSpec::new("b", 1).at(Point::new(14.0, 10.0)),
            ],
            [],
            100.0,
            100.0,
        )
        .expect("valid dataset");
        let hit = simulation.node_at(Point::new(13.0, 10.0), 5.0);
        assert_eq!(hit.map(Node::id), Some("b"));
        assert!(simulation.node_at(Point::new(60.0, 60.0), 5.0).is_none());
    }

    #[test]
    fn barnes_hut_layout_stays_finite() {
        let config = SimulationConfig {
            theta: 0.9,
            ..SimulationConfig::default().with_seed(21)
        };
        let nodes = (0..60).map(|index| NodeSpec::new(format!("n{index}"), index % 2));
        let links = (1..60).map(|index| LinkSpec::new("n0", format!("n{index}"), 1.0));
        let mut simulation =
            Simulation::build(config, nodes, links, 400.0, 400.0).expect("valid dataset");
        for _ in 0..100 {
            simulation.step();
        }
        assert!(simulation.nodes().iter().all(|node| node.position.is_finite()));
        assert!(!simulation.quadtree_cells().is_empty());
    }

    #[test]
    fn empty_simulation_steps_are_noops() {
        let mut simulation = Simulation::new(SimulationConfig::default());
        assert!(simulation.step().is_empty());
        assert_eq!(simulation.step_count(), 0);
        assert!(simulation.is_settled());
    }
}
