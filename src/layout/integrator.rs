use super::config::SimulationConfig;
use super::model::{Anchor, Node};
use super::point::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct CoolingSchedule {
    pub(super) alpha: f64,
    pub(super) alpha_target: f64,
    pub(super) alpha_decay: f64,
    pub(super) alpha_min: f64,
}

impl CoolingSchedule {
    pub(super) fn new(config: &SimulationConfig) -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: config.alpha_decay,
            alpha_min: config.alpha_min,
        }
    }

    pub(super) fn advance(&mut self) -> f64 {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.alpha
    }

    pub(super) fn is_settled(&self) -> bool {
        self.alpha < self.alpha_min
    }
}

pub(super) fn integrate(nodes: &mut [Node], forces: &[Point], velocity_damping: f64) {
    for (node, &force) in nodes.iter_mut().zip(forces) {
        match node.anchor {
            Anchor::Pinned(at) => {
                node.position = at;
                node.velocity = Point::ZERO;
            }
            Anchor::Free => {
                node.velocity = (node.velocity + force) * velocity_damping;
                node.position += node.velocity;
            }
        }
    }
}
