use serde::{Deserialize, Serialize};

use super::point::Point;
use super::simulation::Simulation;

/// Cooling parameters applied while a node is held.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// `alpha_target` held while dragging.
    pub reheat_target: f64,
    /// Below this `alpha` the simulation counts as cooled and is reheated on grab.
    pub active_threshold: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            reheat_target: 0.3,
            active_threshold: 0.3,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(String),
}

/// Turns pointer gestures into pins on a [`Simulation`].
///
/// The controller holds only the dragged node id. Every event re-checks that
/// the node still exists, so a dataset swap mid-drag drops back to
/// [`DragState::Idle`] on the next event.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    config: DragConfig,
    state: DragState,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn dragged(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging(id) => Some(id),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Grabs `id`, pinning it where it currently is. Returns `false` if the node is unknown.
    pub fn pointer_down(&mut self, simulation: &mut Simulation, id: &str) -> bool {
        if self.is_dragging() {
            self.pointer_up(simulation);
        }

        let Some(position) = simulation.node(id).map(|node| node.position) else {
            return false;
        };

        simulation.pin(id, position);
        if simulation.alpha() < self.config.active_threshold {
            simulation.reheat(self.config.reheat_target);
        }
        tracing::debug!(node = id, x = position.x, y = position.y, "drag started");
        self.state = DragState::Dragging(id.to_owned());
        true
    }

    /// Moves the held node to `to`, in simulation coordinates. Non-finite
    /// coordinates are ignored and the drag continues.
    pub fn pointer_move(&mut self, simulation: &mut Simulation, to: Point) {
        let DragState::Dragging(id) = &self.state else {
            return;
        };
        if !to.is_finite() {
            tracing::trace!(node = %id, "ignoring non-finite pointer position");
            return;
        }

        if !simulation.pin(id, to) {
            tracing::debug!(node = %id, "dragged node vanished; drag dropped");
            self.state = DragState::Idle;
            return;
        }

        // A drag that began on a hot layout re-arms once the layout cools.
        if simulation.alpha() < self.config.active_threshold
            && simulation.alpha_target() < self.config.reheat_target
        {
            simulation.reheat(self.config.reheat_target);
        }
    }

    /// Lets go of the held node; it rejoins the simulation at rest where it was dropped.
    pub fn pointer_up(&mut self, simulation: &mut Simulation) {
        let DragState::Dragging(id) = std::mem::take(&mut self.state) else {
            return;
        };

        if simulation.contains(&id) {
            simulation.reheat(0.0);
            simulation.release(&id);
            tracing::debug!(node = %id, "drag ended");
        }
    }

    /// Abandons a drag without waiting for pointer-up, e.g. when the pointer leaves the surface.
    pub fn cancel(&mut self, simulation: &mut Simulation) {
        self.pointer_up(simulation);
    }
}
