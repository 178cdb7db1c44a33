//! Force-directed layout engine.
//!
//! A [`Simulation`] owns nodes and links and advances them one [`Tick`] per
//! [`Simulation::step`]. Each step evaluates the force model (link springs,
//! many-body repulsion and a centering pull) on a snapshot of the current
//! positions, then integrates the result under a cooling schedule `alpha` that
//! decays towards `alpha_target`. A [`DragController`] pins nodes under the
//! pointer and reheats the schedule while they are held.

mod config;
mod drag;
mod error;
mod forces;
mod integrator;
mod model;
mod point;
mod quadtree;
mod simulation;

pub use config::{DEFAULT_ALPHA_MIN, SimulationConfig};
pub use drag::{DragConfig, DragController, DragState};
pub use error::ValidationError;
pub use model::{Anchor, Link, LinkSpec, Node, NodeSpec};
pub use point::Point;
pub use quadtree::QuadtreeCell;
pub use simulation::{Simulation, Tick};
