//! Force-directed layout for correlation graphs.
//!
//! [`layout`] holds the simulation engine and the drag controller, [`dataset`]
//! reads the node and link lists the engine is initialised from.

pub mod dataset;
pub mod layout;

pub use layout::{
    Anchor, DragConfig, DragController, DragState, LinkSpec, NodeSpec, Point, Simulation,
    SimulationConfig, Tick, ValidationError,
};
