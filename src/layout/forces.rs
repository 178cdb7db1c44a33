//! Per-step force accumulation.
//!
//! Every function here reads a position snapshot and adds velocity deltas into
//! a caller-owned accumulator. Node state is never touched; the integrator
//! applies the accumulated deltas afterwards.

use std::f64::consts::TAU;

use super::point::Point;
use super::quadtree::{Cell, Quadtree};

const COINCIDENT_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
pub(super) struct ForceParams {
    pub(super) alpha: f64,
    pub(super) link_distance: f64,
    pub(super) charge: f64,
    pub(super) charge_distance_min: f64,
    pub(super) theta: f64,
    pub(super) center: Point,
    pub(super) centering_strength: f64,
}

pub(super) struct ForceSnapshot<'a> {
    pub(super) positions: &'a [Point],
    pub(super) velocities: &'a [Point],
    pub(super) edges: &'a [(usize, usize)],
    pub(super) degrees: &'a [usize],
}

pub(super) fn accumulate_forces(
    snapshot: &ForceSnapshot<'_>,
    params: ForceParams,
    forces: &mut Vec<Point>,
) {
    let node_count = snapshot.positions.len();
    forces.clear();
    forces.resize(node_count, Point::ZERO);
    if node_count == 0 {
        return;
    }

    accumulate_link_forces(snapshot, params, forces);
    if params.theta > 0.0 {
        accumulate_approximate_repulsion(snapshot, params, forces);
    } else {
        accumulate_repulsion(snapshot.positions, params, forces);
    }
    accumulate_centering(snapshot.positions, params, forces);
}

// Antisymmetric: swapping `from` and `to` flips the direction.
pub(super) fn tie_direction(from: usize, to: usize) -> Point {
    let (low, high, sign) = if from <= to {
        (from, to, 1.0)
    } else {
        (to, from, -1.0)
    };
    let angle = ((low as f64) * 0.618_034 + (high as f64) * 0.414_214 + 0.11) * TAU;
    Point::new(angle.cos(), angle.sin()) * sign
}

fn direction_and_distance(delta: Point, from: usize, to: usize) -> (Point, f64) {
    let distance = delta.length();
    if distance > COINCIDENT_EPSILON {
        (delta / distance, distance)
    } else {
        (tie_direction(from, to), 0.0)
    }
}

/// Springs every link towards `link_distance`, measured between positions
/// advanced by the current velocity.
pub(super) fn accumulate_link_forces(
    snapshot: &ForceSnapshot<'_>,
    params: ForceParams,
    forces: &mut [Point],
) {
    let node_count = snapshot.positions.len();
    for &(source, target) in snapshot.edges {
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let source_degree = snapshot.degrees[source].max(1) as f64;
        let target_degree = snapshot.degrees[target].max(1) as f64;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let predicted_source = snapshot.positions[source] + snapshot.velocities[source];
        let predicted_target = snapshot.positions[target] + snapshot.velocities[target];
        let (direction, distance) =
            direction_and_distance(predicted_target - predicted_source, source, target);

        let correction =
            direction * ((distance - params.link_distance) * params.alpha * strength);
        forces[target] -= correction * bias;
        forces[source] += correction * (1.0 - bias);
    }
}

fn repulsion_between(
    point: Point,
    other: Point,
    from: usize,
    to: usize,
    params: ForceParams,
) -> Point {
    let (direction, distance) = direction_and_distance(other - point, from, to);
    let distance = distance.max(params.charge_distance_min).max(COINCIDENT_EPSILON);
    direction * (params.charge * params.alpha / distance)
}

pub(super) fn accumulate_repulsion(positions: &[Point], params: ForceParams, forces: &mut [Point]) {
    for from in 0..positions.len() {
        for to in (from + 1)..positions.len() {
            let push = repulsion_between(positions[from], positions[to], from, to, params);
            forces[from] += push;
            forces[to] -= push;
        }
    }
}

pub(super) fn accumulate_approximate_repulsion(
    snapshot: &ForceSnapshot<'_>,
    params: ForceParams,
    forces: &mut [Point],
) {
    if params.charge == 0.0 {
        return;
    }
    let Some(tree) = Quadtree::build(snapshot.positions, params.charge) else {
        return;
    };

    for (index, force) in forces.iter_mut().enumerate() {
        *force += repulsion_from_cell(&tree, tree.root(), index, snapshot.positions, params);
    }
}

fn repulsion_from_cell(
    tree: &Quadtree,
    cell: &Cell,
    index: usize,
    positions: &[Point],
    params: ForceParams,
) -> Point {
    if cell.population == 0 {
        return Point::ZERO;
    }

    let point = positions[index];
    if cell.is_leaf() {
        return cell
            .members
            .iter()
            .filter(|&&member| member != index)
            .fold(Point::ZERO, |push, &member| {
                push + repulsion_between(point, positions[member], index, member, params)
            });
    }

    let offset = cell.centroid() - point;
    let distance = offset.length();
    let far_enough = cell.width() < params.theta * distance;
    if far_enough && distance > COINCIDENT_EPSILON && !cell.encloses(point) {
        let falloff = distance.max(params.charge_distance_min);
        return offset / distance * (cell.charge * params.alpha / falloff);
    }

    tree.children(cell).fold(Point::ZERO, |push, child| {
        push + repulsion_from_cell(tree, child, index, positions, params)
    })
}

pub(super) fn accumulate_centering(positions: &[Point], params: ForceParams, forces: &mut [Point]) {
    if positions.is_empty() || params.centering_strength == 0.0 {
        return;
    }

    let mut centroid = Point::ZERO;
    for &position in positions {
        centroid += position;
    }
    centroid = centroid / positions.len() as f64;

    let pull = (params.center - centroid) * params.centering_strength;
    for force in forces.iter_mut() {
        *force += pull;
    }
}
