//! Barnes-Hut tree for the many-body force.
//!
//! Cells live in one arena and a split cell owns four consecutive child slots.
//! Each cell carries the summed charge of its nodes and their charge-weighted
//! centroid, so a far enough cell pushes like a single body.

use super::point::Point;

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Outline of one occupied cell, for drawing the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadtreeCell {
    pub center: Point,
    pub half_extent: f64,
    pub depth: usize,
    pub is_leaf: bool,
}

pub(super) struct Cell {
    pub(super) center: Point,
    pub(super) half_extent: f64,
    depth: usize,
    pub(super) population: usize,
    pub(super) charge: f64,
    moment: Point,
    pub(super) members: Vec<usize>,
    first_child: Option<usize>,
}

impl Cell {
    fn empty(center: Point, half_extent: f64, depth: usize) -> Self {
        Self {
            center,
            half_extent,
            depth,
            population: 0,
            charge: 0.0,
            moment: Point::ZERO,
            members: Vec::new(),
            first_child: None,
        }
    }

    fn absorb(&mut self, position: Point, charge: f64) {
        self.population += 1;
        self.charge += charge;
        self.moment += position * charge;
    }

    pub(super) fn centroid(&self) -> Point {
        if self.charge == 0.0 {
            self.center
        } else {
            self.moment / self.charge
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    pub(super) fn width(&self) -> f64 {
        self.half_extent * 2.0
    }

    pub(super) fn encloses(&self, point: Point) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn crowded(&self, positions: &[Point]) -> bool {
        if self.members.len() <= LEAF_CAPACITY || self.depth >= MAX_DEPTH {
            return false;
        }
        // Stacked nodes never separate, so splitting them only adds depth.
        let first = positions[self.members[0]];
        self.members
            .iter()
            .any(|&member| positions[member] != first)
    }
}

// Bit 0 is east of center, bit 1 is south of center.
fn quadrant_of(center: Point, point: Point) -> usize {
    usize::from(point.x >= center.x) | (usize::from(point.y >= center.y) << 1)
}

fn quadrant_offset(quadrant: usize, quarter: f64) -> Point {
    let dx = if quadrant & 1 == 0 { -quarter } else { quarter };
    let dy = if quadrant & 2 == 0 { -quarter } else { quarter };
    Point::new(dx, dy)
}

pub(super) struct Quadtree {
    cells: Vec<Cell>,
}

impl Quadtree {
    /// Inserts every position with the same `charge`. `None` when there is
    /// nothing to place or any position is not finite.
    pub(super) fn build(positions: &[Point], charge: f64) -> Option<Self> {
        let first = *positions.first()?;
        if positions.iter().any(|position| !position.is_finite()) {
            return None;
        }

        let (low, high) = positions.iter().fold((first, first), |(low, high), position| {
            (
                Point::new(low.x.min(position.x), low.y.min(position.y)),
                Point::new(high.x.max(position.x), high.y.max(position.y)),
            )
        });
        let extent = (high.x - low.x).max(high.y - low.y);

        let mut tree = Self {
            cells: vec![Cell::empty((low + high) * 0.5, extent * 0.5 + 1.0, 0)],
        };
        for (index, &position) in positions.iter().enumerate() {
            tree.insert(index, position, charge, positions);
        }
        Some(tree)
    }

    fn insert(&mut self, index: usize, position: Point, charge: f64, positions: &[Point]) {
        let mut slot = 0;
        loop {
            let cell = &mut self.cells[slot];
            cell.absorb(position, charge);
            match cell.first_child {
                Some(first) => slot = first + quadrant_of(cell.center, position),
                None => {
                    cell.members.push(index);
                    if cell.crowded(positions) {
                        self.split(slot, charge, positions);
                    }
                    return;
                }
            }
        }
    }

    fn split(&mut self, slot: usize, charge: f64, positions: &[Point]) {
        let first = self.cells.len();
        let parent = &mut self.cells[slot];
        let members = std::mem::take(&mut parent.members);
        let (center, quarter, depth) = (parent.center, parent.half_extent * 0.5, parent.depth);
        parent.first_child = Some(first);

        for quadrant in 0..4 {
            self.cells.push(Cell::empty(
                center + quadrant_offset(quadrant, quarter),
                quarter,
                depth + 1,
            ));
        }
        for member in members {
            let child = &mut self.cells[first + quadrant_of(center, positions[member])];
            child.absorb(positions[member], charge);
            child.members.push(member);
        }
        for child in first..first + 4 {
            if self.cells[child].crowded(positions) {
                self.split(child, charge, positions);
            }
        }
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub(super) fn children<'a>(&'a self, cell: &'a Cell) -> impl Iterator<Item = &'a Cell> + 'a {
        cell.first_child
            .into_iter()
            .flat_map(move |first| self.cells[first..first + 4].iter())
    }

    pub(super) fn outline(&self) -> Vec<QuadtreeCell> {
        self.cells
            .iter()
            .filter(|cell| cell.population > 0)
            .map(|cell| QuadtreeCell {
                center: cell.center,
                half_extent: cell.half_extent,
                depth: cell.depth,
                is_leaf: cell.is_leaf(),
            })
            .collect()
    }
}
