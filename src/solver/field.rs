use crate::complex::{dist_squared, C};
use crate::coord::Viewport;
use crate::poly::Polynomial;
use crate::solver::Solver;
use crate::threads::Split;

/// One grid cell: the current iterate and the index of its nearest root,
/// `-1` until classification has run.
#[derive(Clone, Debug)]
pub struct FieldCell {
    pub(crate) z: C<f64>,
    pub(crate) i: i16,
}

impl FieldCell {
    pub fn value(&self) -> C<f64> {
        self.z
    }

    pub fn index(&self) -> i16 {
        self.i
    }
}

/// Row-major grid of cells seeded from a viewport.
#[derive(Clone, Debug)]
pub struct FieldState {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) cells: Vec<FieldCell>,
}

impl From<&Viewport> for FieldState {
    fn from(v: &Viewport) -> Self {
        let cells = v
            .generate_complex_coordinates()
            .into_iter()
            .map(|z| FieldCell { z, i: -1 })
            .collect();
        Self {
            width: v.width,
            height: v.height,
            cells,
        }
    }
}

impl FieldState {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> &FieldCell {
        &self.cells[y * self.width + x]
    }

    pub fn into_indices(self) -> Vec<i16> {
        self.cells.into_iter().map(|cell| cell.i).collect()
    }
}

impl Split for FieldState {
    fn split_parts(&self, n: usize) -> Vec<Self> {
        let rows = self.cells.split_parts(self.height);
        let row_groups = rows.split_parts(n);

        let mut parts = vec![];
        for row_group in row_groups {
            let height = row_group.len();
            let cells = row_group.into_iter().flatten().collect();
            parts.push(Self {
                width: self.width,
                height,
                cells,
            })
        }
        parts
    }

    fn join_parts(&self, parts: &[Self]) -> Self {
        let mut height = self.height;
        let mut cells = self.cells.clone();
        for part in parts {
            assert!(part.width == self.width, "different width");
            height += part.height;
            cells.extend_from_slice(&part.cells);
        }
        Self {
            width: self.width,
            height,
            cells,
        }
    }
}

/// Advances every cell through a fixed number of Newton cycles, then
/// classifies each by its nearest root.
#[derive(Clone, Debug)]
pub struct FieldSolver {
    poly: Polynomial,
    deri: Polynomial,
    roots: Vec<C<f64>>,
    cycles: usize,
}

impl FieldSolver {
    pub fn new(poly: Polynomial, roots: Vec<C<f64>>, cycles: usize) -> Self {
        let deri = poly.derivative();
        Self {
            poly,
            deri,
            roots,
            cycles,
        }
    }

    /// One Newton step; a cell whose derivative is epsilon-zero holds its
    /// value for the cycle.
    fn step(&self, cell: &mut FieldCell) {
        let pz = self.poly.apply(cell.z);
        let dpz = self.deri.apply(cell.z);
        if !dpz.is_zero() {
            cell.z = cell.z - pz / dpz;
        }
    }

    /// Strict-less argmin over the root set; ties keep the lowest index.
    fn classify(&self, cell: &mut FieldCell) {
        let mut closest = 0;
        for i in 1..self.roots.len() {
            if dist_squared(cell.z, self.roots[i]) < dist_squared(cell.z, self.roots[closest]) {
                closest = i;
            }
        }
        cell.i = closest as i16;
    }
}

impl Solver<FieldState> for FieldSolver {
    fn solve(&self, state: &FieldState) -> FieldState {
        let mut state = state.clone();
        for _ in 0..self.cycles {
            for cell in &mut state.cells {
                self.step(cell);
            }
        }
        for cell in &mut state.cells {
            self.classify(cell);
        }
        state
    }
}
