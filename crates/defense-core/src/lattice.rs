use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Binary cell state: `Undefended` maps to spin −1, `Defended` to +1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spin {
    #[default]
    Undefended,
    Defended,
}

impl Spin {
    /// Signed spin value used by the energy model.
    pub fn sign(self) -> i32 {
        match self {
            Spin::Undefended => -1,
            Spin::Defended => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Spin::Undefended => Spin::Defended,
            Spin::Defended => Spin::Undefended,
        }
    }
}

/// One lattice site.
///
/// Invariant: `activation_ticks == 0` whenever `spin == Undefended`; every
/// spin transition resets the counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub spin: Spin,
    /// Consecutive ticks this cell has spent defended.
    pub activation_ticks: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

impl GridCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    OutOfBounds { coord: GridCoord, size: usize },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeError::OutOfBounds { coord, size } => {
                write!(f, "coordinate {coord} outside {size}x{size} lattice")
            }
        }
    }
}

impl Error for LatticeError {}

/// Square grid of defense cells with an open boundary: edge and corner sites
/// simply have fewer neighbors, there is no wraparound.
#[derive(Clone, Debug)]
pub struct Lattice {
    size: usize,
    cells: Vec<Cell>,
}

impl Lattice {
    /// Create an all-undefended lattice. `size` must already be validated by
    /// the config layer.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::default(); size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major view of all cells, for rendering snapshots.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable cell access for the world's tick phases. Callers must uphold
    /// the activation-counter invariant themselves.
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    fn index(&self, coord: GridCoord) -> Result<usize, LatticeError> {
        if coord.row < self.size && coord.col < self.size {
            Ok(coord.row * self.size + coord.col)
        } else {
            Err(LatticeError::OutOfBounds {
                coord,
                size: self.size,
            })
        }
    }

    pub fn cell_at(&self, coord: GridCoord) -> Result<Cell, LatticeError> {
        Ok(self.cells[self.index(coord)?])
    }

    pub fn spin_at(&self, coord: GridCoord) -> Result<Spin, LatticeError> {
        Ok(self.cells[self.index(coord)?].spin)
    }

    /// Set a cell's spin. Any write resets the activation counter, which
    /// keeps the counter invariant without the caller having to remember it.
    pub fn set_spin(&mut self, coord: GridCoord, spin: Spin) -> Result<(), LatticeError> {
        let idx = self.index(coord)?;
        self.cells[idx] = Cell {
            spin,
            activation_ticks: 0,
        };
        Ok(())
    }

    pub fn activation_at(&self, coord: GridCoord) -> Result<u32, LatticeError> {
        Ok(self.cells[self.index(coord)?].activation_ticks)
    }

    pub fn set_activation(&mut self, coord: GridCoord, ticks: u32) -> Result<(), LatticeError> {
        let idx = self.index(coord)?;
        self.cells[idx].activation_ticks = ticks;
        Ok(())
    }

    /// Whether `coord` names a cell inside the lattice.
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    /// Sum of the signed spins of the up-to-four orthogonal neighbors that
    /// lie inside the lattice (von Neumann neighborhood, open boundary).
    pub fn neighbor_sum(&self, coord: GridCoord) -> Result<i32, LatticeError> {
        self.index(coord)?;
        let mut sum = 0;
        if coord.row > 0 {
            sum += self.cells[(coord.row - 1) * self.size + coord.col].spin.sign();
        }
        if coord.row + 1 < self.size {
            sum += self.cells[(coord.row + 1) * self.size + coord.col].spin.sign();
        }
        if coord.col > 0 {
            sum += self.cells[coord.row * self.size + coord.col - 1].spin.sign();
        }
        if coord.col + 1 < self.size {
            sum += self.cells[coord.row * self.size + coord.col + 1].spin.sign();
        }
        Ok(sum)
    }

    /// Energy change of flipping the spin at `coord` under the Ising
    /// Hamiltonian H = −J·Σ sᵢ·sⱼ over adjacent pairs:
    /// ΔE = 2·J·sᵢ·neighbor_sum(i). Positive ΔE means the flip is
    /// energetically unfavorable.
    pub fn energy_delta(&self, coord: GridCoord, coupling: f64) -> Result<f64, LatticeError> {
        let spin = self.spin_at(coord)?;
        let neighbors = self.neighbor_sum(coord)?;
        Ok(2.0 * coupling * f64::from(spin.sign()) * f64::from(neighbors))
    }

    /// Total lattice energy −J·Σ sᵢ·sⱼ over unique vertical and horizontal
    /// adjacent pairs. Diagnostic quantity surfaced in the step metrics.
    pub fn total_energy(&self, coupling: f64) -> f64 {
        let mut pair_sum = 0i64;
        for row in 0..self.size {
            for col in 0..self.size {
                let spin = self.cells[row * self.size + col].spin.sign() as i64;
                if row + 1 < self.size {
                    pair_sum += spin * self.cells[(row + 1) * self.size + col].spin.sign() as i64;
                }
                if col + 1 < self.size {
                    pair_sum += spin * self.cells[row * self.size + col + 1].spin.sign() as i64;
                }
            }
        }
        -coupling * pair_sum as f64
    }

    pub fn defended_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.spin == Spin::Defended)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(row: usize, col: usize) -> GridCoord {
        GridCoord::new(row, col)
    }

    #[test]
    fn new_lattice_starts_undefended() {
        let lattice = Lattice::new(4);
        assert_eq!(lattice.defended_count(), 0);
        for cell in lattice.cells() {
            assert_eq!(cell.spin, Spin::Undefended);
            assert_eq!(cell.activation_ticks, 0);
        }
    }

    #[test]
    fn out_of_bounds_access_is_an_error() {
        let mut lattice = Lattice::new(3);
        assert!(matches!(
            lattice.spin_at(coord(3, 0)),
            Err(LatticeError::OutOfBounds { .. })
        ));
        assert!(matches!(
            lattice.set_spin(coord(0, 3), Spin::Defended),
            Err(LatticeError::OutOfBounds { .. })
        ));
        assert!(matches!(
            lattice.neighbor_sum(coord(5, 5)),
            Err(LatticeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn set_spin_resets_activation_counter() {
        let mut lattice = Lattice::new(3);
        lattice.set_spin(coord(1, 1), Spin::Defended).unwrap();
        lattice.set_activation(coord(1, 1), 7).unwrap();
        lattice.set_spin(coord(1, 1), Spin::Undefended).unwrap();
        assert_eq!(lattice.activation_at(coord(1, 1)).unwrap(), 0);
    }

    #[test]
    fn neighbor_sum_counts_only_in_bounds_neighbors() {
        // All undefended: each neighbor contributes −1.
        let lattice = Lattice::new(3);
        assert_eq!(lattice.neighbor_sum(coord(1, 1)).unwrap(), -4);
        assert_eq!(lattice.neighbor_sum(coord(0, 1)).unwrap(), -3);
        assert_eq!(lattice.neighbor_sum(coord(0, 0)).unwrap(), -2);
    }

    #[test]
    fn neighbor_sum_ignores_diagonals() {
        let mut lattice = Lattice::new(3);
        lattice.set_spin(coord(0, 0), Spin::Defended).unwrap();
        lattice.set_spin(coord(0, 2), Spin::Defended).unwrap();
        lattice.set_spin(coord(2, 0), Spin::Defended).unwrap();
        lattice.set_spin(coord(2, 2), Spin::Defended).unwrap();
        // Diagonal corners must not affect the center cell.
        assert_eq!(lattice.neighbor_sum(coord(1, 1)).unwrap(), -4);
    }

    #[test]
    fn energy_delta_matches_closed_form() {
        let mut lattice = Lattice::new(3);
        lattice.set_spin(coord(0, 1), Spin::Defended).unwrap();
        lattice.set_spin(coord(1, 0), Spin::Defended).unwrap();
        // Center: spin −1, neighbors +1 +1 −1 −1 = 0.
        assert_eq!(lattice.energy_delta(coord(1, 1), 1.0).unwrap(), 0.0);
        // (0,0): spin −1, neighbors (0,1)=+1, (1,0)=+1 → sum 2, ΔE = 2·J·(−1)·2.
        assert_eq!(lattice.energy_delta(coord(0, 0), 1.0).unwrap(), -4.0);
        assert_eq!(lattice.energy_delta(coord(0, 0), 2.5).unwrap(), -10.0);
    }

    #[test]
    fn energy_delta_sign_convention() {
        // A defended cell among defended neighbors: flipping it away is
        // unfavorable, so ΔE must be positive.
        let mut lattice = Lattice::new(3);
        for row in 0..3 {
            for col in 0..3 {
                lattice.set_spin(coord(row, col), Spin::Defended).unwrap();
            }
        }
        assert_eq!(lattice.energy_delta(coord(1, 1), 1.0).unwrap(), 8.0);
    }

    #[test]
    fn total_energy_tracks_flip_delta() {
        let mut lattice = Lattice::new(4);
        lattice.set_spin(coord(1, 2), Spin::Defended).unwrap();
        lattice.set_spin(coord(2, 1), Spin::Defended).unwrap();
        let coupling = 1.5;
        let target = coord(2, 2);
        let before = lattice.total_energy(coupling);
        let delta = lattice.energy_delta(target, coupling).unwrap();
        let flipped = lattice.spin_at(target).unwrap().flipped();
        lattice.set_spin(target, flipped).unwrap();
        let after = lattice.total_energy(coupling);
        assert!((after - before - delta).abs() < 1e-12);
    }

    #[test]
    fn single_cell_lattice_has_no_neighbors() {
        let lattice = Lattice::new(1);
        assert_eq!(lattice.neighbor_sum(coord(0, 0)).unwrap(), 0);
        assert_eq!(lattice.energy_delta(coord(0, 0), 1.0).unwrap(), 0.0);
    }
}
