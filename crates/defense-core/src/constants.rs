/// Largest valid lattice dimension (cells per side). Keeps the cell array and
/// the per-tick activation pass bounded.
pub const MAX_GRID_SIZE: usize = 4096;

/// Maximum number of herbivores in one world.
pub const MAX_HERBIVORES: usize = 100_000;

/// Largest base attack cooldown. Keeps the `[base, 2*base)` resample range
/// representable in the cooldown counter.
pub const MAX_BITE_COOLDOWN_TICKS: u32 = u32::MAX / 2;

/// Margin subtracted from the lattice extent when clamping herbivore
/// positions, so a clamped coordinate always floors to an in-bounds cell.
pub const POSITION_MARGIN: f64 = 1e-9;
