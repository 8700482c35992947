use crate::lattice::GridCoord;

/// Mobile forager. Position is continuous in the lattice box
/// `[0, size] × [0, size]`, one world unit per cell; `position[0]` is x
/// (column axis), `position[1]` is y (row axis).
#[derive(Clone, Debug, PartialEq)]
pub struct Herbivore {
    pub position: [f64; 2],
    pub velocity: [f64; 2],
    /// Ticks until the next bite attempt.
    pub attack_cooldown: u32,
    /// Cleared when a bite is deterred by a defended cell. Dead herbivores
    /// are skipped by every later phase but never removed.
    pub alive: bool,
}

impl Herbivore {
    pub fn new(position: [f64; 2], velocity: [f64; 2], attack_cooldown: u32) -> Self {
        Self {
            position,
            velocity,
            attack_cooldown,
            alive: true,
        }
    }

    /// Lattice cell under the herbivore's current position. The movement
    /// phase clamps positions into the box, so the floor always names an
    /// in-bounds cell for any `size >= 1`.
    pub fn cell(&self, size: usize) -> GridCoord {
        let clamp_index = |v: f64| (v.max(0.0) as usize).min(size - 1);
        GridCoord {
            row: clamp_index(self.position[1]),
            col: clamp_index(self.position[0]),
        }
    }

    pub fn speed(&self) -> f64 {
        (self.velocity[0] * self.velocity[0] + self.velocity[1] * self.velocity[1]).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_maps_position_to_row_col() {
        let h = Herbivore::new([3.7, 1.2], [1.0, 0.0], 0);
        assert_eq!(h.cell(5), GridCoord::new(1, 3));
    }

    #[test]
    fn cell_clamps_boundary_positions() {
        // Exactly on the far edge still maps to the last cell.
        let h = Herbivore::new([5.0, 5.0], [0.0, 0.0], 0);
        assert_eq!(h.cell(5), GridCoord::new(4, 4));
        let h = Herbivore::new([-0.5, 0.0], [0.0, 0.0], 0);
        assert_eq!(h.cell(5), GridCoord::new(0, 0));
    }

    #[test]
    fn speed_is_velocity_magnitude() {
        let h = Herbivore::new([0.0, 0.0], [3.0, 4.0], 0);
        assert!((h.speed() - 5.0).abs() < 1e-12);
    }
}
