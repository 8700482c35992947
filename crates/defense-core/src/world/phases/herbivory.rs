use super::super::World;
use crate::constants::POSITION_MARGIN;
use crate::lattice::{GridCoord, Spin};
use rand::Rng;

impl World {
    /// One full pass over the herbivores: random turn, repulsion away from
    /// defended or out-of-bounds cells, dt-scaled displacement with clamping,
    /// speed renormalization, then the cooldown-gated bite attempt. Dead
    /// herbivores are skipped entirely.
    pub(in crate::world) fn step_herbivory_phase(&mut self, dt: f64) {
        for idx in 0..self.herbivores.len() {
            if !self.herbivores[idx].alive {
                continue;
            }
            self.move_herbivore(idx, dt);
            self.attack_with_herbivore(idx);
        }
    }

    fn move_herbivore(&mut self, idx: usize, dt: f64) {
        let extent = self.lattice.size() as f64;
        let turn = self.config.turn_factor_degrees;

        // 1. Random heading change, uniform in [-turn, +turn] degrees.
        if turn > 0.0 {
            let angle = self.rng.random_range(-turn..=turn).to_radians();
            let (sin, cos) = angle.sin_cos();
            let [vx, vy] = self.herbivores[idx].velocity;
            self.herbivores[idx].velocity = [vx * cos - vy * sin, vx * sin + vy * cos];
        }

        // 2. Repulsion from the 3x3 cell neighborhood: every neighbor that is
        // out of bounds or defended pushes the herbivore away from its
        // relative offset, scaled by push_factor and the current speed.
        let here = self.herbivores[idx].cell(self.lattice.size());
        let heading = self.herbivores[idx].velocity;
        let magnitude = self.herbivores[idx].speed();
        let push = self.config.push_factor * magnitude;
        let mut repulsion = [0.0f64; 2];
        for d_row in -1i64..=1 {
            for d_col in -1i64..=1 {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let row = here.row as i64 + d_row;
                let col = here.col as i64 + d_col;
                let blocked = if row < 0 || col < 0 {
                    true
                } else {
                    let coord = GridCoord::new(row as usize, col as usize);
                    !self.lattice.contains(coord)
                        || self.lattice.spin_at(coord).expect("coord checked in bounds")
                            == Spin::Defended
                };
                if blocked {
                    repulsion[0] -= d_col as f64 * push;
                    repulsion[1] -= d_row as f64 * push;
                }
            }
        }
        self.herbivores[idx].velocity[0] += repulsion[0];
        self.herbivores[idx].velocity[1] += repulsion[1];

        // 3-4. Displace and clamp into the lattice box. Clamping is the
        // boundary rule; there is no bounce-angle computation.
        let limit = extent - POSITION_MARGIN;
        let [vx, vy] = self.herbivores[idx].velocity;
        let [x, y] = self.herbivores[idx].position;
        self.herbivores[idx].position = [
            (x + vx * dt).clamp(0.0, limit),
            (y + vy * dt).clamp(0.0, limit),
        ];

        // 5. Turning and repulsion steer direction only; net speed is fixed.
        // Repulsion can cancel the heading exactly; fall back to the
        // post-turn direction so a live herbivore never freezes.
        let speed_sq = vx * vx + vy * vy;
        if speed_sq > 0.0 {
            let scale = self.config.herbivore_speed / speed_sq.sqrt();
            self.herbivores[idx].velocity = [vx * scale, vy * scale];
        } else if magnitude > 0.0 {
            let scale = self.config.herbivore_speed / magnitude;
            self.herbivores[idx].velocity = [heading[0] * scale, heading[1] * scale];
        }
    }

    fn attack_with_herbivore(&mut self, idx: usize) {
        // Decrement first, then gate: a counter that reaches 0 this tick
        // bites this tick, so inter-bite intervals stay in [base, 2*base).
        if self.herbivores[idx].attack_cooldown > 0 {
            self.herbivores[idx].attack_cooldown -= 1;
            if self.herbivores[idx].attack_cooldown > 0 {
                return;
            }
        }

        let coord = self.herbivores[idx].cell(self.lattice.size());
        let spin = self
            .lattice
            .spin_at(coord)
            .expect("clamped position maps to an in-bounds cell");
        match spin {
            // Bite deterred: the herbivore dies in place; the cell keeps its
            // defense and its activation counter.
            Spin::Defended => {
                self.herbivores[idx].velocity = [0.0, 0.0];
                self.herbivores[idx].alive = false;
                self.counters.deterred_bites += 1;
            }
            // Bite lands and triggers defense activation on the cell.
            Spin::Undefended => {
                self.lattice
                    .set_spin(coord, Spin::Defended)
                    .expect("clamped position maps to an in-bounds cell");
                self.counters.activation_events += 1;
                self.counters.undefended_bites += 1;
                let base = self.config.bite_cooldown_ticks;
                self.herbivores[idx].attack_cooldown = self.rng.random_range(base..2 * base);
            }
        }
    }
}
