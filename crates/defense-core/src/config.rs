use crate::constants::{MAX_BITE_COOLDOWN_TICKS, MAX_GRID_SIZE, MAX_HERBIVORES};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// Cells per side of the square lattice. Must be positive.
    pub grid_size: usize,
    /// Coupling constant J: strength of neighbor interaction in the energy
    /// model (cooperative defense signaling).
    pub coupling: f64,
    /// Responsiveness T: acceptance-probability scale for the sampler.
    /// Larger T accepts energetically unfavorable flips more freely. Must be
    /// positive; this is also the initial thermostat value.
    pub temperature: f64,
    /// Number of herbivore foragers placed at construction.
    pub herbivore_count: usize,
    /// Fixed herbivore speed in cells per model second. Velocity is
    /// renormalized to this magnitude after every movement step.
    pub herbivore_speed: f64,
    /// Scale applied to repulsion away from defended or out-of-bounds cells.
    pub push_factor: f64,
    /// Maximum random heading change per tick, in degrees.
    pub turn_factor_degrees: f64,
    /// Consecutive ticks a cell may stay defended before forced reset.
    pub max_activation_ticks: u32,
    /// Base attack cooldown; after an undefended bite the cooldown is
    /// resampled uniformly in `[bite_cooldown_ticks, 2 * bite_cooldown_ticks)`.
    pub bite_cooldown_ticks: u32,
    /// Start from random spins instead of an all-undefended lattice.
    pub mixed_start: bool,
    /// Ablation toggle for the stochastic sampler phase.
    pub enable_sampler: bool,
    /// Ablation toggle for the herbivore movement/predation phase.
    pub enable_herbivory: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid_size: 20,
            coupling: 1.0,
            temperature: 3.0,
            herbivore_count: 5,
            herbivore_speed: 2.0,
            push_factor: 0.5,
            turn_factor_degrees: 15.0,
            max_activation_ticks: 100,
            bite_cooldown_ticks: 20,
            mixed_start: false,
            enable_sampler: true,
            enable_herbivory: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    InvalidGridSize,
    GridSizeTooLarge { max: usize, actual: usize },
    InvalidCoupling,
    InvalidTemperature,
    TooManyHerbivores { max: usize, actual: usize },
    InvalidHerbivoreSpeed,
    InvalidPushFactor,
    InvalidTurnFactor,
    InvalidMaxActivationTicks,
    InvalidBiteCooldownTicks,
    BiteCooldownTooLarge { max: u32, actual: u32 },
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::InvalidGridSize => write!(f, "grid_size must be greater than 0"),
            SimConfigError::GridSizeTooLarge { max, actual } => {
                write!(f, "grid_size ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidCoupling => write!(f, "coupling must be finite"),
            SimConfigError::InvalidTemperature => {
                write!(f, "temperature must be positive and finite")
            }
            SimConfigError::TooManyHerbivores { max, actual } => {
                write!(f, "herbivore_count ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InvalidHerbivoreSpeed => {
                write!(f, "herbivore_speed must be non-negative and finite")
            }
            SimConfigError::InvalidPushFactor => {
                write!(f, "push_factor must be non-negative and finite")
            }
            SimConfigError::InvalidTurnFactor => {
                write!(f, "turn_factor_degrees must be non-negative and finite")
            }
            SimConfigError::InvalidMaxActivationTicks => {
                write!(f, "max_activation_ticks must be greater than 0")
            }
            SimConfigError::InvalidBiteCooldownTicks => {
                write!(f, "bite_cooldown_ticks must be greater than 0")
            }
            SimConfigError::BiteCooldownTooLarge { max, actual } => {
                write!(
                    f,
                    "bite_cooldown_ticks ({actual}) exceeds supported maximum ({max})"
                )
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_lattice()?;
        self.validate_sampler()?;
        self.validate_herbivores()?;
        Ok(())
    }

    fn validate_lattice(&self) -> Result<(), SimConfigError> {
        if self.grid_size == 0 {
            return Err(SimConfigError::InvalidGridSize);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(SimConfigError::GridSizeTooLarge {
                max: MAX_GRID_SIZE,
                actual: self.grid_size,
            });
        }
        if self.max_activation_ticks == 0 {
            return Err(SimConfigError::InvalidMaxActivationTicks);
        }
        Ok(())
    }

    fn validate_sampler(&self) -> Result<(), SimConfigError> {
        if !self.coupling.is_finite() {
            return Err(SimConfigError::InvalidCoupling);
        }
        Self::validate_temperature(self.temperature)
    }

    /// Shared between construction and the runtime thermostat mutation.
    pub(crate) fn validate_temperature(temperature: f64) -> Result<(), SimConfigError> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SimConfigError::InvalidTemperature);
        }
        Ok(())
    }

    fn validate_herbivores(&self) -> Result<(), SimConfigError> {
        if self.herbivore_count > MAX_HERBIVORES {
            return Err(SimConfigError::TooManyHerbivores {
                max: MAX_HERBIVORES,
                actual: self.herbivore_count,
            });
        }
        if !(self.herbivore_speed.is_finite() && self.herbivore_speed >= 0.0) {
            return Err(SimConfigError::InvalidHerbivoreSpeed);
        }
        if !(self.push_factor.is_finite() && self.push_factor >= 0.0) {
            return Err(SimConfigError::InvalidPushFactor);
        }
        if !(self.turn_factor_degrees.is_finite() && self.turn_factor_degrees >= 0.0) {
            return Err(SimConfigError::InvalidTurnFactor);
        }
        if self.bite_cooldown_ticks == 0 {
            return Err(SimConfigError::InvalidBiteCooldownTicks);
        }
        if self.bite_cooldown_ticks > MAX_BITE_COOLDOWN_TICKS {
            return Err(SimConfigError::BiteCooldownTooLarge {
                max: MAX_BITE_COOLDOWN_TICKS,
                actual: self.bite_cooldown_ticks,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_grid_size() {
        let config = SimConfig {
            grid_size: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidGridSize));

        let config = SimConfig {
            grid_size: MAX_GRID_SIZE + 1,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimConfigError::GridSizeTooLarge { .. })
        ));
    }

    #[test]
    fn validate_rejects_non_positive_temperature() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = SimConfig {
                temperature: bad,
                ..SimConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(SimConfigError::InvalidTemperature),
                "temperature {bad} should be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_invalid_herbivore_params() {
        let config = SimConfig {
            herbivore_speed: -1.0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidHerbivoreSpeed));

        let config = SimConfig {
            push_factor: f64::NAN,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidPushFactor));

        let config = SimConfig {
            bite_cooldown_ticks: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::InvalidBiteCooldownTicks)
        );
    }

    #[test]
    fn validate_rejects_zero_max_activation() {
        let config = SimConfig {
            max_activation_ticks: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::InvalidMaxActivationTicks)
        );
    }

    #[test]
    fn legacy_config_json_deserializes_with_defaults() {
        let legacy_json = r#"{
            "seed": 7,
            "grid_size": 5,
            "temperature": 3.0
        }"#;
        let cfg: SimConfig = serde_json::from_str(legacy_json).expect("partial config should parse");
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.grid_size, 5);
        assert_eq!(cfg.bite_cooldown_ticks, 20);
        assert!(cfg.enable_sampler);
        assert!(cfg.enable_herbivory);
        assert!(!cfg.mixed_start);
    }

    #[test]
    fn error_display_messages_are_preserved() {
        let cases = vec![
            (
                SimConfigError::InvalidGridSize,
                "grid_size must be greater than 0",
            ),
            (
                SimConfigError::GridSizeTooLarge {
                    max: 4096,
                    actual: 5000,
                },
                "grid_size (5000) exceeds supported maximum (4096)",
            ),
            (
                SimConfigError::InvalidTemperature,
                "temperature must be positive and finite",
            ),
            (
                SimConfigError::InvalidMaxActivationTicks,
                "max_activation_ticks must be greater than 0",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
