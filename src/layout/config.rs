use serde::{Deserialize, Serialize};

use super::error::ValidationError;

pub const DEFAULT_ALPHA_MIN: f64 = 0.001;
const COOLING_STEPS: f64 = 300.0;

/// Tunables of the force model and the cooling schedule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub link_distance: f64,
    /// Many-body strength; negative values repel.
    pub charge: f64,
    /// Distance floor applied to repulsion so coincident nodes stay finite.
    pub charge_distance_min: f64,
    /// Barnes-Hut opening angle. `0.0` sums every pair exactly.
    pub theta: f64,
    /// Fraction of the centroid offset applied to free nodes each step.
    pub centering_strength: f64,
    pub velocity_damping: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Seed for initial placement; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Decay rate that takes `alpha` from 1.0 to `alpha_min` in 300 steps.
    pub fn decay_for(alpha_min: f64) -> f64 {
        1.0 - alpha_min.powf(1.0 / COOLING_STEPS)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects values that would turn positions or `alpha` non-finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            ("link_distance", self.link_distance, self.link_distance >= 0.0),
            ("charge", self.charge, true),
            ("charge_distance_min", self.charge_distance_min, self.charge_distance_min >= 0.0),
            ("theta", self.theta, self.theta >= 0.0),
            ("centering_strength", self.centering_strength, true),
            (
                "velocity_damping",
                self.velocity_damping,
                (0.0..=1.0).contains(&self.velocity_damping),
            ),
            ("alpha_min", self.alpha_min, self.alpha_min >= 0.0),
            ("alpha_decay", self.alpha_decay, (0.0..=1.0).contains(&self.alpha_decay)),
        ];
        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(ValidationError::InvalidSetting { field, value });
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_distance: 50.0,
            charge: -200.0,
            charge_distance_min: 1.0,
            theta: 0.0,
            centering_strength: 0.1,
            velocity_damping: 0.6,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: Self::decay_for(DEFAULT_ALPHA_MIN),
            seed: None,
        }
    }
}
