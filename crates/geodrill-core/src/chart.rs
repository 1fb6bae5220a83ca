//! Synthetic monthly climate data for the scatter chart
//!
//! Values are random but seeded from the entity name, so an entity always
//! gets the same chart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::tier::Tier;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimatePoint {
    pub month: &'static str,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateSeries {
    pub entity: String,
    pub tier: Tier,
    pub points: Vec<ClimatePoint>,
}

impl ClimateSeries {
    /// Twelve monthly points for `entity`
    ///
    /// Temperature is `base + U(-5, 15)` and precipitation `base + U(0, 100)`,
    /// with bases depending on the tier.
    pub fn generate(entity: &str, tier: Tier) -> Self {
        let (temp_base, precip_base) = base_values(tier);
        let mut rng = StdRng::seed_from_u64(seed_for(entity));
        let points = MONTHS
            .iter()
            .map(|&month| ClimatePoint {
                month,
                temperature_c: temp_base + rng.random_range(-5.0..15.0),
                precipitation_mm: precip_base + rng.random_range(0.0..100.0),
            })
            .collect();
        Self {
            entity: entity.to_string(),
            tier,
            points,
        }
    }

    /// (min, max) temperature over all points
    pub fn temperature_range(&self) -> (f64, f64) {
        min_max(self.points.iter().map(|p| p.temperature_c))
    }

    /// (min, max) precipitation over all points
    pub fn precipitation_range(&self) -> (f64, f64) {
        min_max(self.points.iter().map(|p| p.precipitation_mm))
    }
}

fn base_values(tier: Tier) -> (f64, f64) {
    match tier {
        Tier::City => (15.0, 50.0),
        Tier::State => (12.0, 70.0),
        Tier::Country => (10.0, 90.0),
        Tier::Continent => (8.0, 120.0),
    }
}

fn seed_for(entity: &str) -> u64 {
    let digest = blake3::hash(entity.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
