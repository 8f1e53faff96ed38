use crate::models::PostalCode;

/// Estimates the delivery distance from the shop to a postal code
pub trait DistanceEstimator: Send + Sync {
    fn estimate_km(&self, postal_code: &PostalCode) -> f64;
}

/// Stand-in for a routing service: a uniform draw from
/// `[min_km, min_km + span_km]`, rounded to one decimal place.
/// The postal code is ignored.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDistance {
    min_km: f64,
    span_km: f64,
}

impl SimulatedDistance {
    pub fn new(min_km: f64, span_km: f64) -> Self {
        Self { min_km, span_km }
    }

    pub fn min_km(&self) -> f64 {
        self.min_km
    }

    pub fn max_km(&self) -> f64 {
        self.min_km + self.span_km
    }

    /// Map a unit sample in `[0, 1)` onto the configured range
    pub fn from_unit(&self, sample: f64) -> f64 {
        round_to_tenth(sample * self.span_km + self.min_km)
    }
}

impl Default for SimulatedDistance {
    fn default() -> Self {
        Self::new(0.5, 15.0)
    }
}

impl DistanceEstimator for SimulatedDistance {
    fn estimate_km(&self, _postal_code: &PostalCode) -> f64 {
        self.from_unit(rand::random::<f64>())
    }
}

/// Always returns the same distance; used by tests and demos
#[derive(Debug, Clone, Copy)]
pub struct FixedDistance(pub f64);

impl DistanceEstimator for FixedDistance {
    fn estimate_km(&self, _postal_code: &PostalCode) -> f64 {
        self.0
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> PostalCode {
        PostalCode::parse("58046085").unwrap()
    }

    #[test]
    fn test_simulated_distance_stays_in_range() {
        let estimator = SimulatedDistance::default();
        for _ in 0..1_000 {
            let km = estimator.estimate_km(&code());
            assert!((0.5..=15.5).contains(&km), "out of range: {}", km);
            assert_eq!(round_to_tenth(km), km);
        }
    }

    #[test]
    fn test_from_unit_bounds() {
        let estimator = SimulatedDistance::default();
        assert_eq!(estimator.from_unit(0.0), 0.5);
        assert_eq!(estimator.from_unit(0.999_999), 15.5);
        assert_eq!(estimator.from_unit(0.5), 8.0);
        assert_eq!(estimator.max_km(), 15.5);
    }

    #[test]
    fn test_fixed_distance() {
        assert_eq!(FixedDistance(7.3).estimate_km(&code()), 7.3);
    }
}
