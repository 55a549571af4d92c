//! Rule-based yield estimation engine
//!
//! Everything in here is pure: the same observation (and the same historical
//! comparison) always produces the same estimate, confidence and advisories.

mod confidence;
mod factors;
mod recommendations;

pub use confidence::*;
pub use factors::*;
pub use recommendations::*;

/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.776), 7.78);
        assert_eq!(round2(6.4799999999), 6.48);
        assert_eq!(round2(3.0), 3.0);
        assert_eq!(round2(0.005), 0.01);
    }
}
