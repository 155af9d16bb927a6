//! Loyalty points calculator
//!
//! Pure function from a monetary amount to an integer point count; the
//! award/reduce flows in the order status machine call through here.

use crate::settings::LoyaltyPointsSettings;

/// Points earned for spending `amount`, per the configured spend step.
///
/// Returns 0 when the program is disabled or the step is not positive.
pub fn points_for_amount(settings: &LoyaltyPointsSettings, amount: f64) -> i32 {
    if !settings.enabled || settings.points_for_purchase_amount <= 0.0 || amount <= 0.0 {
        return 0;
    }
    let steps = (amount / settings.points_for_purchase_amount).floor() as i32;
    steps * settings.points_for_purchase_points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_follow_spend_step() {
        let settings = LoyaltyPointsSettings::default();
        assert_eq!(points_for_amount(&settings, 0.0), 0);
        assert_eq!(points_for_amount(&settings, 9.99), 0);
        assert_eq!(points_for_amount(&settings, 10.0), 1);
        assert_eq!(points_for_amount(&settings, 99.0), 9);
        assert_eq!(points_for_amount(&settings, 100.0), 10);
    }

    #[test]
    fn test_points_per_step_multiplier() {
        let settings = LoyaltyPointsSettings {
            points_for_purchase_points: 5,
            ..Default::default()
        };
        assert_eq!(points_for_amount(&settings, 30.0), 15);
    }

    #[test]
    fn test_disabled_program_earns_nothing() {
        let settings = LoyaltyPointsSettings {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(points_for_amount(&settings, 1000.0), 0);
    }

    #[test]
    fn test_degenerate_step_earns_nothing() {
        let settings = LoyaltyPointsSettings {
            points_for_purchase_amount: 0.0,
            ..Default::default()
        };
        assert_eq!(points_for_amount(&settings, 1000.0), 0);
    }
}
