//! crates/meal_planner_core/src/rounding.rs
//!
//! Rounds shopping quantities up to amounts people actually buy.

/// Absorbs floating point noise so an already rounded amount stays put.
const EPSILON: f64 = 1e-9;

/// Unit families with their own rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Kilogram,
    Liter,
    Gram,
    Milliliter,
    Piece,
    Other,
}

impl UnitFamily {
    pub fn from_unit(unit: &str) -> Self {
        match unit.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => UnitFamily::Kilogram,
            "l" | "liter" | "liters" | "litre" | "litres" => UnitFamily::Liter,
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => UnitFamily::Gram,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => UnitFamily::Milliliter,
            "piece" | "pieces" | "pc" | "pcs" | "unit" | "units" | "pièce" | "pièces" | "stuk"
            | "stuks" => UnitFamily::Piece,
            _ => UnitFamily::Other,
        }
    }
}

/// Rounds `value` up to a whole multiple of `step`.
fn ceil_to_step(value: f64, step: f64) -> f64 {
    (value / step - EPSILON).ceil() * step
}

/// Rounds `value` up to a whole multiple of `1 / parts`.
fn ceil_to_fraction(value: f64, parts: f64) -> f64 {
    (value * parts - EPSILON).ceil() / parts
}

/// Rounds a required quantity up according to its unit.
///
/// - kg, l: next quarter
/// - g: next 10 below 50, next 25 below 200, next 50 otherwise
/// - ml: next 10 below 100, next 50 otherwise
/// - pieces: next whole number
/// - anything else: next hundredth
///
/// Zero and negative quantities round to zero. The rule is monotonic and
/// idempotent.
pub fn round_quantity(quantity: f64, unit: &str) -> f64 {
    if !quantity.is_finite() || quantity <= 0.0 {
        return 0.0;
    }
    match UnitFamily::from_unit(unit) {
        UnitFamily::Kilogram | UnitFamily::Liter => ceil_to_fraction(quantity, 4.0),
        UnitFamily::Gram => {
            let step = if quantity < 50.0 {
                10.0
            } else if quantity < 200.0 {
                25.0
            } else {
                50.0
            };
            ceil_to_step(quantity, step)
        }
        UnitFamily::Milliliter => {
            let step = if quantity < 100.0 { 10.0 } else { 50.0 };
            ceil_to_step(quantity, step)
        }
        UnitFamily::Piece => ceil_to_step(quantity, 1.0),
        UnitFamily::Other => ceil_to_fraction(quantity, 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_use_growing_buckets() {
        assert_eq!(round_quantity(3.0, "g"), 10.0);
        assert_eq!(round_quantity(41.0, "g"), 50.0);
        assert_eq!(round_quantity(51.0, "g"), 75.0);
        assert_eq!(round_quantity(180.0, "g"), 200.0);
        assert_eq!(round_quantity(330.0, "g"), 350.0);
        assert_eq!(round_quantity(400.0, "G"), 400.0);
    }

    #[test]
    fn milliliters_use_two_buckets() {
        assert_eq!(round_quantity(12.0, "ml"), 20.0);
        assert_eq!(round_quantity(101.0, "ml"), 150.0);
    }

    #[test]
    fn kilos_and_liters_round_to_quarters() {
        assert_eq!(round_quantity(0.3, "kg"), 0.5);
        assert_eq!(round_quantity(1.0, "kg"), 1.0);
        assert_eq!(round_quantity(1.01, "l"), 1.25);
    }

    #[test]
    fn pieces_round_to_whole_numbers() {
        assert_eq!(round_quantity(2.1, "piece"), 3.0);
        assert_eq!(round_quantity(2.0, "pcs"), 2.0);
    }

    #[test]
    fn other_units_round_to_hundredths() {
        assert_eq!(round_quantity(1.234, "tbsp"), 1.24);
        assert_eq!(round_quantity(0.1 + 0.2, "cup"), 0.3);
    }

    #[test]
    fn non_positive_quantities_round_to_zero() {
        assert_eq!(round_quantity(0.0, "g"), 0.0);
        assert_eq!(round_quantity(-5.0, "kg"), 0.0);
        assert_eq!(round_quantity(f64::NAN, "g"), 0.0);
    }

    #[test]
    fn rounding_is_idempotent_and_monotonic() {
        for unit in ["g", "kg", "ml", "l", "piece", "tsp"] {
            let mut previous = 0.0;
            for step in 1..2_000 {
                let quantity = f64::from(step) * 0.37;
                let once = round_quantity(quantity, unit);
                assert_eq!(round_quantity(once, unit), once, "{} {}", quantity, unit);
                assert!(once >= quantity - 1e-6, "{} {}", quantity, unit);
                assert!(once >= previous, "{} {}", quantity, unit);
                previous = once;
            }
        }
    }
}
