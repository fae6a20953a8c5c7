//! Unit conversion.
//!
//! Each [`ConversionCategory`] has a fixed set of units and a directed table
//! of [`ConversionRule`]s between them. The table is neither symmetric nor
//! complete, and converting along a pair of units with no entry (including
//! converting a unit to itself) leaves the value unchanged.

use lazy_static::lazy_static;
use smol_str::SmolStr;
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};
use tracing::debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConversionCategory {
    Length,
    Weight,
    Temperature,
}

impl ConversionCategory {
    pub const ALL: [ConversionCategory; 3] = [
        ConversionCategory::Length,
        ConversionCategory::Weight,
        ConversionCategory::Temperature,
    ];

    /// The names of the units in this category.
    pub fn units(self) -> &'static [&'static str] {
        match self {
            ConversionCategory::Length => {
                &["meters", "kilometers", "miles", "yards"]
            },
            ConversionCategory::Weight => {
                &["grams", "kilograms", "pounds", "ounces"]
            },
            ConversionCategory::Temperature => {
                &["Celsius", "Fahrenheit", "Kelvin"]
            },
        }
    }
}

impl Display for ConversionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionCategory::Length => "Length",
            ConversionCategory::Weight => "Weight",
            ConversionCategory::Temperature => "Temperature",
        };

        f.write_str(name)
    }
}

/// How to get from one unit to another.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConversionRule {
    /// Multiply by a constant factor.
    Scalar(f64),
    /// `slope * value + intercept`.
    Affine { slope: f64, intercept: f64 },
}

impl ConversionRule {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ConversionRule::Scalar(factor) => value * factor,
            ConversionRule::Affine { slope, intercept } => {
                slope * value + intercept
            },
        }
    }
}

/// A directed lookup table of [`ConversionRule`]s.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionTable {
    rules: HashMap<(ConversionCategory, SmolStr, SmolStr), ConversionRule>,
}

impl ConversionTable {
    pub fn new() -> Self { ConversionTable::default() }

    /// The table used by [`convert()`].
    pub fn standard() -> Self {
        use ConversionCategory::*;

        let mut table = ConversionTable::new();

        let length = [
            ("meters", "kilometers", 0.001),
            ("meters", "miles", 0.000621371),
            ("meters", "yards", 1.09361),
            ("kilometers", "meters", 1000.0),
            ("kilometers", "miles", 0.621371),
            ("kilometers", "yards", 1093.61),
            ("miles", "meters", 1609.34),
            ("miles", "kilometers", 1.60934),
            ("miles", "yards", 1760.0),
            ("yards", "meters", 0.9144),
            ("yards", "kilometers", 0.0009144),
            ("yards", "miles", 0.000568182),
        ];
        let weight = [
            ("grams", "kilograms", 0.001),
            ("grams", "pounds", 0.00220462),
            ("grams", "ounces", 0.035274),
            ("kilograms", "grams", 1000.0),
            ("kilograms", "pounds", 2.20462),
            ("kilograms", "ounces", 35.274),
            ("pounds", "grams", 453.592),
            ("pounds", "kilograms", 0.453592),
            ("pounds", "ounces", 16.0),
            ("ounces", "grams", 28.3495),
            ("ounces", "kilograms", 0.0283495),
            ("ounces", "pounds", 0.0625),
        ];

        for &(from, to, factor) in &length {
            table.insert(Length, from, to, ConversionRule::Scalar(factor));
        }
        for &(from, to, factor) in &weight {
            table.insert(Weight, from, to, ConversionRule::Scalar(factor));
        }

        let temperature = [
            ("Celsius", "Fahrenheit", 1.8, 32.0),
            ("Celsius", "Kelvin", 1.0, 273.15),
            ("Fahrenheit", "Celsius", 5.0 / 9.0, -160.0 / 9.0),
            ("Fahrenheit", "Kelvin", 5.0 / 9.0, 273.15 - 160.0 / 9.0),
            ("Kelvin", "Celsius", 1.0, -273.15),
            ("Kelvin", "Fahrenheit", 1.8, -459.67),
        ];

        for &(from, to, slope, intercept) in &temperature {
            table.insert(
                Temperature,
                from,
                to,
                ConversionRule::Affine { slope, intercept },
            );
        }

        table
    }

    /// Add (or replace) the rule for converting `from` into `to`.
    pub fn insert(
        &mut self,
        category: ConversionCategory,
        from: &str,
        to: &str,
        rule: ConversionRule,
    ) -> Option<ConversionRule> {
        self.rules.insert((category, from.into(), to.into()), rule)
    }

    /// The rule for converting `from` into `to`, if the table has one.
    pub fn rule(
        &self,
        category: ConversionCategory,
        from: &str,
        to: &str,
    ) -> Option<ConversionRule> {
        self.rules
            .get(&(category, SmolStr::new(from), SmolStr::new(to)))
            .copied()
    }

    /// Convert `value` from one unit to another.
    pub fn convert(
        &self,
        category: ConversionCategory,
        from: &str,
        to: &str,
        value: f64,
    ) -> f64 {
        match self.rule(category, from, to) {
            Some(rule) => rule.apply(value),
            None => {
                // Legacy behaviour: a missing entry is the identity, even
                // for unit names the category doesn't know about.
                debug!(%category, from, to, "No conversion rule, using the identity");
                value
            },
        }
    }

    pub fn len(&self) -> usize { self.rules.len() }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }
}

lazy_static! {
    static ref STANDARD: ConversionTable = ConversionTable::standard();
}

/// Convert `value` between two units using the standard table.
///
/// This never fails. See the [module docs](self) for what happens when
/// there is no rule for a pair of units.
pub fn convert(
    category: ConversionCategory,
    from: &str,
    to: &str,
    value: f64,
) -> f64 {
    STANDARD.convert(category, from, to, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use super::ConversionCategory::*;

    #[test]
    fn lengths_and_weights_are_scaled() {
        let inputs = vec![
            (Length, "meters", "kilometers", 1000.0, 1.0),
            (Length, "miles", "yards", 2.0, 3520.0),
            (Length, "yards", "meters", 10.0, 9.144),
            (Weight, "pounds", "ounces", 3.0, 48.0),
            (Weight, "kilograms", "grams", 0.25, 250.0),
        ];

        for (category, from, to, value, should_be) in inputs {
            let got = convert(category, from, to, value);
            assert_relative_eq!(got, should_be, epsilon = 1e-9);
        }
    }

    #[test]
    fn temperatures_are_affine() {
        assert_eq!(convert(Temperature, "Celsius", "Fahrenheit", 0.0), 32.0);
        assert_abs_diff_eq!(
            convert(Temperature, "Celsius", "Fahrenheit", 100.0),
            212.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            convert(Temperature, "Kelvin", "Celsius", 273.15),
            0.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            convert(Temperature, "Fahrenheit", "Celsius", 212.0),
            100.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            convert(Temperature, "Fahrenheit", "Kelvin", 32.0),
            273.15,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            convert(Temperature, "Kelvin", "Fahrenheit", 0.0),
            -459.67,
            epsilon = 1e-9
        );
    }

    #[test]
    fn missing_rules_are_the_identity() {
        assert_eq!(convert(Length, "meters", "meters", 5.0), 5.0);
        assert_eq!(convert(Temperature, "Kelvin", "Kelvin", -12.5), -12.5);
        assert_eq!(convert(Weight, "grams", "light-years", 7.0), 7.0);
        assert_eq!(convert(Length, "grams", "ounces", 7.0), 7.0);
    }

    #[test]
    fn temperature_round_trips() {
        let units = Temperature.units();

        for from in units {
            for to in units {
                for &value in &[-40.0, 0.0, 36.6, 1000.0] {
                    let there = convert(Temperature, from, to, value);
                    let back = convert(Temperature, to, from, there);
                    assert_abs_diff_eq!(back, value, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn exact_inverse_pairs_round_trip() {
        let pairs = vec![
            (Length, "meters", "kilometers"),
            (Weight, "grams", "kilograms"),
            (Weight, "pounds", "ounces"),
        ];

        for (category, a, b) in pairs {
            let there = convert(category, a, b, 42.0);
            assert_relative_eq!(convert(category, b, a, there), 42.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rounded_factors_only_round_trip_approximately() {
        let there = convert(Length, "meters", "miles", 1000.0);
        let back = convert(Length, "miles", "meters", there);

        assert_ne!(back, 1000.0);
        assert_relative_eq!(back, 1000.0, max_relative = 1e-5);
    }

    #[test]
    fn every_unit_is_connected_to_every_other_unit() {
        let table = ConversionTable::standard();

        for &category in &ConversionCategory::ALL {
            let units = category.units();

            for from in units {
                for to in units.iter().filter(|&to| to != from) {
                    assert!(
                        table.rule(category, from, to).is_some(),
                        "{}: {} -> {}",
                        category,
                        from,
                        to
                    );
                }
                assert_eq!(table.rule(category, from, from), None);
            }
        }

        assert_eq!(table.len(), 12 + 12 + 6);
    }

    #[test]
    fn custom_tables() {
        let mut table = ConversionTable::new();
        assert!(table.is_empty());

        table.insert(Length, "feet", "inches", ConversionRule::Scalar(12.0));

        assert_eq!(table.convert(Length, "feet", "inches", 2.0), 24.0);
        assert_eq!(table.convert(Length, "inches", "feet", 24.0), 24.0);
    }
}
