//! This module defines various unit types used when reading and writing model data.
//!
//! The optimisation itself works on plain `f64` arrays; these types guard the boundaries.

/// The number of hours in a (non-leap) year
pub const HOURS_PER_YEAR: f64 = 8760.0;

macro_rules! unit_struct {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            derive_more::Add,
            derive_more::Sub,
            serde::Serialize,
            serde::Deserialize,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                $name(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

unit_struct!(Dimensionless, "A dimensionless quantity, such as a capacity factor.");
unit_struct!(Capacity, "Generating capacity in MW.");
unit_struct!(Energy, "Energy in MWh (generation over a year).");
unit_struct!(MoneyPerCapacity, "A one-off cost per MW of capacity.");
unit_struct!(MoneyPerCapacityPerYear, "An annual cost per MW of capacity.");
unit_struct!(MoneyPerEnergy, "A cost per MWh of generation.");
unit_struct!(JobsPerCapacity, "An employment factor, in jobs per MW.");

/// The maximum generation over a year of some capacity operating at the given capacity factor
pub fn annual_generation(capacity: Capacity, capacity_factor: Dimensionless) -> Energy {
    Energy(capacity.0 * capacity_factor.0 * HOURS_PER_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_annual_generation() {
        let generation = annual_generation(Capacity(10.0), Dimensionless(0.75));
        assert_approx_eq!(f64, generation.value(), 65_700.0);
    }
}
