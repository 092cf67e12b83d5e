//! This module defines the unit types used for model quantities.
//!
//! Keeping hours and money in distinct newtypes stops capacity arithmetic from silently mixing
//! incompatible quantities.

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            derive_more::Add,
            derive_more::Sub,
            serde::Deserialize,
            serde::Serialize,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Returns true if this value is neither infinite nor NaN.
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

unit_struct!(Hours);
unit_struct!(Money);
unit_struct!(MoneyPerUnit);

impl std::ops::Mul<f64> for Hours {
    type Output = Hours;

    fn mul(self, rhs: f64) -> Hours {
        Hours(self.0 * rhs)
    }
}

impl std::ops::Div<Hours> for Hours {
    // e.g. run hours divided by cycle time gives a unit count
    type Output = f64;

    fn div(self, rhs: Hours) -> f64 {
        self.0 / rhs.0
    }
}

impl std::ops::Mul<f64> for MoneyPerUnit {
    type Output = Money;

    fn mul(self, rhs: f64) -> Money {
        Money(self.0 * rhs)
    }
}
