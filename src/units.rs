//! Minimal physical-quantity support for camera coordinates.
//!
//! Pixel positions may be given either as focal-plane lengths (meters) or as
//! field-of-view angles (degrees), so both are valid coordinate units. Areas are
//! always the square of some coordinate unit.
//!
//! Arithmetic across units goes through [`Quantity::to`], which only converts
//! within one [`Dimension`]; mixing e.g. meters and degrees is an error.

use std::fmt;
use std::ops::{Mul, Neg};
use std::str::FromStr;

use crate::error::{GeometryError, Result};

/// Physical dimension of a [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Length,
    Angle,
    Area,
    SolidAngle,
}

/// Units understood by the geometry model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Meter,
    Centimeter,
    Millimeter,
    Degree,
    Radian,
    SquareMeter,
    SquareCentimeter,
    SquareMillimeter,
    SquareDegree,
    Steradian,
}

impl Unit {
    /// Canonical short symbol, as written into tables and `Display` output.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Meter => "m",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
            Unit::Degree => "deg",
            Unit::Radian => "rad",
            Unit::SquareMeter => "m2",
            Unit::SquareCentimeter => "cm2",
            Unit::SquareMillimeter => "mm2",
            Unit::SquareDegree => "deg2",
            Unit::Steradian => "sr",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Meter | Unit::Centimeter | Unit::Millimeter => Dimension::Length,
            Unit::Degree | Unit::Radian => Dimension::Angle,
            Unit::SquareMeter | Unit::SquareCentimeter | Unit::SquareMillimeter => {
                Dimension::Area
            }
            Unit::SquareDegree | Unit::Steradian => Dimension::SolidAngle,
        }
    }

    /// Scale factor to the base unit of the dimension (m, rad, m², sr).
    fn to_base(&self) -> f64 {
        let deg = std::f64::consts::PI / 180.0;
        match self {
            Unit::Meter => 1.0,
            Unit::Centimeter => 1e-2,
            Unit::Millimeter => 1e-3,
            Unit::Degree => deg,
            Unit::Radian => 1.0,
            Unit::SquareMeter => 1.0,
            Unit::SquareCentimeter => 1e-4,
            Unit::SquareMillimeter => 1e-6,
            Unit::SquareDegree => deg * deg,
            Unit::Steradian => 1.0,
        }
    }

    /// The unit of an area measured in this coordinate unit, if it has one.
    pub fn squared(&self) -> Option<Unit> {
        match self {
            Unit::Meter => Some(Unit::SquareMeter),
            Unit::Centimeter => Some(Unit::SquareCentimeter),
            Unit::Millimeter => Some(Unit::SquareMillimeter),
            Unit::Degree => Some(Unit::SquareDegree),
            Unit::Radian => Some(Unit::Steradian),
            _ => None,
        }
    }

    /// Multiplicative factor converting a value in `self` into `target`.
    pub fn conversion_factor(&self, target: Unit) -> Result<f64> {
        if self.dimension() != target.dimension() {
            return Err(GeometryError::IncompatibleUnits {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(self.to_base() / target.to_base())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self> {
        let unit = match s.trim() {
            "m" | "meter" | "meters" => Unit::Meter,
            "cm" => Unit::Centimeter,
            "mm" => Unit::Millimeter,
            "deg" | "degree" | "degrees" => Unit::Degree,
            "rad" | "radian" | "radians" => Unit::Radian,
            "m2" | "m^2" | "m**2" => Unit::SquareMeter,
            "cm2" | "cm^2" | "cm**2" => Unit::SquareCentimeter,
            "mm2" | "mm^2" | "mm**2" => Unit::SquareMillimeter,
            "deg2" | "deg^2" | "deg**2" => Unit::SquareDegree,
            "sr" | "rad2" | "rad^2" | "rad**2" => Unit::Steradian,
            other => return Err(GeometryError::UnknownUnit(other.to_string())),
        };
        Ok(unit)
    }
}

// ── Scalar quantity ─────────────────────────────────────────────────────────

/// A single value with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn degrees(value: f64) -> Self {
        Self::new(value, Unit::Degree)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, Unit::Meter)
    }

    /// Express this quantity in another unit of the same dimension.
    pub fn to(&self, unit: Unit) -> Result<Quantity> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(Quantity::new(self.value * factor, unit))
    }

    /// Sum in the unit of `self`.
    pub fn checked_add(&self, other: Quantity) -> Result<Quantity> {
        let rhs = other.to(self.unit)?;
        Ok(Quantity::new(self.value + rhs.value, self.unit))
    }

    /// Difference in the unit of `self`.
    pub fn checked_sub(&self, other: Quantity) -> Result<Quantity> {
        let rhs = other.to(self.unit)?;
        Ok(Quantity::new(self.value - rhs.value, self.unit))
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.value * rhs, self.unit)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity::new(-self.value, self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `{}` on f64 is the shortest representation that parses back exactly.
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Quantity {
    type Err = GeometryError;

    /// Parse strings such as `"0deg"`, `"100.893 deg"` or `"1e-3m"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // Try split points right-to-left so exponents ("1e3m") stay in the number.
        for (split, _) in s.char_indices().rev() {
            let (number, unit) = s.split_at(split);
            if unit.trim().is_empty() {
                continue;
            }
            if let (Ok(value), Ok(unit)) = (number.trim().parse::<f64>(), unit.parse::<Unit>()) {
                return Ok(Quantity::new(value, unit));
            }
        }
        Err(GeometryError::InvalidQuantity(s.to_string()))
    }
}

// ── Array quantity ──────────────────────────────────────────────────────────

/// A sequence of values sharing one unit, e.g. all pixel x coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityVec {
    pub values: Vec<f64>,
    pub unit: Unit,
}

impl QuantityVec {
    pub fn new(values: Vec<f64>, unit: Unit) -> Self {
        Self { values, unit }
    }

    /// `n` copies of the same quantity.
    pub fn filled(n: usize, q: Quantity) -> Self {
        Self::new(vec![q.value; n], q.unit)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<Quantity> {
        self.values.get(i).map(|&v| Quantity::new(v, self.unit))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.values.iter().map(move |&v| Quantity::new(v, self.unit))
    }

    /// Express all values in another unit of the same dimension.
    pub fn to(&self, unit: Unit) -> Result<QuantityVec> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(QuantityVec::new(
            self.values.iter().map(|v| v * factor).collect(),
            unit,
        ))
    }

    /// Values at the given positions, in the given order. Indices must be in range.
    pub(crate) fn gather(&self, indices: &[usize]) -> QuantityVec {
        QuantityVec::new(indices.iter().map(|&i| self.values[i]).collect(), self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        let q: Quantity = "0deg".parse().unwrap();
        assert_eq!(q, Quantity::degrees(0.0));

        let q: Quantity = "-100.893 deg".parse().unwrap();
        assert_eq!(q.value, -100.893);
        assert_eq!(q.unit, Unit::Degree);

        let q: Quantity = "1e-3m".parse().unwrap();
        assert_eq!(q, Quantity::meters(1e-3));

        let q: Quantity = "2.5m2".parse().unwrap();
        assert_eq!(q.unit, Unit::SquareMeter);

        assert!("12".parse::<Quantity>().is_err());
        assert!("deg".parse::<Quantity>().is_err());
        assert!("3 furlongs".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let q = Quantity::degrees(-100.893);
        let back: Quantity = q.to_string().parse().unwrap();
        assert_eq!(q, back);
    }

    #[test]
    fn test_conversion() {
        let q = Quantity::new(180.0, Unit::Degree).to(Unit::Radian).unwrap();
        assert!((q.value - std::f64::consts::PI).abs() < 1e-12);

        let q = Quantity::new(2.0, Unit::SquareMeter)
            .to(Unit::SquareCentimeter)
            .unwrap();
        assert!((q.value - 20_000.0).abs() < 1e-9);

        assert!(matches!(
            Quantity::meters(1.0).to(Unit::Degree),
            Err(GeometryError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_unit_aware_arithmetic() {
        let a = Quantity::meters(1.0);
        let b = Quantity::new(50.0, Unit::Centimeter);
        let sum = a.checked_add(b).unwrap();
        assert!((sum.value - 1.5).abs() < 1e-12);
        assert_eq!(sum.unit, Unit::Meter);
        assert!(a.checked_sub(Quantity::degrees(1.0)).is_err());
        assert_eq!(-(a * 2.0), Quantity::meters(-2.0));
    }

    #[test]
    fn test_squared_units() {
        assert_eq!(Unit::Meter.squared(), Some(Unit::SquareMeter));
        assert_eq!(Unit::Degree.squared(), Some(Unit::SquareDegree));
        assert_eq!(Unit::SquareMeter.squared(), None);
    }
}
