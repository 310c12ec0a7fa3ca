use crate::error::CoverageError;
use core::fmt;
use serde::Serialize;

/// A 3D position, in meters, in the scenario's flat Cartesian frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`, in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A fixed piece of radio infrastructure. Created at setup, read-only
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessPoint {
    index: u32,
    position: Position,
}

impl AccessPoint {
    pub const fn new(index: u32, position: Position) -> Self {
        Self { index, position }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }
}

/// The set of access points and the coverage radius they all share.
///
/// A position is covered if ANY access point lies within the radius —
/// nearest-AP-wins, no hysteresis.
#[derive(Debug, Clone)]
pub struct CoverageArea {
    access_points: Vec<AccessPoint>,
    radius_m: f64,
}

impl CoverageArea {
    /// Create an empty coverage area with the given radius in meters.
    ///
    /// # Errors
    ///
    /// Rejects a radius that is not strictly positive (including NaN).
    pub fn new(radius_m: f64) -> Result<Self, CoverageError> {
        if !(radius_m > 0.0) {
            return Err(CoverageError::InvalidRadius(radius_m));
        }
        Ok(Self {
            access_points: Vec::new(),
            radius_m,
        })
    }

    pub fn add_access_point(&mut self, position: Position) -> &AccessPoint {
        let index = self.access_points.len() as u32;
        self.access_points.push(AccessPoint::new(index, position));
        &self.access_points[index as usize]
    }

    #[inline]
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.access_points.is_empty()
    }

    pub fn access_points(&self) -> impl Iterator<Item = &AccessPoint> {
        self.access_points.iter()
    }

    /// `true` if `position` is within the coverage radius of any access
    /// point. A position at exactly the radius is covered.
    pub fn covers(&self, position: &Position) -> bool {
        self.access_points
            .iter()
            .any(|ap| position.distance_to(&ap.position) <= self.radius_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.distance_to(&a), 5.0);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn distance_uses_all_three_axes() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(1.0, 2.0, 7.0);
        assert_eq!(a.distance_to(&b), 4.0);
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(CoverageArea::new(0.0).is_err());
        assert!(CoverageArea::new(-1.0).is_err());
        assert!(CoverageArea::new(f64::NAN).is_err());
        assert!(CoverageArea::new(50.0).is_ok());
    }

    #[test]
    fn boundary_is_in_coverage() {
        let mut area = CoverageArea::new(50.0).unwrap();
        area.add_access_point(Position::ORIGIN);

        assert!(area.covers(&Position::new(50.0, 0.0, 0.0)));
        assert!(!area.covers(&Position::new(51.0, 0.0, 0.0)));
    }

    #[test]
    fn any_access_point_suffices() {
        let mut area = CoverageArea::new(10.0).unwrap();
        area.add_access_point(Position::ORIGIN);
        area.add_access_point(Position::new(100.0, 0.0, 0.0));

        assert!(area.covers(&Position::new(95.0, 0.0, 0.0)));
        assert!(!area.covers(&Position::new(50.0, 0.0, 0.0)));
    }

    #[test]
    fn empty_area_covers_nothing() {
        let area = CoverageArea::new(50.0).unwrap();
        assert!(area.is_empty());
        assert!(!area.covers(&Position::ORIGIN));
    }
}
