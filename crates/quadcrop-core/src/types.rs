// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Quadcrop document scanner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QuadcropError, Result};

/// Unique identifier for a scan session (one source image being worked on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2D coordinate in image pixel space (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy) as f32
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(&self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Closed boundary traced in a binary edge image. Not necessarily convex.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Position of a corner in the rectifier's positional roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerRole {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerRole {
    pub const ALL: [CornerRole; 4] = [
        CornerRole::TopLeft,
        CornerRole::TopRight,
        CornerRole::BottomRight,
        CornerRole::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }
}

/// A populated corner set: always exactly four points.
///
/// An absent corner set is expressed as `Option<Quad>`, which keeps the
/// "0 or 4 points" invariant in the type system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    corners: [Point; 4],
}

impl Quad {
    pub fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Build a quad from a slice, failing unless it holds exactly 4 points.
    pub fn from_slice(points: &[Point]) -> Result<Self> {
        let corners: [Point; 4] = points
            .try_into()
            .map_err(|_| QuadcropError::CornerCount(points.len()))?;
        Ok(Self { corners })
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.corners.to_vec()
    }

    /// Corner by positional role (meaningful once the quad is ordered and anchored).
    pub fn corner(&self, role: CornerRole) -> Point {
        self.corners[role.index()]
    }

    /// Replace the corner at `index`.
    pub fn set_corner(&mut self, index: usize, point: Point) -> Result<()> {
        let slot = self
            .corners
            .get_mut(index)
            .ok_or(QuadcropError::CornerIndex(index))?;
        *slot = point;
        Ok(())
    }

    /// Arithmetic mean of the four corners.
    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .corners
            .iter()
            .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        Point::new((sx / 4.0) as f32, (sy / 4.0) as f32)
    }

    /// Enclosed area via the shoelace formula, assuming the corners are in
    /// rotational order.
    pub fn area(&self) -> f64 {
        let mut twice_area = 0.0f64;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
        }
        twice_area.abs() / 2.0
    }

    /// Multiply every corner by `factor` (used to map between resized and
    /// original image space).
    pub fn scaled(&self, factor: f32) -> Quad {
        Quad::new(self.corners.map(|p| p.scaled(factor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square(side: f32) -> Quad {
        Quad::new([
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ])
    }

    #[test]
    fn from_slice_requires_four_points() {
        let three = [Point::new(0.0, 0.0); 3];
        match Quad::from_slice(&three) {
            Err(QuadcropError::CornerCount(3)) => {}
            other => panic!("expected CornerCount(3), got {:?}", other),
        }
        assert!(Quad::from_slice(&[Point::default(); 4]).is_ok());
    }

    #[test]
    fn area_and_centroid_of_square() {
        let quad = unit_square(10.0);
        assert!((quad.area() - 100.0).abs() < 1e-9);
        assert_eq!(quad.centroid(), Point::new(5.0, 5.0));
    }

    #[test]
    fn set_corner_rejects_out_of_range_index() {
        let mut quad = unit_square(4.0);
        assert!(quad.set_corner(2, Point::new(5.0, 5.0)).is_ok());
        assert_eq!(quad.corner(CornerRole::BottomRight), Point::new(5.0, 5.0));
        assert!(matches!(
            quad.set_corner(4, Point::default()),
            Err(QuadcropError::CornerIndex(4))
        ));
    }

    #[test]
    fn scaling_maps_every_corner() {
        let quad = unit_square(10.0).scaled(0.5);
        assert_eq!(quad.corner(CornerRole::BottomRight), Point::new(5.0, 5.0));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
