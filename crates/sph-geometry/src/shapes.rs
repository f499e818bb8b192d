//! Geometric primitives with exact signed distances.

use sph_math::{Aabb, Vecd};

use crate::Shape;

/// Circle (2D) or sphere (3D) centered at a point.
#[derive(Debug, Clone, Copy)]
pub struct Ball<const D: usize> {
    pub center: Vecd<D>,
    pub radius: f64,
}

impl<const D: usize> Ball<D> {
    /// Create a ball from center and radius.
    pub fn new(center: Vecd<D>, radius: f64) -> Self {
        assert!(radius > 0.0, "radius must be positive");
        Self { center, radius }
    }
}

impl<const D: usize> Shape<D> for Ball<D> {
    fn bounds(&self) -> Aabb<D> {
        let r = Vecd::<D>::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    fn signed_distance(&self, position: &Vecd<D>) -> f64 {
        (position - self.center).norm() - self.radius
    }
}

/// Axis-aligned box given by center and half-extents.
#[derive(Debug, Clone, Copy)]
pub struct Block<const D: usize> {
    pub center: Vecd<D>,
    pub half_extents: Vecd<D>,
}

impl<const D: usize> Block<D> {
    /// Create a block from center and half-extents.
    pub fn new(center: Vecd<D>, half_extents: Vecd<D>) -> Self {
        assert!(
            (0..D).all(|i| half_extents[i] > 0.0),
            "half extents must be positive"
        );
        Self {
            center,
            half_extents,
        }
    }
}

impl<const D: usize> Shape<D> for Block<D> {
    fn bounds(&self) -> Aabb<D> {
        Aabb::new(
            self.center - self.half_extents,
            self.center + self.half_extents,
        )
    }

    fn signed_distance(&self, position: &Vecd<D>) -> f64 {
        // per-axis distance to the faces; positive components point outside
        let d = Vecd::<D>::from_fn(|i, _| (position[i] - self.center[i]).abs() - self.half_extents[i]);
        let outside = Vecd::<D>::from_fn(|i, _| d[i].max(0.0));
        let inside = d.max().min(0.0);
        outside.norm() + inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sph_math::{Vec2, Vec3};

    #[test]
    fn test_ball_signed_distance() {
        let ball = Ball::new(Vec2::new(1.0, 0.0), 0.5);
        assert_relative_eq!(ball.signed_distance(&Vec2::new(1.0, 0.0)), -0.5);
        assert_relative_eq!(ball.signed_distance(&Vec2::new(2.0, 0.0)), 0.5);
        assert_relative_eq!(ball.signed_distance(&Vec2::new(1.5, 0.0)), 0.0);
        assert!(ball.contains(&Vec2::new(1.2, 0.1)));
    }

    #[test]
    fn test_ball_bounds() {
        let ball = Ball::new(Vec3::new(0.0, 1.0, 0.0), 2.0);
        let bounds = ball.bounds();
        assert_relative_eq!(bounds.min.y, -1.0);
        assert_relative_eq!(bounds.max.y, 3.0);
        assert_relative_eq!(bounds.min_dimension(), 4.0);
    }

    #[test]
    fn test_block_signed_distance_outside() {
        let block = Block::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        // straight out of a face
        assert_relative_eq!(block.signed_distance(&Vec2::new(2.0, 0.0)), 1.0);
        // out of a corner
        assert_relative_eq!(
            block.signed_distance(&Vec2::new(2.0, 2.0)),
            std::f64::consts::SQRT_2
        );
    }

    #[test]
    fn test_block_signed_distance_inside() {
        let block = Block::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0));
        // nearest face is x at distance 1
        assert_relative_eq!(block.signed_distance(&Vec3::new(0.0, 0.0, 0.0)), -1.0);
        assert!(block.contains(&Vec3::new(0.9, 1.9, 2.9)));
        assert!(!block.contains(&Vec3::new(1.1, 0.0, 0.0)));
    }
}
