//! Grid-aligned bucket coordinates.

use serde::{Deserialize, Serialize};

/// Origin of a grid cell: each axis is a multiple of the grid size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketCoord {
    pub x: i64,
    pub y: i64,
}

impl BucketCoord {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Quantize a raw position by flooring each axis to the nearest
    /// multiple of `grid_size` (treated as at least 1).
    pub fn from_position(x: f64, y: f64, grid_size: u32) -> Self {
        let grid = grid_size.max(1);
        Self {
            x: snap(x, grid),
            y: snap(y, grid),
        }
    }
}

// Multiply in f64 so the final cast saturates instead of overflowing.
fn snap(value: f64, grid: u32) -> i64 {
    let grid = grid as f64;
    ((value / grid).floor() * grid) as i64
}

impl std::fmt::Display for BucketCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_floors_to_grid_multiple() {
        assert_eq!(BucketCoord::from_position(12.0, 11.0, 5), BucketCoord::new(10, 10));
        assert_eq!(BucketCoord::from_position(14.999, 10.0, 5), BucketCoord::new(10, 10));
        assert_eq!(BucketCoord::from_position(15.0, 4.9, 5), BucketCoord::new(15, 0));
        assert_eq!(BucketCoord::from_position(0.0, 0.0, 5), BucketCoord::new(0, 0));
    }

    #[test]
    fn test_zero_grid_is_treated_as_one() {
        assert_eq!(BucketCoord::from_position(7.6, 3.2, 0), BucketCoord::new(7, 3));
    }

    #[test]
    fn test_huge_coordinates_saturate() {
        let coord = BucketCoord::from_position(1e19, 10.0, 5);
        assert_eq!(coord, BucketCoord::new(i64::MAX, 10));

        let coord = BucketCoord::from_position(-1e30, 1e30, 7);
        assert_eq!(coord, BucketCoord::new(i64::MIN, i64::MAX));
    }

    proptest! {
        #[test]
        fn bucket_contains_its_position(
            x in 0.0f64..4000.0,
            y in 0.0f64..4000.0,
            grid in 1u32..64,
        ) {
            let coord = BucketCoord::from_position(x, y, grid);
            prop_assert_eq!(coord.x % grid as i64, 0);
            prop_assert_eq!(coord.y % grid as i64, 0);
            prop_assert!(coord.x as f64 <= x + 1e-9 && x < (coord.x + grid as i64) as f64);
            prop_assert!(coord.y as f64 <= y + 1e-9 && y < (coord.y + grid as i64) as f64);
        }
    }
}
