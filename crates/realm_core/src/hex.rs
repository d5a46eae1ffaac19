//! Axial hex-grid math.
//!
//! Tiles are addressed with axial coordinates `(q, r)`; the third cube
//! coordinate is implicit as `-q - r`. Everything here is pure and
//! stateless. Neighbour enumeration does no bounds checking: callers
//! filter against the tiles that actually exist.

use serde::{Deserialize, Serialize};

/// Pixel radius of one hex in the reference pointy-top layout.
pub const HEX_SIZE: f64 = 22.0;

/// The six axial neighbour offsets, in canonical order.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, -1), (-1, 1)];

/// Axial hex coordinate.
///
/// Ordering is `q`-major, `r`-minor, which is also the order in which
/// islands are generated and iterated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Hex {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

impl Hex {
    /// The island centre, where the player always starts.
    pub const ORIGIN: Self = Self { q: 0, r: 0 };

    /// Create a hex from axial coordinates.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube coordinate.
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// The six adjacent coordinates, in [`DIRECTIONS`] order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        DIRECTIONS.map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
    }

    /// Cube distance to another hex.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// Cube distance from [`Hex::ORIGIN`].
    #[must_use]
    pub fn distance_from_origin(self) -> u32 {
        self.distance(Self::ORIGIN)
    }

    /// Whether `other` is one of the six neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.distance(other) == 1
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Enumerate every hex within `radius` of the origin, `q`-major.
#[must_use]
pub fn hexes_within(radius: u32) -> Vec<Hex> {
    let radius = i32::try_from(radius).unwrap_or(i32::MAX);
    let mut hexes = Vec::new();
    for q in -radius..=radius {
        for r in -radius..=radius {
            if (q + r).abs() <= radius {
                hexes.push(Hex::new(q, r));
            }
        }
    }
    hexes
}

/// Round half toward positive infinity, so `-0.5` goes to `0` and `0.5` to `1`.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Snap fractional cube coordinates to the nearest hex.
///
/// Each component is rounded independently; the one with the largest
/// rounding error is then recomputed from the other two so that
/// `x + y + z == 0` holds. Ties are broken by comparing `dx` against
/// `dy` and `dz` first, then `dy` against `dz`, falling through to `z`.
/// The result maps cube `x` to `q` and cube `z` to `r`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cube_round(x: f64, y: f64, z: f64) -> Hex {
    let mut rx = round_half_up(x);
    let ry = round_half_up(y);
    let mut rz = round_half_up(z);

    let dx = (rx - x).abs();
    let dy = (ry - y).abs();
    let dz = (rz - z).abs();

    if dx > dy && dx > dz {
        rx = -ry - rz;
    } else if dy > dz {
        // y is recomputed; q and r are already final.
    } else {
        rz = -rx - ry;
    }

    Hex::new(rx as i32, rz as i32)
}

/// Centre of a hex in pointy-top pixel space, with the origin at the
/// middle of a `width` x `height` viewport.
#[must_use]
pub fn hex_to_pixel(hex: Hex, width: f64, height: f64) -> (f64, f64) {
    let q = f64::from(hex.q);
    let r = f64::from(hex.r);
    let sqrt3 = 3f64.sqrt();
    (
        HEX_SIZE * (sqrt3 * q + sqrt3 / 2.0 * r) + width / 2.0,
        HEX_SIZE * (1.5 * r) + height / 2.0,
    )
}

/// Inverse of [`hex_to_pixel`]: the hex under a viewport pixel.
#[must_use]
pub fn pixel_to_hex(x: f64, y: f64, width: f64, height: f64) -> Hex {
    let x = x - width / 2.0;
    let y = y - height / 2.0;
    let q = (3f64.sqrt() / 3.0 * x - y / 3.0) / HEX_SIZE;
    let r = (2.0 / 3.0 * y) / HEX_SIZE;
    cube_round(q, -q - r, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_neighbors_order() {
        let n = Hex::new(2, -1).neighbors();
        assert_eq!(n[0], Hex::new(3, -1));
        assert_eq!(n[1], Hex::new(1, -1));
        assert_eq!(n[2], Hex::new(2, 0));
        assert_eq!(n[3], Hex::new(2, -2));
        assert_eq!(n[4], Hex::new(3, -2));
        assert_eq!(n[5], Hex::new(1, 0));
        assert!(n.iter().all(|h| h.distance(Hex::new(2, -1)) == 1));
    }

    #[test]
    fn test_distance_from_origin() {
        assert_eq!(Hex::ORIGIN.distance_from_origin(), 0);
        assert_eq!(Hex::new(1, -1).distance_from_origin(), 1);
        assert_eq!(Hex::new(3, -1).distance_from_origin(), 3);
        assert_eq!(Hex::new(-2, -2).distance_from_origin(), 4);
    }

    #[test]
    fn test_hexes_within_counts() {
        assert_eq!(hexes_within(0), vec![Hex::ORIGIN]);
        assert_eq!(hexes_within(1).len(), 7);
        assert_eq!(hexes_within(2).len(), 19);
        // 3R(R+1)+1
        assert_eq!(hexes_within(11).len(), 3 * 11 * 12 + 1);
    }

    #[test]
    fn test_hexes_within_sorted() {
        let hexes = hexes_within(3);
        let mut sorted = hexes.clone();
        sorted.sort();
        assert_eq!(hexes, sorted);
    }

    #[test]
    fn test_cube_round_exact() {
        assert_eq!(cube_round(1.0, -3.0, 2.0), Hex::new(1, 2));
        assert_eq!(cube_round(0.1, -0.2, 0.1), Hex::ORIGIN);
    }

    #[test]
    fn test_cube_round_fixes_largest_error() {
        // x rounds 0.4 -> 0 (err 0.4), y -0.45 -> 0 (err 0.45), z 0.05 -> 0.
        // y has the largest error, so y is recomputed and x/z are kept.
        assert_eq!(cube_round(0.4, -0.45, 0.05), Hex::new(0, 0));
        // x carries the largest error and gets recomputed from y and z.
        assert_eq!(cube_round(0.48, -0.8, 0.32), Hex::new(1, 0));
        // dx == dz: the tie falls through to recomputing z.
        assert_eq!(cube_round(0.45, -0.9, 0.45), Hex::new(0, 1));
    }

    #[test]
    fn test_cube_round_half_rounds_up() {
        // 0.5 rounds up to 1 for x and z; dx == dz so z is recomputed.
        let h = cube_round(0.5, -1.0, 0.5);
        assert_eq!(h, Hex::new(1, 0));
    }

    #[test]
    fn test_pixel_round_trip_centres() {
        for hex in hexes_within(4) {
            let (x, y) = hex_to_pixel(hex, 800.0, 600.0);
            assert_eq!(pixel_to_hex(x, y, 800.0, 600.0), hex);
        }
    }

    proptest! {
        #[test]
        fn prop_cube_round_is_nearest_neighbourhood(q in -50.0f64..50.0, r in -50.0f64..50.0) {
            let hex = cube_round(q, -q - r, r);
            // Snapped hex lies within one step of naive axial rounding.
            #[allow(clippy::cast_possible_truncation)]
            let approx = Hex::new(q.round() as i32, r.round() as i32);
            prop_assert!(hex.distance(approx) <= 1);
        }

        #[test]
        fn prop_distance_symmetric(a in -30i32..30, b in -30i32..30, c in -30i32..30, d in -30i32..30) {
            let x = Hex::new(a, b);
            let y = Hex::new(c, d);
            prop_assert_eq!(x.distance(y), y.distance(x));
        }
    }
}
