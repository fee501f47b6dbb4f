use serde::Serialize;

/// Axial hex coordinate. The third cube coordinate is implicit (`s = -q-r`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const ORIGIN: Hex = Hex { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn offset(&self, dq: i32, dr: i32) -> Hex {
        Hex::new(self.q + dq, self.r + dr)
    }

    pub fn neighbors(&self) -> [Hex; 6] {
        neighbors(*self)
    }
}

/// Neighbor offsets in canonical enumeration order. BFS visits neighbors in
/// this order, which makes shortest-path tie-breaking deterministic.
pub const HEX_DIRS: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, -1), (-1, 1)];

pub fn neighbors(hex: Hex) -> [Hex; 6] {
    let mut out = [Hex::ORIGIN; 6];
    for (slot, (dq, dr)) in out.iter_mut().zip(HEX_DIRS) {
        *slot = hex.offset(dq, dr);
    }
    out
}

pub fn hex_distance(a: Hex, b: Hex) -> i32 {
    let dq = a.q - b.q;
    let dr = a.r - b.r;
    let ds = a.s() - b.s();
    (dq.abs() + dr.abs() + ds.abs()) / 2
}

/// Pointy-top planar projection, unit hex size. The renderer scales this.
pub fn to_plane(hex: Hex) -> (f32, f32) {
    let q = hex.q as f32;
    let r = hex.r as f32;
    let x = 3.0f32.sqrt() * (q + r / 2.0);
    let y = 1.5 * r;
    (x, y)
}

/// All coordinates within `radius` of the origin, in deterministic q-then-r
/// order.
pub fn hex_disk(radius: i32) -> Vec<Hex> {
    let mut out = Vec::new();
    for q in -radius..=radius {
        let r_start = (-radius).max(-q - radius);
        let r_end = radius.min(-q + radius);
        for r in r_start..=r_end {
            out.push(Hex::new(q, r));
        }
    }
    out
}

/// Facing derived from a movement vector; the q component wins when both
/// axes moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn from_delta(dq: i32, dr: i32) -> Option<Facing> {
        if dq > 0 {
            Some(Facing::Right)
        } else if dq < 0 {
            Some(Facing::Left)
        } else if dr > 0 {
            Some(Facing::Down)
        } else if dr < 0 {
            Some(Facing::Up)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_size_matches_centered_hexagonal_number() {
        for radius in 0..6 {
            let expected = 3 * radius * (radius + 1) + 1;
            assert_eq!(hex_disk(radius).len() as i32, expected);
        }
    }

    #[test]
    fn disk_has_no_duplicate_coordinates() {
        let tiles = hex_disk(5);
        let mut seen = std::collections::HashSet::new();
        for hex in &tiles {
            assert!(seen.insert(*hex));
        }
    }

    #[test]
    fn neighbors_are_all_at_distance_one() {
        let center = Hex::new(3, -2);
        for n in neighbors(center) {
            assert_eq!(hex_distance(center, n), 1);
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Hex::new(5, 0);
        let b = Hex::new(-1, 3);
        assert_eq!(hex_distance(a, b), hex_distance(b, a));
        assert_eq!(hex_distance(a, a), 0);
        assert_eq!(hex_distance(Hex::ORIGIN, Hex::new(5, 0)), 5);
        assert_eq!(hex_distance(Hex::ORIGIN, Hex::new(2, -5)), 5);
    }

    #[test]
    fn facing_prefers_q_axis() {
        assert_eq!(Facing::from_delta(1, 1), Some(Facing::Right));
        assert_eq!(Facing::from_delta(-1, -1), Some(Facing::Left));
        assert_eq!(Facing::from_delta(0, 1), Some(Facing::Down));
        assert_eq!(Facing::from_delta(0, -1), Some(Facing::Up));
        assert_eq!(Facing::from_delta(0, 0), None);
    }

    #[test]
    fn plane_projection_separates_distinct_tiles() {
        let (x0, y0) = to_plane(Hex::new(0, 0));
        let (x1, y1) = to_plane(Hex::new(1, 0));
        let (x2, y2) = to_plane(Hex::new(0, 1));
        assert!((x1 - x0).abs() > 1.0);
        assert_eq!(y1, y0);
        assert!((y2 - y0).abs() > 1.0);
        assert!((x2 - x0).abs() > 0.5);
    }
}
