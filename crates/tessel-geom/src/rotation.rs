use crate::Vec3;

/// Rotation about +Y by a whole number of quarter turns.
///
/// One turn maps `+Z` onto `+X` (`(x, y, z) -> (z, y, -x)`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QuarterTurn(u8);

impl QuarterTurn {
    pub const IDENTITY: QuarterTurn = QuarterTurn(0);

    #[inline]
    pub const fn new(turns: u8) -> Self {
        Self(turns % 4)
    }

    #[inline]
    pub const fn turns(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn inverse(self) -> Self {
        Self((4 - self.0) % 4)
    }

    #[inline]
    pub const fn then(self, next: QuarterTurn) -> Self {
        Self((self.0 + next.0) % 4)
    }

    #[inline]
    pub fn apply(self, v: Vec3) -> Vec3 {
        match self.0 {
            0 => v,
            1 => Vec3::new(v.z, v.y, -v.x),
            2 => Vec3::new(-v.x, v.y, -v.z),
            _ => Vec3::new(-v.z, v.y, v.x),
        }
    }

    #[inline]
    pub fn apply_offset(self, (x, y, z): (i32, i32, i32)) -> (i32, i32, i32) {
        match self.0 {
            0 => (x, y, z),
            1 => (z, y, -x),
            2 => (-x, y, -z),
            _ => (-z, y, x),
        }
    }
}
