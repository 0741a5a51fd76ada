use std::{fmt, ops};

/// A 32-bit TCP sequence number.
///
/// Sequence numbers live on a ring of size 2<sup>32</sup> measured from a
/// connection's initial sequence number (the zero point). Internally the
/// engines count in 64-bit absolute offsets that never wrap; this type
/// converts between the two.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct Wrap32(u32);

impl Wrap32 {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// A random sequence number, used as an initial sequence number.
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub const fn raw_value(self) -> u32 {
        self.0
    }

    /// The sequence number of absolute offset `n` relative to `zero_point`.
    pub fn wrap(n: u64, zero_point: Wrap32) -> Self {
        // Truncation to the low 32 bits is the modulus
        zero_point + n as u32
    }

    /// The absolute offset this sequence number stands for, picking the
    /// candidate closest to `checkpoint`.
    ///
    /// On an exact tie the smaller candidate wins, unless it would be below
    /// zero.
    pub fn unwrap(self, zero_point: Wrap32, checkpoint: u64) -> u64 {
        let offset = self.0.wrapping_sub(zero_point.0);
        let checkpoint_low = checkpoint as u32;
        let up = u64::from(offset.wrapping_sub(checkpoint_low));
        let down = u64::from(checkpoint_low.wrapping_sub(offset));

        match (checkpoint.checked_sub(down), checkpoint.checked_add(up)) {
            (Some(_), Some(above)) if up < down => above,
            (Some(below), _) => below,
            // Below zero only while checkpoint < 2^32, where adding `up` cannot overflow
            (None, _) => checkpoint + up,
        }
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ops::Add<u32> for Wrap32 {
    type Output = Wrap32;

    fn add(self, rhs: u32) -> Wrap32 {
        Wrap32(self.0.wrapping_add(rhs))
    }
}

impl ops::AddAssign<u32> for Wrap32 {
    fn add_assign(&mut self, rhs: u32) {
        *self = *self + rhs;
    }
}

impl From<u32> for Wrap32 {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
