use std::num::NonZero;

use ndarray::Ix;

pub(crate) type Coord = usize;
pub(crate) type Dimension = NonZero<Coord>;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A location `(x, y)` on a board. The top left corner is `Location(0, 0)`.
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    pub(crate) fn offset_by(self, rhs: (isize, isize)) -> Self {
        Self(self.0.wrapping_add_signed(rhs.0), self.1.wrapping_add_signed(rhs.1))
    }

    /// The location of flat, row-major cell `index` on a board `size` cells wide.
    pub fn from_flat(index: usize, size: Dimension) -> Self {
        Self(index % size.get(), index / size.get())
    }

    /// The flat, row-major index of this location, or [`None`] if it lies off a `size` by `size` board.
    pub fn to_flat(self, size: Dimension) -> Option<usize> {
        if self.0 < size.get() && self.1 < size.get() {
            Some(self.1 * size.get() + self.0)
        } else {
            None
        }
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}
