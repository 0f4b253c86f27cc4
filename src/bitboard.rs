//! A fixed-width cell mask over linear grid indices.
//!
//! The type is `no_std` friendly and avoids heap allocations. A grid of
//! `width × height` cells is addressed row-major (`row * width + col`) and
//! packed into an unsigned integer `T`, so the grid may hold at most
//! `T::BITS` cells. The geometry lives in [`crate::Grid`]; the mask only
//! knows indices.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested number of cells exceeds the capacity of `T::BITS`.
    SizeTooLarge { cells: usize, capacity: usize },
    /// Cell index is out of bounds `[0..T::BITS)`.
    IndexOutOfBounds { index: usize },
}

impl core::fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { cells, capacity } => {
                write!(f, "SizeTooLarge: cells={} exceeds T::BITS={}", cells, capacity)
            }
            BitBoardError::IndexOutOfBounds { index } => {
                write!(f, "IndexOutOfBounds: index={}", index)
            }
        }
    }
}

/// A set of cell indices stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T> BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Number of cells representable by `T`.
    #[inline]
    pub fn capacity() -> usize {
        mem::size_of::<T>() * 8
    }

    /// Create a new empty mask.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if `cells` exceeds
    /// the capacity of `T`.
    pub fn try_new(cells: usize) -> Result<Self, BitBoardError> {
        let capacity = Self::capacity();
        if cells > capacity {
            Err(BitBoardError::SizeTooLarge { cells, capacity })
        } else {
            Ok(BitBoard { bits: T::zero() })
        }
    }

    /// Mask with the lowest `cells` indices set.
    pub fn full(cells: usize) -> Result<Self, BitBoardError> {
        Self::try_new(cells)?;
        let bits = if cells == Self::capacity() {
            !T::zero()
        } else {
            (T::one() << cells) - T::one()
        };
        Ok(BitBoard { bits })
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns true if no bits are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Gets the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool, BitBoardError> {
        self.check_bounds(index)?;
        Ok(self.contains(index))
    }

    /// Sets the bit at `index`.
    pub fn set(&mut self, index: usize) -> Result<(), BitBoardError> {
        self.check_bounds(index)?;
        self.bits = self.bits | (T::one() << index);
        Ok(())
    }

    /// Clears the bit at `index`.
    pub fn clear(&mut self, index: usize) -> Result<(), BitBoardError> {
        self.check_bounds(index)?;
        self.bits = self.bits & !(T::one() << index);
        Ok(())
    }

    /// True if `index` is set. Indices past the capacity are never set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < Self::capacity() && ((self.bits >> index) & T::one()) != T::zero()
    }

    /// True if the two masks share at least one cell.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.bits & other.bits).is_zero()
    }

    /// Cells of `self` that are not in `other`.
    #[inline]
    pub fn without(self, other: Self) -> Self {
        BitBoard {
            bits: self.bits & !other.bits,
        }
    }

    #[inline]
    fn check_bounds(&self, index: usize) -> Result<(), BitBoardError> {
        if index >= Self::capacity() {
            Err(BitBoardError::IndexOutOfBounds { index })
        } else {
            Ok(())
        }
    }

    /// Consumes the mask and returns the raw integer.
    #[inline]
    pub fn into_raw(self) -> T {
        self.bits
    }

    /// Creates a mask from the raw integer.
    #[inline]
    pub fn from_raw(raw: T) -> Self {
        BitBoard { bits: raw }
    }

    /// Creates a mask from an iterator over cell indices.
    pub fn from_indices<I>(iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut board = Self::new();
        for index in iter {
            board.set(index)?;
        }
        Ok(board)
    }

    /// Iterator over the set indices in ascending order.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<T> {
        SetBits { bits: self.bits }
    }
}

impl<T> Default for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBoard<{}>", any::type_name::<T>())?;
        f.debug_set().entries(self.iter_set_bits()).finish()
    }
}

/// Iterator over the set bits of a mask.
#[derive(Clone, Copy)]
pub struct SetBits<T>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T> Iterator for SetBits<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = usize;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits.is_zero() {
            return None;
        }
        let idx = self.bits.trailing_zeros() as usize;
        self.bits = self.bits & (self.bits - T::one());
        Some(idx)
    }
}

impl<T> BitAnd for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits & rhs.bits)
    }
}

impl<T> BitOr for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits | rhs.bits)
    }
}

impl<T> BitXor for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        BitBoard::from_raw(self.bits ^ rhs.bits)
    }
}

impl<T> BitAndAssign for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits = self.bits & rhs.bits;
    }
}

impl<T> BitOrAssign for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}

impl<T> BitXorAssign for BitBoard<T>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.bits = self.bits ^ rhs.bits;
    }
}

/// Mask type used by the engine; grids hold at most 128 cells.
pub type CellMask = BitBoard<u128>;
