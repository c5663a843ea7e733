use std::collections::TryReserveError;

/// A triangular 2-D array stored as one flat arena.
///
/// Row `r` holds exactly `base_count - r` slots, and there are at most
/// `base_count` rows. All slots live in a single `Vec<T>` in row-major
/// order, so the shape can only change through [`TriangleArray::resize`]
/// and rows cannot grow independently.
///
/// ```text
///       X
///      X X
///     X X X      base_count = 3, rows = 3, len = 6
/// ```
#[derive(Clone, Debug, Default)]
pub struct TriangleArray<T> {
    /// Slots of all rows, row 0 first.
    items: Vec<T>,
    base_count: usize,
    row_count: usize,
    /// Number of times the arena was actually re-shaped.
    reallocations: usize,
}

/// Number of slots in the first `rows` rows of a triangle with `base` items
/// at the bottom.
#[inline]
fn slots_before(base: usize, rows: usize) -> usize {
    rows * base - (rows * rows - rows) / 2
}

impl<T: Clone + Default> TriangleArray<T> {
    /// Creates an empty array with no rows.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            base_count: 0,
            row_count: 0,
            reallocations: 0,
        }
    }

    /// Re-shapes the array to `min(base_count, row_count)` rows.
    ///
    /// If the shape is unchanged this is a no-op and the existing slots are
    /// kept. Otherwise every slot is reset to `T::default()`.
    ///
    /// ### Parameters
    /// - `base_count` - Number of items in row 0.
    /// - `row_count` - Requested number of rows; clamped to `base_count`.
    ///
    /// ### Returns
    /// `Err` if the arena could not grow. The array is then left empty.
    pub fn resize(&mut self, base_count: usize, row_count: usize) -> Result<(), TryReserveError> {
        let rows = base_count.min(row_count);
        if self.base_count == base_count && self.row_count == rows {
            return Ok(());
        }

        let len = slots_before(base_count, rows);
        self.items.clear();
        self.base_count = 0;
        self.row_count = 0;
        self.items.try_reserve_exact(len)?;
        self.items.resize(len, T::default());

        self.base_count = base_count;
        self.row_count = rows;
        self.reallocations += 1;
        Ok(())
    }

    /// Number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Items in the bottom row.
    #[inline]
    pub fn base_count(&self) -> usize {
        self.base_count
    }

    /// Number of slots in `row`, or `0` past the top row.
    #[inline]
    pub fn row_len(&self, row: usize) -> usize {
        if row < self.row_count {
            self.base_count - row
        } else {
            0
        }
    }

    /// Total number of slots across all rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the slots of `row`.
    ///
    /// ### Panics
    /// Panics if `row >= self.row_count()`.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.row_count, "row {row} out of range");
        let start = slots_before(self.base_count, row);
        &self.items[start..start + self.base_count - row]
    }

    /// Mutable access to the slots of `row`.
    ///
    /// ### Panics
    /// Panics if `row >= self.row_count()`.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.row_count, "row {row} out of range");
        let start = slots_before(self.base_count, row);
        &mut self.items[start..start + self.base_count - row]
    }

    /// Returns the slot at (`row`, `item`), if it exists.
    pub fn get(&self, row: usize, item: usize) -> Option<&T> {
        if item < self.row_len(row) {
            self.items.get(slots_before(self.base_count, row) + item)
        } else {
            None
        }
    }

    /// Iterates over the rows from the bottom up.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.row_count).map(move |r| self.row(r))
    }

    /// Iterates over all slots in row-major, then item-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// How many times [`Self::resize`] actually changed the shape.
    #[inline]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_array_has_no_rows() {
        let arr: TriangleArray<u32> = TriangleArray::new();
        assert_eq!(arr.row_count(), 0);
        assert!(arr.is_empty());
        assert_eq!(arr.rows().count(), 0);
    }

    #[test]
    fn rows_shrink_by_one_each_level() {
        for base in 1..=7 {
            for rows in 0..=9 {
                let mut arr: TriangleArray<u8> = TriangleArray::new();
                arr.resize(base, rows).unwrap();

                assert_eq!(arr.row_count(), base.min(rows));
                for (r, row) in arr.rows().enumerate() {
                    assert_eq!(row.len(), base - r, "base={base} rows={rows} r={r}");
                }
            }
        }
    }

    #[test]
    fn full_triangle_holds_gauss_sum_items() {
        let mut arr: TriangleArray<u8> = TriangleArray::new();
        arr.resize(5, 5).unwrap();
        assert_eq!(arr.len(), 15);

        arr.resize(5, 2).unwrap();
        assert_eq!(arr.len(), 9);
    }

    #[test]
    fn resize_with_same_shape_keeps_contents() {
        let mut arr: TriangleArray<u32> = TriangleArray::new();
        arr.resize(3, 3).unwrap();
        arr.row_mut(1)[0] = 42;

        // Requesting more rows than the base allows is the same shape.
        arr.resize(3, 8).unwrap();

        assert_eq!(arr.reallocations(), 1);
        assert_eq!(arr.get(1, 0), Some(&42));
    }

    #[test]
    fn resize_to_new_shape_resets_slots() {
        let mut arr: TriangleArray<u32> = TriangleArray::new();
        arr.resize(3, 3).unwrap();
        arr.row_mut(0)[2] = 9;

        arr.resize(4, 2).unwrap();

        assert_eq!(arr.reallocations(), 2);
        assert_eq!(arr.row_count(), 2);
        assert!(arr.iter().all(|&v| v == 0));
    }

    #[test]
    fn rows_are_laid_out_row_major() {
        let mut arr: TriangleArray<(usize, usize)> = TriangleArray::new();
        arr.resize(3, 3).unwrap();
        for r in 0..arr.row_count() {
            for (i, slot) in arr.row_mut(r).iter_mut().enumerate() {
                *slot = (r, i);
            }
        }

        let flat: Vec<_> = arr.iter().copied().collect();
        assert_eq!(flat, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn get_rejects_slots_outside_the_triangle() {
        let mut arr: TriangleArray<u8> = TriangleArray::new();
        arr.resize(3, 3).unwrap();

        assert!(arr.get(2, 0).is_some());
        assert!(arr.get(2, 1).is_none());
        assert!(arr.get(3, 0).is_none());
    }

    #[test]
    fn failed_resize_leaves_array_empty() {
        let mut arr: TriangleArray<u64> = TriangleArray::new();
        arr.resize(2, 2).unwrap();

        assert!(arr.resize(usize::MAX / 4, 1).is_err());
        assert!(arr.is_empty());
        assert_eq!(arr.row_count(), 0);
    }
}
