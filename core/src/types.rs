/// Single coordinate axis used for grid width, height, and column/row positions.
pub type Coord = u32;

/// Count type used for revealed-cell counts, thresholds, and total-cell counts.
pub type CellCount = u32;

/// Row-major position of a cell inside the grid, `row * columns + column`.
pub type CellIndex = u32;

/// Two-dimensional coordinates `(column, row)`.
pub type Coord2 = (Coord, Coord);

/// Multiplies two axis lengths, `None` when the product does not fit a [`CellCount`].
pub const fn checked_mult(a: Coord, b: Coord) -> Option<CellCount> {
    a.checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_mult_reports_overflow() {
        assert_eq!(checked_mult(55, 32), Some(1760));
        assert_eq!(checked_mult(Coord::MAX, 2), None);
    }
}
