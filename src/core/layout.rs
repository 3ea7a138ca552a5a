use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("grid needs at least one column")]
    NoColumns,
    #[error("cell size {width}x{height} has zero area")]
    EmptyCell { width: u32, height: u32 },
    #[error("canvas size overflows u32")]
    Overflow,
}

/// Row-major grid of equally sized cells separated by a fixed padding.
///
/// Every cell shares one width and height; images larger than the cell
/// simply overlap their neighbours' padding when composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub padding: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridLayout {
    /// Lay out `total` cells; the row count rounds up so a partial last row still fits.
    pub fn for_total(
        total: usize,
        columns: u32,
        padding: u32,
        cell_width: u32,
        cell_height: u32,
    ) -> Result<Self, LayoutError> {
        if columns == 0 {
            return Err(LayoutError::NoColumns);
        }
        if cell_width == 0 || cell_height == 0 {
            return Err(LayoutError::EmptyCell {
                width: cell_width,
                height: cell_height,
            });
        }
        let rows = u32::try_from(total.div_ceil(columns as usize))
            .map_err(|_| LayoutError::Overflow)?;
        let layout = Self {
            columns,
            rows,
            padding,
            cell_width,
            cell_height,
        };
        layout.checked_canvas_size().ok_or(LayoutError::Overflow)?;
        Ok(layout)
    }

    pub fn pitch_x(&self) -> u32 {
        self.cell_width + self.padding
    }

    pub fn pitch_y(&self) -> u32 {
        self.cell_height + self.padding
    }

    /// `(row, column)` of the cell at `idx`.
    pub fn position(&self, idx: usize) -> (u32, u32) {
        let cols = self.columns as usize;
        ((idx / cols) as u32, (idx % cols) as u32)
    }

    /// Top-left pixel of the cell at `idx`.
    pub fn cell_origin(&self, idx: usize) -> (u32, u32) {
        let (row, col) = self.position(idx);
        (col * self.pitch_x(), row * self.pitch_y())
    }

    /// Canvas size; the trailing padding after the last row and column is dropped.
    pub fn canvas_size(&self) -> (u32, u32) {
        // for_total already proved this fits
        self.checked_canvas_size().unwrap_or((0, 0))
    }

    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    fn checked_canvas_size(&self) -> Option<(u32, u32)> {
        let width = self.columns.checked_mul(self.cell_width.checked_add(self.padding)?)?;
        let height = self.rows.checked_mul(self.cell_height.checked_add(self.padding)?)?;
        Some((
            width.saturating_sub(self.padding),
            height.saturating_sub(self.padding),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ten_by_ten(w: u32, h: u32) -> GridLayout {
        GridLayout::for_total(100, 10, 10, w, h).unwrap()
    }

    #[test]
    fn positions_are_row_major() {
        let grid = ten_by_ten(50, 20);
        assert_eq!(grid.position(0), (0, 0));
        assert_eq!(grid.position(9), (0, 9));
        assert_eq!(grid.position(10), (1, 0));
        assert_eq!(grid.position(42), (4, 2));
        assert_eq!(grid.position(99), (9, 9));
    }

    #[test]
    fn origins_step_by_cell_plus_padding() {
        let grid = ten_by_ten(50, 20);
        assert_eq!(grid.cell_origin(0), (0, 0));
        assert_eq!(grid.cell_origin(1), (60, 0));
        assert_eq!(grid.cell_origin(10), (0, 30));
        assert_eq!(grid.cell_origin(99), (540, 270));
    }

    #[test]
    fn canvas_drops_trailing_padding() {
        for (w, h) in [(1, 1), (50, 20), (543, 281)] {
            let grid = ten_by_ten(w, h);
            assert_eq!(grid.rows, 10);
            assert_eq!(grid.canvas_size(), (10 * w + 90, 10 * h + 90));
        }
    }

    #[test]
    fn rows_round_up_for_partial_last_row() {
        let grid = GridLayout::for_total(21, 10, 10, 5, 5).unwrap();
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.capacity(), 30);
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        assert_eq!(
            GridLayout::for_total(100, 10, 10, 0, 0),
            Err(LayoutError::EmptyCell {
                width: 0,
                height: 0
            })
        );
        assert_eq!(
            GridLayout::for_total(100, 0, 10, 5, 5),
            Err(LayoutError::NoColumns)
        );
        assert_eq!(
            GridLayout::for_total(100, 10, 10, u32::MAX, 5),
            Err(LayoutError::Overflow)
        );
    }
}
