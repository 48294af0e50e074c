//! Fixed character grid holding the rendered page text.

/// `columns` x `rows` grid of characters, space-filled.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScreenBuffer {
    columns: usize,
    rows: usize,
    cells: Vec<char>,
}

impl ScreenBuffer {
    pub fn new(
        columns: usize,
        rows: usize,
    ) -> Self {
        Self {
            columns,
            rows,
            cells: vec![' '; columns * rows],
        }
    }

    #[inline]
    pub const fn columns(&self) -> usize { self.columns }

    #[inline]
    pub const fn rows(&self) -> usize { self.rows }

    pub fn clear(&mut self) { self.cells.fill(' '); }

    /// Replace the contents with `text`, one line per row.
    ///
    /// Lines past the last row and characters past the last column are
    /// dropped. Tabs and other control characters are kept as is; the
    /// compositor decides what it can draw.
    pub fn fill_from_text(
        &mut self,
        text: &str,
    ) {
        self.clear();
        for (row, line) in text.lines().take(self.rows).enumerate() {
            let start = row * self.columns;
            for (col, c) in line.chars().take(self.columns).enumerate() {
                self.cells[start + col] = c;
            }
        }
    }

    /// Character at a cell, `None` outside the grid.
    pub fn get(
        &self,
        column: usize,
        row: usize,
    ) -> Option<char> {
        if column < self.columns && row < self.rows {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }

    /// One row of cells.
    pub fn line(
        &self,
        row: usize,
    ) -> &[char] {
        if row < self.rows {
            &self.cells[row * self.columns..(row + 1) * self.columns]
        } else {
            &[]
        }
    }

    /// Rows joined with `\n`, trailing spaces trimmed.
    pub fn as_text(&self) -> String {
        (0..self.rows)
            .map(|row| self.line(row).iter().collect::<String>().trim_end().to_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate `(column, row, char)` over every cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (i % self.columns.max(1), i / self.columns.max(1), *c))
    }
}
