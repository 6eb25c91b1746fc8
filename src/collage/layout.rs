//! Pure grid arithmetic for the collage.
//!
//! All functions here are pure and testable without any I/O or images.

/// Columns and rows of a collage grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
}

impl GridLayout {
    /// Square-ish grid that fits `n` cells: `cols = ceil(sqrt(n))`,
    /// `rows = ceil(n / cols)`.
    ///
    /// # Examples
    /// ```
    /// # use photo_batch::collage::GridLayout;
    /// assert_eq!(GridLayout::for_count(5), GridLayout { cols: 3, rows: 2 });
    /// assert_eq!(GridLayout::for_count(9), GridLayout { cols: 3, rows: 3 });
    /// ```
    pub fn for_count(n: usize) -> Self {
        if n == 0 {
            return Self { cols: 0, rows: 0 };
        }
        let cols = ceil_sqrt(n);
        let rows = n.div_ceil(cols);
        Self {
            cols: cols as u32,
            rows: rows as u32,
        }
    }

    /// Column and row of the `i`-th cell, filled row by row.
    pub fn position(&self, i: usize) -> (u32, u32) {
        let cols = self.cols.max(1) as usize;
        ((i % cols) as u32, (i / cols) as u32)
    }
}

/// Smallest `c` with `c * c >= n`, in integer arithmetic.
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt() as usize;
    while c * c < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c
}

/// Pixel geometry of a laid-out collage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub layout: GridLayout,
    pub cell: u32,
    pub padding: u32,
}

impl Geometry {
    pub fn new(count: usize, cell: u32, padding: u32) -> Self {
        Self {
            layout: GridLayout::for_count(count),
            cell,
            padding,
        }
    }

    fn span(&self, cells: u32) -> u64 {
        cells as u64 * (self.cell as u64 + self.padding as u64) + self.padding as u64
    }

    /// Canvas `(width, height)`: `n * (cell + padding) + padding` per axis.
    ///
    /// `u64` so absurd cell sizes are detected rather than wrapped.
    pub fn canvas_size(&self) -> (u64, u64) {
        (self.span(self.layout.cols), self.span(self.layout.rows))
    }

    /// Top-left pixel of the `i`-th cell.
    pub fn cell_origin(&self, i: usize) -> (u32, u32) {
        let (c, r) = self.layout.position(i);
        let step = self.cell + self.padding;
        (self.padding + c * step, self.padding + r * step)
    }
}
