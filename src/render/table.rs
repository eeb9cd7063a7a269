//! Per-table layout state.
//!
//! Only one table is laid out at a time: the head resets the column widths,
//! body rows read them back by column index.

/// Column widths, the current column and row shading for the active table.
#[derive(Debug, Default, Clone)]
pub struct TableLayout {
    cell_widths: Vec<f64>,
    current_column: usize,
    fill_alternate: bool,
    cell_text: String,
}

impl TableLayout {
    /// A new table starts with unshaded body rows.
    pub const fn start_table(&mut self) {
        self.fill_alternate = false;
    }

    /// The header row defines the columns afresh.
    pub fn start_head(&mut self) {
        self.cell_widths.clear();
    }

    pub const fn start_row(&mut self) {
        self.current_column = 0;
    }

    pub fn start_cell(&mut self) {
        self.cell_text.clear();
    }

    /// Append a text run to the cell being built.
    pub fn push_text(&mut self, text: &str) {
        self.cell_text.push_str(text);
    }

    /// Take the accumulated text of the current cell.
    pub fn take_cell_text(&mut self) -> String {
        std::mem::take(&mut self.cell_text)
    }

    pub fn record_width(&mut self, width: f64) {
        self.cell_widths.push(width);
    }

    /// Width recorded by the header for the current column, if the header
    /// had that many cells.
    pub fn current_width(&self) -> Option<f64> {
        self.cell_widths.get(self.current_column).copied()
    }

    pub const fn finish_cell(&mut self) {
        self.current_column += 1;
    }

    pub const fn finish_row(&mut self) {
        self.fill_alternate = !self.fill_alternate;
    }

    pub const fn current_column(&self) -> usize {
        self.current_column
    }

    pub const fn fill(&self) -> bool {
        self.fill_alternate
    }

    pub fn total_width(&self) -> f64 {
        self.cell_widths.iter().sum()
    }
}
