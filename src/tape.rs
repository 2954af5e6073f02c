use crate::error::BuildError;

/// Number of cells a tape gets unless the caller asks otherwise.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// A fixed-length circular strip of byte cells with a single cursor.
///
/// Cells start at zero. The cursor wraps at both ends and cell arithmetic
/// wraps modulo 256, so no tape operation can fail once the tape exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Allocate `len` zeroed cells. A zero-length tape is rejected.
    pub fn new(len: usize) -> Result<Self, BuildError> {
        if len == 0 {
            return Err(BuildError::InvalidTapeLength { len });
        }
        Ok(Self {
            cells: vec![0; len],
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a tape has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Value under the cursor.
    pub fn get(&self) -> u8 {
        self.cells[self.cursor]
    }

    /// Overwrite the value under the cursor.
    pub fn set(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    /// `>`: past the last cell the cursor comes back to 0.
    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1) % self.cells.len();
    }

    /// `<`: before cell 0 the cursor goes to the last cell.
    pub fn move_left(&mut self) {
        self.cursor = match self.cursor {
            0 => self.cells.len() - 1,
            n => n - 1,
        };
    }

    pub fn increment(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_sub(1);
    }

    /// Page-aligned view of `size` cells containing the cursor.
    ///
    /// Returns the index of the first cell shown and the slice itself; the
    /// last page may be shorter than `size`.
    pub fn window(&self, size: usize) -> (usize, &[u8]) {
        let size = size.max(1);
        let base = self.cursor - self.cursor % size;
        let end = (base + size).min(self.cells.len());
        (base, &self.cells[base..end])
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self {
            cells: vec![0; DEFAULT_TAPE_LEN],
            cursor: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_rejected() {
        assert_eq!(Tape::new(0), Err(BuildError::InvalidTapeLength { len: 0 }));
    }

    #[test]
    fn default_tape_is_zeroed() {
        let tape = Tape::default();
        assert_eq!(tape.len(), DEFAULT_TAPE_LEN);
        assert!(tape.cells().iter().all(|&c| c == 0));
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn left_from_zero_wraps_to_last_cell() {
        let mut tape = Tape::new(10).unwrap();
        tape.move_left();
        assert_eq!(tape.cursor(), 9);
    }

    #[test]
    fn right_from_last_cell_wraps_to_zero() {
        let mut tape = Tape::new(3).unwrap();
        tape.move_right();
        tape.move_right();
        assert_eq!(tape.cursor(), 2);
        tape.move_right();
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn single_cell_tape_stays_put() {
        let mut tape = Tape::new(1).unwrap();
        tape.move_right();
        assert_eq!(tape.cursor(), 0);
        tape.move_left();
        assert_eq!(tape.cursor(), 0);
    }

    #[test]
    fn cell_arithmetic_wraps() {
        let mut tape = Tape::new(1).unwrap();
        tape.decrement();
        assert_eq!(tape.get(), 255);
        tape.increment();
        assert_eq!(tape.get(), 0);

        for _ in 0..255 {
            tape.increment();
        }
        assert_eq!(tape.get(), 255);
        tape.increment();
        assert_eq!(tape.get(), 0);
    }

    #[test]
    fn window_is_page_aligned() {
        let mut tape = Tape::new(20).unwrap();
        for _ in 0..13 {
            tape.move_right();
        }
        tape.set(7);
        let (base, cells) = tape.window(8);
        assert_eq!(base, 8);
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[5], 7);

        for _ in 0..5 {
            tape.move_right();
        }
        let (base, cells) = tape.window(8);
        assert_eq!(base, 16);
        assert_eq!(cells.len(), 4);
    }
}
