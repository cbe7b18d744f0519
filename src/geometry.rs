/// Rows above the visible band. Streams spawn in here and slide into view.
pub const UPPER_LENGTH: usize = 5;
pub const MIDDLE_LENGTH: usize = 8;
pub const LOWER_LENGTH: usize = 5;
pub const COLUMN_COUNT: usize = 8;
pub const ROWS_PER_COLUMN: usize = 8;

const _: () = assert!(MIDDLE_LENGTH <= ROWS_PER_COLUMN);

/// Layout of the virtual canvas a rain effect is simulated on.
///
/// The canvas is split into three stacked bands. Only rows inside
/// `[upper_length, upper_length + middle_length)` map onto LEDs; the upper and
/// lower bands are off-screen travel distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasGeometry {
    pub upper_length: usize,
    pub middle_length: usize,
    pub lower_length: usize,
    pub column_count: usize,
    pub rows_per_column: usize,
}

impl CanvasGeometry {
    pub const BOARD_8X8: CanvasGeometry = CanvasGeometry {
        upper_length: UPPER_LENGTH,
        middle_length: MIDDLE_LENGTH,
        lower_length: LOWER_LENGTH,
        column_count: COLUMN_COUNT,
        rows_per_column: ROWS_PER_COLUMN,
    };

    pub const BOARD_16X16: CanvasGeometry = CanvasGeometry {
        upper_length: 9,
        middle_length: 16,
        lower_length: 9,
        column_count: 16,
        rows_per_column: 16,
    };

    pub fn validate(&self) -> Result<(), String> {
        if self.column_count == 0 {
            return Err("column count must be at least 1".to_string());
        }
        if self.upper_length == 0 {
            return Err("upper band must be at least one row high".to_string());
        }
        if self.middle_length == 0 {
            return Err("visible band must be at least one row high".to_string());
        }
        if self.middle_length > self.rows_per_column {
            return Err(format!(
                "visible band of {} rows does not fit into {} slots per column",
                self.middle_length, self.rows_per_column
            ));
        }
        if self.upper_length + self.middle_length + self.lower_length > i32::MAX as usize {
            return Err("canvas is too tall".to_string());
        }
        Ok(())
    }

    pub fn pixel_count(&self) -> usize {
        self.column_count * self.rows_per_column
    }

    pub fn visible_end(&self) -> i32 {
        (self.upper_length + self.middle_length) as i32
    }

    pub fn virtual_height(&self) -> usize {
        self.upper_length + self.middle_length + self.lower_length
    }

    pub fn visible_row_offset(&self, virtual_row: i32) -> Option<usize> {
        let upper = self.upper_length as i32;
        if virtual_row < upper || virtual_row >= self.visible_end() {
            return None;
        }
        Some((virtual_row - upper) as usize)
    }

    /// Columns are packed right to left, so column 0 owns the last block.
    pub fn column_slots(&self, column: usize) -> std::ops::Range<usize> {
        let end = (self.column_count - column) * self.rows_per_column;
        end - self.rows_per_column..end
    }

    /// Buffer slot of the pixel `row_offset` rows below the top of the visible
    /// band in `column`. Rows are stored bottom-up within a column block.
    pub fn slot_index(&self, column: usize, row_offset: usize) -> usize {
        debug_assert!(column < self.column_count);
        debug_assert!(row_offset < self.rows_per_column);
        self.column_slots(column).end - 1 - row_offset
    }
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        CanvasGeometry::BOARD_8X8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(CanvasGeometry::BOARD_8X8.validate().is_ok());
        assert!(CanvasGeometry::BOARD_16X16.validate().is_ok());
    }

    #[test]
    fn rejects_visible_band_taller_than_column() {
        let geometry = CanvasGeometry {
            middle_length: 9,
            ..CanvasGeometry::BOARD_8X8
        };
        let err = geometry.validate().unwrap_err();
        assert!(err.contains("does not fit"), "{}", err);
    }

    #[test]
    fn rejects_empty_canvas() {
        let no_columns = CanvasGeometry {
            column_count: 0,
            ..CanvasGeometry::BOARD_8X8
        };
        assert!(no_columns.validate().is_err());

        let no_upper = CanvasGeometry {
            upper_length: 0,
            ..CanvasGeometry::BOARD_8X8
        };
        assert!(no_upper.validate().is_err());
    }

    #[test]
    fn visible_row_offset_boundaries() {
        let geometry = CanvasGeometry::BOARD_8X8;
        assert_eq!(geometry.visible_row_offset(-3), None);
        assert_eq!(geometry.visible_row_offset(4), None);
        assert_eq!(geometry.visible_row_offset(5), Some(0));
        assert_eq!(geometry.visible_row_offset(12), Some(7));
        assert_eq!(geometry.visible_row_offset(13), None);
    }

    #[test]
    fn column_blocks_are_disjoint_and_cover_buffer() {
        let geometry = CanvasGeometry::BOARD_8X8;
        let mut seen = vec![false; geometry.pixel_count()];
        for column in 0..geometry.column_count {
            for offset in 0..geometry.rows_per_column {
                let slot = geometry.slot_index(column, offset);
                assert!(geometry.column_slots(column).contains(&slot));
                assert!(!seen[slot], "slot {} used twice", slot);
                seen[slot] = true;
            }
        }
        assert!(seen.iter().all(|v| *v));
    }

    #[test]
    fn slots_are_packed_in_reverse() {
        let geometry = CanvasGeometry::BOARD_8X8;
        assert_eq!(geometry.column_slots(0), 56..64);
        assert_eq!(geometry.column_slots(7), 0..8);
        assert_eq!(geometry.slot_index(0, 0), 63);
        assert_eq!(geometry.slot_index(0, 7), 56);
        assert_eq!(geometry.slot_index(7, 0), 7);
    }

    #[test]
    fn slot_index_covers_each_block_once() {
        let geometry = CanvasGeometry::BOARD_16X16;
        let mut seen = vec![false; geometry.pixel_count()];
        for column in 0..geometry.column_count {
            for offset in 0..geometry.rows_per_column {
                let slot = geometry.slot_index(column, offset);
                assert!(geometry.column_slots(column).contains(&slot));
                assert!(!seen[slot], "slot {} used twice", slot);
                seen[slot] = true;
            }
        }
        assert!(seen.iter().all(|&used| used));
    }
}
