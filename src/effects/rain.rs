use std::ops::RangeInclusive;

use crate::brightness::{level_for_tail_index, scale_to_level, PackedColor, BRIGHTEST_LEVEL};
use crate::effects::LightingEffect;
use crate::framestate::{lock, PixelBuffer, SharedFrame};
use crate::geometry::CanvasGeometry;
use crate::random::RandomSource;

pub const RAIN_GREEN: PackedColor = 0x00FF00;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RainParams {
    pub geometry: CanvasGeometry,
    /// Ticks a stream waits before dropping one row.
    pub speed_range: RangeInclusive<u32>,
    /// Pixels per stream, head included.
    pub length_range: RangeInclusive<u32>,
    pub color: PackedColor,
}

impl RainParams {
    pub fn board_8x8() -> RainParams {
        RainParams {
            geometry: CanvasGeometry::BOARD_8X8,
            speed_range: 3..=32,
            length_range: 4..=6,
            color: RAIN_GREEN,
        }
    }

    pub fn board_16x16() -> RainParams {
        RainParams {
            geometry: CanvasGeometry::BOARD_16X16,
            speed_range: 1..=5,
            length_range: 4..=9,
            color: RAIN_GREEN,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.geometry.validate()?;
        if self.speed_range.is_empty() || *self.speed_range.start() == 0 {
            return Err(format!("invalid speed range {:?}", self.speed_range));
        }
        if self.length_range.is_empty() || *self.length_range.start() == 0 {
            return Err(format!("invalid length range {:?}", self.length_range));
        }
        if *self.length_range.end() > self.geometry.virtual_height() as u32 {
            return Err(format!(
                "streams of up to {} pixels do not fit a canvas of {} rows",
                self.length_range.end(),
                self.geometry.virtual_height()
            ));
        }
        Ok(())
    }
}

impl Default for RainParams {
    fn default() -> Self {
        RainParams::board_8x8()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Column {
    pub descent_time_cnt: u32,
    pub descent_speed: u32,
    /// Virtual row of the leading pixel.
    pub head_position: i32,
    pub color: PackedColor,
    pub length: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
}

/// Green streams falling down every column of an LED grid.
///
/// The first [`tick`](CodeRain::tick) only sets the streams up. Every later
/// tick moves each stream whose speed counter expired down by one row and
/// repaints its column. Streams that have completely left the visible band
/// respawn with fresh random parameters above it.
pub struct CodeRain<R> {
    params: RainParams,
    random: R,
    state: EngineState,
    columns: Vec<Column>,
    pixels: PixelBuffer,
    output: SharedFrame,
}

impl<R: RandomSource> CodeRain<R> {
    /// Panics if `params` is inconsistent or `output` has the wrong size.
    pub fn new(params: RainParams, random: R, output: SharedFrame) -> CodeRain<R> {
        if let Err(err) = params.validate() {
            panic!("Invalid rain parameters: {}", err);
        }

        let pixel_count = params.geometry.pixel_count();
        assert_eq!(
            lock(&output).pixels.len(),
            pixel_count,
            "Output buffer does not match the canvas"
        );

        CodeRain {
            columns: vec![Column::default(); params.geometry.column_count],
            pixels: PixelBuffer::new(pixel_count),
            params,
            random,
            state: EngineState::Uninitialized,
            output,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn params(&self) -> &RainParams {
        &self.params
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Gives column `i` a new random speed, start row and length.
    pub fn init_column(&mut self, i: usize) {
        let upper = self.params.geometry.upper_length as u32;
        let column = &mut self.columns[i];
        column.descent_speed = self.random.next_in(&self.params.speed_range);
        column.head_position = self.random.next_below(upper) as i32;
        column.color = self.params.color;
        column.length = self.random.next_in(&self.params.length_range);
    }

    pub fn tick(&mut self) {
        match self.state {
            EngineState::Uninitialized => self.start(),
            EngineState::Running => {
                for i in 0..self.columns.len() {
                    self.advance_column(i);
                }
            }
        }

        lock(&self.output).publish(&self.pixels);
    }

    fn start(&mut self) {
        self.pixels.clear();
        for column in &mut self.columns {
            column.descent_time_cnt = 0;
            column.descent_speed = 0;
        }
        for i in 0..self.columns.len() {
            self.init_column(i);
        }

        self.state = EngineState::Running;
        log::debug!("Code rain started with {} streams", self.columns.len());
    }

    fn advance_column(&mut self, i: usize) {
        let column = &mut self.columns[i];
        column.descent_time_cnt += 1;
        if column.descent_time_cnt < column.descent_speed {
            return;
        }

        column.descent_time_cnt = 0;
        column.head_position += 1;
        self.paint_column(i);

        let column = self.columns[i];
        if column.head_position - column.length as i32 > self.params.geometry.visible_end() {
            log::trace!("Stream {} left the canvas", i);
            self.init_column(i);
        }
    }

    fn paint_column(&mut self, i: usize) {
        let geometry = self.params.geometry;
        let column = self.columns[i];

        self.pixels.fill(geometry.column_slots(i), 0);

        if let Some(offset) = geometry.visible_row_offset(column.head_position) {
            let color = scale_to_level(column.color, BRIGHTEST_LEVEL);
            self.pixels.set(geometry.slot_index(i, offset), color);
        }

        for j in 0..column.length.saturating_sub(1) as usize {
            let body_position = column.head_position - j as i32 - 1;
            if let Some(offset) = geometry.visible_row_offset(body_position) {
                let color = scale_to_level(column.color, level_for_tail_index(j));
                self.pixels.set(geometry.slot_index(i, offset), color);
            }
        }
    }
}

impl<R: RandomSource> LightingEffect for CodeRain<R> {
    fn name(&self) -> &'static str {
        "code rain"
    }

    fn step(&mut self) {
        self.tick();
    }
}
