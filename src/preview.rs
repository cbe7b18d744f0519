use std::io::{stdout, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};

use crate::brightness::{unpack, PackedColor};
use crate::display::FrameSink;
use crate::geometry::CanvasGeometry;

const LED: &str = "● ";

/// Draws frames as a grid of colored dots in the terminal.
pub struct TerminalPreview {
    stdout: Stdout,
    geometry: CanvasGeometry,
    active: bool,
}

impl TerminalPreview {
    pub fn new(geometry: CanvasGeometry) -> Result<Self, String> {
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )
        .map_err(|err| format!("Cannot prepare terminal: {}", err))?;

        Ok(TerminalPreview {
            stdout: out,
            geometry,
            active: true,
        })
    }

    fn draw(&mut self, pixels: &[PackedColor]) -> std::io::Result<()> {
        for row in 0..self.geometry.middle_length {
            queue!(self.stdout, cursor::MoveTo(0, row as u16))?;
            for column in 0..self.geometry.column_count {
                let color = led_color(pixels[self.geometry.slot_index(column, row)]);
                queue!(self.stdout, SetForegroundColor(color), Print(LED))?;
            }
        }
        queue!(self.stdout, ResetColor)?;
        self.stdout.flush()
    }
}

/// Unlit LEDs stay faintly visible so the grid keeps its shape.
fn led_color(color: PackedColor) -> Color {
    if color == 0 {
        return Color::Rgb {
            r: 0x20,
            g: 0x20,
            b: 0x20,
        };
    }
    let rgb = unpack(color);
    Color::Rgb {
        r: rgb.red,
        g: rgb.green,
        b: rgb.blue,
    }
}

impl FrameSink for TerminalPreview {
    fn name(&self) -> &'static str {
        "terminal preview"
    }

    fn show(&mut self, pixels: &[PackedColor]) -> Result<(), String> {
        if pixels.len() != self.geometry.pixel_count() {
            return Err(format!(
                "expected {} pixels, got {}",
                self.geometry.pixel_count(),
                pixels.len()
            ));
        }
        self.draw(pixels).map_err(|err| err.to_string())
    }

    fn close(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(err) = execute!(
            self.stdout,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        ) {
            log::error!("Cannot restore terminal: {}", err);
        }
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        self.close();
    }
}
