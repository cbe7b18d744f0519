use std::sync::{Arc, Mutex};

use crate::brightness::{apply_master_brightness, PackedColor};
use crate::framestate::{lock, PixelBuffer, SharedFrame};
use crate::intervaltimer::IntervalTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayOptions {
    pub enabled: bool,
    pub brightness: u8,
}

pub type SharedOptions = Arc<Mutex<DisplayOptions>>;

impl DisplayOptions {
    pub fn new(brightness: u8) -> DisplayOptions {
        DisplayOptions {
            enabled: true,
            brightness: brightness.min(100),
        }
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions::new(90)
    }
}

pub trait FrameSink {
    fn name(&self) -> &'static str;

    fn show(&mut self, pixels: &[PackedColor]) -> Result<(), String>;

    fn close(&mut self) {}
}

/// Copies the published frame to every sink at a fixed rate.
pub struct DisplayRefresh {
    frame: SharedFrame,
    options: SharedOptions,
    sinks: Vec<Box<dyn FrameSink + Send>>,
    refresh_hz: f32,
    pixels: PixelBuffer,
    shown: Vec<PackedColor>,
}

impl DisplayRefresh {
    pub fn new(
        frame: SharedFrame,
        options: SharedOptions,
        sinks: Vec<Box<dyn FrameSink + Send>>,
        refresh_hz: f32,
    ) -> DisplayRefresh {
        let pixel_count = lock(&frame).pixels.len();
        DisplayRefresh {
            frame,
            options,
            sinks,
            refresh_hz,
            pixels: PixelBuffer::new(pixel_count),
            shown: vec![0; pixel_count],
        }
    }

    pub fn run(&mut self) {
        let names: Vec<&str> = self.sinks.iter().map(|s| s.name()).collect();
        log::info!("Refreshing {:?} at {} Hz", names, self.refresh_hz);

        let mut timer = IntervalTimer::new(self.refresh_hz, false);
        while self.refresh() {
            timer.sleep_until_next_tick();
        }

        self.blackout();
        for sink in &mut self.sinks {
            sink.close();
        }
        log::info!("Display refresh stopped");
    }

    /// Pushes the current frame to all sinks. Returns `false` once shutdown
    /// has been requested.
    pub fn refresh(&mut self) -> bool {
        {
            let frame = lock(&self.frame);
            if frame.shutdown {
                return false;
            }
            self.pixels.copy_from(&frame.pixels);
        }

        let options = *lock(&self.options);
        for (shown, pixel) in self.shown.iter_mut().zip(self.pixels.as_slice()) {
            *shown = if options.enabled {
                apply_master_brightness(*pixel, options.brightness)
            } else {
                0
            };
        }

        self.push();
        true
    }

    fn blackout(&mut self) {
        self.shown.fill(0);
        self.push();
    }

    fn push(&mut self) {
        for sink in &mut self.sinks {
            if let Err(err) = sink.show(&self.shown) {
                log::warn!("Failed to update {}: {}", sink.name(), err);
            }
        }
    }
}
