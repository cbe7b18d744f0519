use std::thread;
use std::time::{Duration, Instant};

/// Paces a loop to a fixed rate on the calling thread.
pub struct IntervalTimer {
    interval: Duration,
    next_tick: Instant,
    thread_name: String,
    measure_fps: bool,
    last_fps_report: Instant,
    frames: u32,
    skipped: u32,
}

impl IntervalTimer {
    pub fn new(freq_hz: f32, measure_fps: bool) -> IntervalTimer {
        let interval = Self::interval_for(freq_hz);
        let thread_name = thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();

        IntervalTimer {
            interval,
            next_tick: Instant::now() + interval,
            thread_name,
            measure_fps,
            last_fps_report: Instant::now(),
            frames: 0,
            skipped: 0,
        }
    }

    pub fn interval_for(freq_hz: f32) -> Duration {
        let freq_hz = if freq_hz.is_finite() && freq_hz > 0.0 {
            freq_hz
        } else {
            1.0
        };
        Duration::from_micros((1_000_000.0 / freq_hz) as u64)
    }

    pub fn sleep_until_next_tick(&mut self) {
        if self.measure_fps {
            self.update_fps();
        }

        let now = Instant::now();
        if self.next_tick > now {
            thread::sleep(self.next_tick - now);
            self.next_tick += self.interval;
        } else {
            self.skipped += 1;
            log::trace!("{} skipped a frame", self.thread_name);
            self.next_tick = now + self.interval;
        }
    }

    fn update_fps(&mut self) {
        self.frames += 1;

        if self.last_fps_report.elapsed() >= Duration::from_secs(1) {
            log::debug!("{} FPS: {}", self.thread_name, self.frames);
            if self.skipped > 0 {
                log::warn!(
                    "{} fell behind {} times in the last second",
                    self.thread_name,
                    self.skipped
                );
            }
            self.frames = 0;
            self.skipped = 0;
            self.last_fps_report = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_from_frequency() {
        assert_eq!(IntervalTimer::interval_for(200.0), Duration::from_millis(5));
        assert_eq!(IntervalTimer::interval_for(0.0), Duration::from_secs(1));
        assert_eq!(IntervalTimer::interval_for(f32::NAN), Duration::from_secs(1));
    }

    #[test]
    fn keeps_pace() {
        let mut timer = IntervalTimer::new(500.0, false);
        let start = Instant::now();
        for _ in 0..10 {
            timer.sleep_until_next_tick();
        }
        assert!(start.elapsed() >= Duration::from_millis(18));
    }
}
