use crate::effects::LightingEffect;
use crate::framestate::{lock, SharedFrame};
use crate::intervaltimer::IntervalTimer;

/// Steps an effect at a fixed rate until shutdown is requested.
pub struct Animator {
    effect: Box<dyn LightingEffect + Send>,
    frame: SharedFrame,
    tick_rate_hz: f32,
}

impl Animator {
    pub fn new(
        effect: Box<dyn LightingEffect + Send>,
        frame: SharedFrame,
        tick_rate_hz: f32,
    ) -> Animator {
        Animator {
            effect,
            frame,
            tick_rate_hz,
        }
    }

    pub fn run(&mut self) {
        log::info!(
            "Running {} at {} ticks/s",
            self.effect.name(),
            self.tick_rate_hz
        );

        let mut timer = IntervalTimer::new(self.tick_rate_hz, true);
        while !self.shutdown_requested() {
            self.effect.step();
            timer.sleep_until_next_tick();
        }

        log::info!("Stopped {}", self.effect.name());
    }

    fn shutdown_requested(&self) -> bool {
        lock(&self.frame).shutdown
    }
}
