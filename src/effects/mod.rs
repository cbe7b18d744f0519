pub mod rain;

/// An animation that renders into a shared frame, one step per call.
pub trait LightingEffect {
    fn name(&self) -> &'static str;

    /// Advances the effect by one frame and publishes the result.
    fn step(&mut self);
}
