//! Digital rain for small LED matrices.
//!
//! [`effects::rain::CodeRain`] simulates one falling stream per column and
//! publishes packed `0x00RRGGBB` frames into a [`framestate::SharedFrame`].
//! The remaining modules drive it at a fixed rate and push the frames to LEDs.

pub mod animator;
pub mod brightness;
pub mod config;
pub mod display;
pub mod effects;
pub mod framestate;
pub mod geometry;
pub mod intervaltimer;
pub mod olaoutput;
pub mod osc;
pub mod preview;
pub mod random;
