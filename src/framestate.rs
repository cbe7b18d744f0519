use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::brightness::PackedColor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<PackedColor>,
}

impl PixelBuffer {
    pub fn new(pixel_count: usize) -> PixelBuffer {
        PixelBuffer {
            pixels: vec![0; pixel_count],
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn set(&mut self, index: usize, color: PackedColor) {
        self.pixels[index] = color;
    }

    pub fn fill(&mut self, range: std::ops::Range<usize>, color: PackedColor) {
        self.pixels[range].fill(color);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn get(&self, index: usize) -> PackedColor {
        self.pixels[index]
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == 0)
    }

    pub fn as_slice(&self) -> &[PackedColor] {
        &self.pixels
    }

    /// Overwrites this buffer with `other`. Both must have the same length.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        self.pixels.copy_from_slice(&other.pixels);
    }
}

/// State shared between the effect thread and the display refresh thread.
pub struct FrameState {
    pub pixels: PixelBuffer,
    pub generation: u64,
    pub shutdown: bool,
}

pub type SharedFrame = Arc<Mutex<FrameState>>;

impl FrameState {
    pub fn new(pixel_count: usize) -> FrameState {
        FrameState {
            pixels: PixelBuffer::new(pixel_count),
            generation: 0,
            shutdown: false,
        }
    }

    pub fn shared(pixel_count: usize) -> SharedFrame {
        Arc::new(Mutex::new(FrameState::new(pixel_count)))
    }

    pub fn publish(&mut self, pixels: &PixelBuffer) {
        self.pixels.copy_from(pixels);
        self.generation += 1;
    }
}

/// Locks `mutex`, recovering the data if another thread panicked while
/// holding it.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ShutdownOnPanic {
    frame: SharedFrame,
}

impl Drop for ShutdownOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            let name = thread::current().name().unwrap_or("unnamed").to_string();
            log::error!("Thread {} panicked, shutting down", name);
            lock(&self.frame).shutdown = true;
        }
    }
}

/// Starts a named worker thread. If the worker panics, shutdown is requested
/// so the remaining workers stop as well.
pub fn spawn_worker<F>(name: &str, frame: &SharedFrame, f: F) -> Result<JoinHandle<()>, String>
where
    F: FnOnce() + Send + 'static,
{
    let guard = ShutdownOnPanic {
        frame: Arc::clone(frame),
    };
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _guard = guard;
            f();
        })
        .map_err(|err| format!("Failed to create thread {}: {}", name, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_copies_and_counts() {
        let mut state = FrameState::new(4);
        let mut pixels = PixelBuffer::new(4);
        pixels.set(2, 0x00FF00);

        state.publish(&pixels);
        pixels.set(2, 0);

        assert_eq!(state.pixels.get(2), 0x00FF00);
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn panicking_worker_requests_shutdown() {
        let frame = FrameState::shared(4);
        let handle = spawn_worker("Doomed", &frame, || panic!("worker failed")).unwrap();

        assert!(handle.join().is_err());
        assert!(lock(&frame).shutdown);
    }

    #[test]
    fn finished_worker_leaves_shutdown_alone() {
        let frame = FrameState::shared(4);
        let handle = spawn_worker("Quick", &frame, || {}).unwrap();

        handle.join().unwrap();
        assert!(!lock(&frame).shutdown);
    }

    #[test]
    fn fill_and_clear() {
        let mut pixels = PixelBuffer::new(8);
        pixels.fill(2..5, 0x0000FF);
        assert_eq!(pixels.as_slice(), &[0, 0, 0xFF, 0xFF, 0xFF, 0, 0, 0]);
        assert!(!pixels.is_blank());
        pixels.clear();
        assert!(pixels.is_blank());
    }
}
