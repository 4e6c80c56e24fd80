//! Recording sink for tests

use super::DisplaySink;

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Records every draw call and lets tests inject key presses
pub struct RecordingSink {
    width: u32,
    height: u32,
    open: AtomicBool,
    points: Mutex<Vec<(u32, u32, u8)>>,
    clears: AtomicUsize,
    presents: AtomicUsize,
    key_pressed: AtomicBool,
    key_presses: AtomicU64,
}

impl RecordingSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            open: AtomicBool::new(false),
            points: Mutex::new(Vec::new()),
            clears: AtomicUsize::new(0),
            presents: AtomicUsize::new(0),
            key_pressed: AtomicBool::new(false),
            key_presses: AtomicU64::new(0),
        }
    }

    /// Points drawn since the last clear, as (x, y, gray)
    pub fn points(&self) -> Vec<(u32, u32, u8)> {
        self.points.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn presents(&self) -> usize {
        self.presents.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn press_key(&self) {
        self.key_presses.fetch_add(1, Ordering::SeqCst);
        self.key_pressed.store(true, Ordering::SeqCst);
    }
}

impl DisplaySink for RecordingSink {
    fn open(&self) -> bool {
        self.open.store(true, Ordering::SeqCst);
        true
    }

    fn close(&self) -> bool {
        self.open.swap(false, Ordering::SeqCst)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&self, _r: u8, _g: u8, _b: u8) -> bool {
        if !self.is_open() {
            return false;
        }
        self.points.lock().unwrap().clear();
        self.clears.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn draw_point(&self, x: u32, y: u32, r: u8, _g: u8, _b: u8) -> bool {
        if !self.is_open() || x >= self.width || y >= self.height {
            return false;
        }
        self.points.lock().unwrap().push((x, y, r));
        true
    }

    fn present(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.presents.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn poll_key_pressed(&self) -> bool {
        self.key_pressed.swap(false, Ordering::SeqCst)
    }

    fn block_until_key_pressed(&self) -> bool {
        let start = self.key_presses.load(Ordering::SeqCst);
        while self.key_presses.load(Ordering::SeqCst) == start {
            std::thread::yield_now();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_key_press_is_edge_triggered() {
        let sink = RecordingSink::new(1, 1);
        assert!(!sink.poll_key_pressed());

        sink.press_key();
        assert!(sink.poll_key_pressed());
        assert!(!sink.poll_key_pressed());
    }

    #[test]
    fn test_block_until_key_pressed() {
        let sink = Arc::new(RecordingSink::new(1, 1));
        let presser = Arc::clone(&sink);
        let done = Arc::new(AtomicBool::new(false));
        let presser_done = Arc::clone(&done);

        let handle = std::thread::spawn(move || {
            while !presser_done.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(5));
                presser.press_key();
            }
        });

        assert!(sink.block_until_key_pressed());
        done.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
