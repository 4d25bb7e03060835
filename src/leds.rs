//! LED colors and the in-memory LED buffer

use std::fmt;

use crate::drivers::LedStrip;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `brightness / 255`
    pub fn scaled(self, brightness: u8) -> Self {
        let scale = |c: u8| ((c as u16 * brightness as u16) / 255) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Per-key LED state, flushed as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedBuffer {
    pixels: Vec<Rgb>,
    flushes: u64,
}

impl LedBuffer {
    pub fn new(count: usize) -> Self {
        Self {
            pixels: vec![Rgb::BLACK; count],
            flushes: 0,
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    /// How many times the buffer was pushed to hardware
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}

impl LedStrip for LedBuffer {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_starts_black() {
        let buffer = LedBuffer::new(5);
        assert_eq!(buffer.len(), 5);
        assert!(buffer.pixels().iter().all(|p| *p == Rgb::BLACK));
        assert_eq!(buffer.flush_count(), 0);
    }

    #[test]
    fn test_out_of_range_pixel_is_ignored() {
        let mut buffer = LedBuffer::new(2);
        buffer.set_pixel(7, Rgb::new(1, 2, 3));
        assert_eq!(buffer.pixels(), &[Rgb::BLACK, Rgb::BLACK]);
    }

    #[test]
    fn test_brightness_scaling() {
        assert_eq!(Rgb::new(0, 254, 0).scaled(255), Rgb::new(0, 254, 0));
        assert_eq!(Rgb::new(0, 200, 0).scaled(100), Rgb::new(0, 78, 0));
        assert_eq!(Rgb::new(10, 20, 30).scaled(0), Rgb::BLACK);
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Rgb::new(0, 200, 0).to_string(), "#00C800");
    }
}
