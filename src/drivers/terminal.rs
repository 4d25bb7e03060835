//! Terminal LED strip
//!
//! Renders the LED buffer as a row of true-color blocks on every flush.

use colored::*;

use super::LedStrip;
use crate::leds::{LedBuffer, Rgb};

pub struct TerminalLeds {
    buffer: LedBuffer,
    brightness: u8,
}

impl TerminalLeds {
    pub fn new(count: usize, brightness: u8) -> Self {
        Self {
            buffer: LedBuffer::new(count),
            brightness,
        }
    }

    pub fn buffer(&self) -> &LedBuffer {
        &self.buffer
    }

    /// One line with a colored block per LED
    pub fn render(&self) -> String {
        let blocks: Vec<String> = self
            .buffer
            .pixels()
            .iter()
            .map(|pixel| {
                let Rgb { r, g, b } = pixel.scaled(self.brightness);
                "██".truecolor(r, g, b).to_string()
            })
            .collect();

        format!("{} {}", "LEDs".dimmed(), blocks.join(" "))
    }
}

impl LedStrip for TerminalLeds {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        self.buffer.set_pixel(index, color);
    }

    fn flush(&mut self) {
        self.buffer.flush();
        println!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_has_block_per_led() {
        colored::control::set_override(false);
        let mut leds = TerminalLeds::new(3, 100);
        leds.set_pixel(1, Rgb::new(0, 200, 0));

        assert_eq!(leds.render(), "LEDs ██ ██ ██");
        assert_eq!(leds.buffer().get(1), Some(Rgb::new(0, 200, 0)));
    }

    #[test]
    fn test_flush_counts() {
        let mut leds = TerminalLeds::new(2, 255);
        leds.clear();
        assert_eq!(leds.buffer().flush_count(), 1);
    }
}
