//! Hardware seams for the control surface
//!
//! The surface core never touches pins, USB or LED hardware directly. It talks
//! to these three traits, implemented by firmware glue on a board or by the
//! host adapters in this module on a desktop.

pub mod midi_port;
pub mod script;
pub mod terminal;

use crate::leds::Rgb;
use crate::midi::UsbMidiPacket;

pub use midi_port::MidirTransport;
pub use script::ScriptedInputs;
pub use terminal::TerminalLeds;

/// Raw input capability (pin reads)
pub trait InputPins {
    /// Digital level of a pin (pull-up wiring: `false` means pressed)
    fn read_digital(&mut self, pin: u8) -> bool;

    /// Raw ADC sample of an analog pin
    fn read_analog(&mut self, pin: u8) -> u16;
}

/// USB-MIDI packet transport
///
/// Both directions are non-blocking: `send` is fire-and-forget and
/// `receive` returns `None` when nothing is pending.
pub trait MidiTransport {
    fn send(&mut self, packet: UsbMidiPacket);

    fn receive(&mut self) -> Option<UsbMidiPacket>;
}

/// Addressable LED strip
///
/// Pixel writes only become visible after `flush`.
pub trait LedStrip {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Push the whole buffer to the hardware
    fn flush(&mut self);

    /// Set every pixel to black and flush
    fn clear(&mut self) {
        for index in 0..self.len() {
            self.set_pixel(index, Rgb::BLACK);
        }
        self.flush();
    }
}
