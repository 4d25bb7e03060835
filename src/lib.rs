//! midi-surface
//!
//! Input-to-MIDI core of a USB-MIDI control surface: five sliders, four
//! knobs and two rows of five buttons become Note and Control Change
//! messages, and inbound notes light the LEDs under the upper buttons.

pub mod config;
pub mod drivers;
pub mod leds;
pub mod midi;
pub mod quantizer;
pub mod surface;
