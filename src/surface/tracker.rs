//! Input state tracker
//!
//! Diffs every control against its last accepted state once per poll cycle
//! and turns significant changes into MIDI messages.

use super::layout::{
    SurfaceLayout, BUTTON_COUNT, KNOB_CC_BASE, KNOB_COUNT, SLIDER_CC_BASE, SLIDER_COUNT,
};
use crate::drivers::InputPins;
use crate::midi::MidiMessage;
use crate::quantizer::Quantizer;

/// Velocity sent when a button goes down
pub const PRESS_VELOCITY: u8 = 127;

/// Last accepted state of every control
///
/// Starts zeroed: buttons read as "low" and analog inputs as 0, so the first
/// poll reports every released button and every pot resting above the
/// threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    pub lower_buttons: [bool; BUTTON_COUNT],
    pub upper_buttons: [bool; BUTTON_COUNT],
    pub sliders: [u16; SLIDER_COUNT],
    pub knobs: [u16; KNOB_COUNT],
}

/// Turns raw control readings into MIDI messages
#[derive(Debug, Clone)]
pub struct InputTracker {
    layout: SurfaceLayout,
    quantizer: Quantizer,
    channel: u8,
    state: TrackerState,
}

impl InputTracker {
    pub fn new(layout: SurfaceLayout, quantizer: Quantizer, channel: u8) -> Self {
        Self {
            layout,
            quantizer,
            channel: channel & 0x0F,
            state: TrackerState::default(),
        }
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Run one poll cycle and return the messages it produced, in order
    ///
    /// Per index: lower button, upper button, slider. Knobs follow.
    pub fn poll<P: InputPins + ?Sized>(&mut self, pins: &mut P) -> Vec<MidiMessage> {
        let mut events = Vec::new();

        for i in 0..BUTTON_COUNT {
            let pin = self.layout.lower_buttons[i];
            let level = pins.read_digital(pin);
            if level != self.state.lower_buttons[i] {
                events.push(self.button_message(pin, level));
            }
            self.state.lower_buttons[i] = level;

            let pin = self.layout.upper_buttons[i];
            let level = pins.read_digital(pin);
            if level != self.state.upper_buttons[i] {
                events.push(self.button_message(pin, level));
            }
            self.state.upper_buttons[i] = level;

            let sample = pins.read_analog(self.layout.sliders[i]);
            if self.quantizer.is_significant(sample, self.state.sliders[i]) {
                // Inverted so that pushing a slider up raises the value
                let value = 127 - self.quantizer.to_seven_bit(sample);
                events.push(MidiMessage::ControlChange {
                    channel: self.channel,
                    cc: SLIDER_CC_BASE + i as u8,
                    value,
                });
                self.state.sliders[i] = sample;
            }
        }

        for i in 0..KNOB_COUNT {
            let sample = pins.read_analog(self.layout.knobs[i]);
            if self.quantizer.is_significant(sample, self.state.knobs[i]) {
                events.push(MidiMessage::ControlChange {
                    channel: self.channel,
                    cc: KNOB_CC_BASE + i as u8,
                    value: self.quantizer.to_seven_bit(sample),
                });
                self.state.knobs[i] = sample;
            }
        }

        events
    }

    /// High (released) means Note Off, low (pressed) means Note On
    fn button_message(&self, pin: u8, level: bool) -> MidiMessage {
        if level {
            MidiMessage::NoteOff {
                channel: self.channel,
                note: pin,
                velocity: 0,
            }
        } else {
            MidiMessage::NoteOn {
                channel: self.channel,
                note: pin,
                velocity: PRESS_VELOCITY,
            }
        }
    }
}
