//! LED feedback from inbound MIDI
//!
//! Lights the LED under an upper button when the host sends a three-byte
//! message whose first data byte is that button's pin number. The value
//! drives the green channel.

use tracing::{debug, trace};

use super::layout::BUTTON_COUNT;
use crate::drivers::LedStrip;
use crate::leds::Rgb;
use crate::midi::InboundEvent;

/// Maps inbound note/controller numbers to upper-button LEDs
#[derive(Debug, Clone)]
pub struct FeedbackMapper {
    upper_buttons: [u8; BUTTON_COUNT],
}

impl FeedbackMapper {
    pub fn new(upper_buttons: [u8; BUTTON_COUNT]) -> Self {
        Self { upper_buttons }
    }

    /// Color shown for an inbound 7-bit value (green, doubled)
    pub fn color_for(value: u8) -> Rgb {
        Rgb::new(0, (value & 0x7F) * 2, 0)
    }

    /// Apply an inbound event to the strip
    ///
    /// Returns how many LEDs were updated. The strip is flushed once if any
    /// matched; unmatched events are dropped.
    pub fn apply<L: LedStrip + ?Sized>(&self, event: &InboundEvent, leds: &mut L) -> usize {
        let color = Self::color_for(event.value);
        let mut matched = 0;

        // Five keys: a linear scan beats a lookup table here
        for (index, &pin) in self.upper_buttons.iter().enumerate() {
            if pin == event.control_or_pitch {
                leds.set_pixel(index, color);
                matched += 1;
            }
        }

        if matched > 0 {
            debug!("LED feedback: key {} -> {}", event.control_or_pitch, color);
            leds.flush();
        } else {
            trace!("No LED for key {}", event.control_or_pitch);
        }

        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leds::LedBuffer;
    use crate::midi::{CodeIndex, Decoded, UsbMidiPacket};
    use crate::surface::layout::SurfaceLayout;

    fn mapper() -> FeedbackMapper {
        FeedbackMapper::new(SurfaceLayout::default().upper_buttons)
    }

    fn event(key: u8, value: u8) -> InboundEvent {
        InboundEvent {
            code_index: CodeIndex::NoteOn,
            status: 0x90,
            control_or_pitch: key,
            value,
        }
    }

    #[test]
    fn test_note_lights_matching_key() {
        let mut leds = LedBuffer::new(5);
        let packet = UsbMidiPacket::new(0x09, 0x90, 46, 100);
        let Decoded::ChannelVoice(inbound) = packet.decode() else {
            panic!("expected a channel voice event");
        };

        assert_eq!(mapper().apply(&inbound, &mut leds), 1);
        assert_eq!(leds.get(2), Some(Rgb::new(0, 200, 0)));
        assert_eq!(leds.flush_count(), 1);
        // Other keys untouched
        assert_eq!(leds.get(0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_unmatched_key_is_dropped() {
        let mut leds = LedBuffer::new(5);
        assert_eq!(mapper().apply(&event(49, 100), &mut leds), 0);
        assert_eq!(leds.flush_count(), 0);
        assert!(leds.pixels().iter().all(|p| *p == Rgb::BLACK));
    }

    #[test]
    fn test_zero_value_turns_led_off() {
        let mut leds = LedBuffer::new(5);
        let mapper = mapper();
        mapper.apply(&event(44, 127), &mut leds);
        assert_eq!(leds.get(0), Some(Rgb::new(0, 254, 0)));

        mapper.apply(&event(44, 0), &mut leds);
        assert_eq!(leds.get(0), Some(Rgb::BLACK));
        assert_eq!(leds.flush_count(), 2);
    }

    #[test]
    fn test_value_masked_to_seven_bits() {
        assert_eq!(FeedbackMapper::color_for(0xFF), Rgb::new(0, 254, 0));
    }

    #[test]
    fn test_duplicate_pins_all_light() {
        let mut leds = LedBuffer::new(5);
        let mapper = FeedbackMapper::new([10, 11, 10, 12, 13]);
        assert_eq!(mapper.apply(&event(10, 1), &mut leds), 2);
        assert_eq!(leds.get(0), Some(Rgb::new(0, 2, 0)));
        assert_eq!(leds.get(2), Some(Rgb::new(0, 2, 0)));
        assert_eq!(leds.flush_count(), 1);
    }
}
