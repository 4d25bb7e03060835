//! MIDI message types
//!
//! Semantic channel-voice messages exchanged with the host, independent of
//! the USB-MIDI framing (see [`usb`]).

pub mod usb;

use std::fmt;

pub use usb::{CodeIndex, Decoded, Ignored, InboundEvent, UsbMidiPacket};

/// Channel-voice MIDI messages (all three bytes long on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Polyphonic Key Pressure: channel (0-15), note (0-127), pressure (0-127)
    PolyPressure { channel: u8, note: u8, pressure: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Pitch Bend: channel (0-15), value (0-16383, 14-bit)
    PitchBend { channel: u8, value: u16 },
}

impl MidiMessage {
    /// Parse a message from raw MIDI bytes
    ///
    /// Only three-byte channel-voice messages are recognised. Unlike many
    /// parsers, a Note On with velocity 0 stays a Note On so that decoding is
    /// an exact inverse of encoding.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let [status, data1, data2] = *data.first_chunk::<3>()?;

        // Running status and system messages are not handled
        if !(0x80..0xF0).contains(&status) {
            return None;
        }

        let channel = status & 0x0F;
        let data1 = data1 & 0x7F;
        let data2 = data2 & 0x7F;

        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: data1,
                velocity: data2,
            }),
            0x90 => Some(MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            }),
            0xA0 => Some(MidiMessage::PolyPressure {
                channel,
                note: data1,
                pressure: data2,
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                cc: data1,
                value: data2,
            }),
            0xE0 => Some(MidiMessage::PitchBend {
                channel,
                value: ((data2 as u16) << 7) | data1 as u16,
            }),
            // Program Change / Channel Pressure are two bytes long
            _ => None,
        }
    }

    /// Encode the message to raw MIDI bytes
    pub fn encode(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => [0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiMessage::PolyPressure {
                channel,
                note,
                pressure,
            } => [0xA0 | (channel & 0x0F), note & 0x7F, pressure & 0x7F],
            MidiMessage::ControlChange { channel, cc, value } => {
                [0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::PitchBend { channel, value } => {
                let lsb = (value & 0x7F) as u8;
                let msb = ((value >> 7) & 0x7F) as u8;
                [0xE0 | (channel & 0x0F), lsb, msb]
            }
        }
    }

    /// Channel of the message (0-15)
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::PolyPressure { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. } => channel,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity),
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity),
            MidiMessage::PolyPressure {
                channel,
                note,
                pressure,
            } => write!(f, "PolyPressure ch:{} n:{} p:{}", channel + 1, note, pressure),
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::PitchBend { channel, value } => {
                write!(f, "PitchBend ch:{} v:{}", channel + 1, value)
            }
        }
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_parsing() {
        let msg = MidiMessage::parse(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100,
            }
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_kept() {
        let msg = MidiMessage::parse(&[0x93, 44, 0]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 3,
                note: 44,
                velocity: 0,
            }
        );
    }

    #[test]
    fn test_control_change() {
        let msg = MidiMessage::parse(&[0xB2, 7, 100]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::ControlChange {
                channel: 2,
                cc: 7,
                value: 100,
            }
        );
    }

    #[test]
    fn test_pitch_bend() {
        let msg = MidiMessage::parse(&[0xE0, 0x00, 0x40]).unwrap();
        assert_eq!(
            msg,
            MidiMessage::PitchBend {
                channel: 0,
                value: 8192,
            }
        );
        assert_eq!(msg.encode(), [0xE0, 0x00, 0x40]);
    }

    #[test]
    fn test_rejects_short_and_system_messages() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[0xC0, 5, 0]), None);
        assert_eq!(MidiMessage::parse(&[0xF8, 0, 0]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 60, 100]), None);
    }

    #[test]
    fn test_encode_masks_out_of_range_fields() {
        let msg = MidiMessage::ControlChange {
            channel: 0x1F,
            cc: 0xFF,
            value: 0x80,
        };
        assert_eq!(msg.encode(), [0xBF, 0x7F, 0x00]);
    }

    #[test]
    fn test_display_uses_one_based_channel() {
        let msg = MidiMessage::ControlChange {
            channel: 0,
            cc: 1,
            value: 63,
        };
        assert_eq!(msg.to_string(), "CC ch:1 cc:1 v:63");
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x09, 0x90, 0x2E, 0x64]), "09 90 2E 64");
    }
}
