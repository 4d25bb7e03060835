//! USB-MIDI event packet codec
//!
//! Every USB-MIDI event is a fixed 4-byte packet: a header holding the virtual
//! cable (high nibble) and Code Index Number (low nibble), followed by up to
//! three MIDI bytes. Hosts rely on the CIN to know how many of those bytes are
//! meaningful, so it must always agree with the status byte.

use std::fmt;

use super::{format_hex, MidiMessage};

/// Code Index Number: packet category and MIDI byte length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodeIndex {
    /// Miscellaneous, reserved for future extensions
    Misc = 0x0,
    /// Cable events, reserved for future expansion
    CableEvent = 0x1,
    /// Two-byte System Common message
    SystemCommon2 = 0x2,
    /// Three-byte System Common message
    SystemCommon3 = 0x3,
    /// SysEx starts or continues
    SysExContinue = 0x4,
    /// Single-byte System Common, or SysEx ends with one byte
    SysExEnd1 = 0x5,
    /// SysEx ends with two bytes
    SysExEnd2 = 0x6,
    /// SysEx ends with three bytes
    SysExEnd3 = 0x7,
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyKeyPress = 0xA,
    ControlChange = 0xB,
    ProgramChange = 0xC,
    ChannelPressure = 0xD,
    PitchBend = 0xE,
    /// Single byte: tune request, clock, start, continue, stop...
    SingleByte = 0xF,
}

impl CodeIndex {
    /// CIN from a header byte (the cable nibble is ignored)
    pub fn from_header(header: u8) -> Self {
        match header & 0x0F {
            0x0 => CodeIndex::Misc,
            0x1 => CodeIndex::CableEvent,
            0x2 => CodeIndex::SystemCommon2,
            0x3 => CodeIndex::SystemCommon3,
            0x4 => CodeIndex::SysExContinue,
            0x5 => CodeIndex::SysExEnd1,
            0x6 => CodeIndex::SysExEnd2,
            0x7 => CodeIndex::SysExEnd3,
            0x8 => CodeIndex::NoteOff,
            0x9 => CodeIndex::NoteOn,
            0xA => CodeIndex::PolyKeyPress,
            0xB => CodeIndex::ControlChange,
            0xC => CodeIndex::ProgramChange,
            0xD => CodeIndex::ChannelPressure,
            0xE => CodeIndex::PitchBend,
            _ => CodeIndex::SingleByte,
        }
    }

    /// CIN for a message starting with `status`, when it has a fixed length
    ///
    /// SysEx (0xF0/0xF7) is never framed here.
    pub fn for_status(status: u8) -> Option<Self> {
        match status {
            0x80..=0xEF => Some(Self::from_header(status >> 4)),
            0xF1 | 0xF3 => Some(CodeIndex::SystemCommon2),
            0xF2 => Some(CodeIndex::SystemCommon3),
            0xF6 => Some(CodeIndex::SysExEnd1),
            0xF8..=0xFF => Some(CodeIndex::SingleByte),
            _ => None,
        }
    }

    /// Number of meaningful MIDI bytes in a packet of this category
    pub fn message_len(self) -> usize {
        match self {
            CodeIndex::Misc | CodeIndex::CableEvent => 0,
            CodeIndex::SysExEnd1 | CodeIndex::SingleByte => 1,
            CodeIndex::SystemCommon2
            | CodeIndex::SysExEnd2
            | CodeIndex::ProgramChange
            | CodeIndex::ChannelPressure => 2,
            CodeIndex::SystemCommon3
            | CodeIndex::SysExContinue
            | CodeIndex::SysExEnd3
            | CodeIndex::NoteOff
            | CodeIndex::NoteOn
            | CodeIndex::PolyKeyPress
            | CodeIndex::ControlChange
            | CodeIndex::PitchBend => 3,
        }
    }
}

/// A 4-byte USB-MIDI event packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsbMidiPacket {
    /// Cable number (high nibble) and Code Index Number (low nibble)
    pub header: u8,
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl UsbMidiPacket {
    /// The all-zero packet a transport reports when nothing was received
    pub const EMPTY: Self = Self {
        header: 0,
        status: 0,
        data1: 0,
        data2: 0,
    };

    pub const fn new(header: u8, status: u8, data1: u8, data2: u8) -> Self {
        Self {
            header,
            status,
            data1,
            data2,
        }
    }

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        [self.header, self.status, self.data1, self.data2]
    }

    /// Virtual cable number (0-15)
    pub fn cable(&self) -> u8 {
        self.header >> 4
    }

    pub fn code_index(&self) -> CodeIndex {
        CodeIndex::from_header(self.header)
    }

    /// A zero header means "no data", not an error
    pub fn is_empty(&self) -> bool {
        self.header == 0
    }

    /// Frame a channel-voice message on cable 0
    pub fn encode(message: &MidiMessage) -> Self {
        let [status, data1, data2] = message.encode();
        // Channel-voice CIN is the status high nibble
        Self::new(status >> 4, status, data1, data2)
    }

    /// Frame raw MIDI bytes on cable 0
    ///
    /// Returns `None` for SysEx, running status, or too-short input.
    pub fn from_midi_bytes(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;
        let cin = CodeIndex::for_status(status)?;
        let len = cin.message_len();
        if data.len() < len {
            return None;
        }

        let mut bytes = [0u8; 3];
        bytes[..len].copy_from_slice(&data[..len]);
        Some(Self::new(cin as u8, bytes[0], bytes[1], bytes[2]))
    }

    /// The MIDI bytes this packet carries, trimmed to its CIN length
    pub fn midi_bytes(&self) -> Vec<u8> {
        let len = self.code_index().message_len();
        [self.status, self.data1, self.data2][..len].to_vec()
    }

    /// Classify an inbound packet
    pub fn decode(&self) -> Decoded {
        if self.is_empty() {
            return Decoded::Empty;
        }

        let code_index = self.code_index();
        match code_index {
            CodeIndex::Misc | CodeIndex::CableEvent => {
                Decoded::Ignored(Ignored::Reserved(code_index))
            }
            CodeIndex::SystemCommon2 | CodeIndex::ProgramChange | CodeIndex::ChannelPressure => {
                Decoded::Ignored(Ignored::TwoByte(code_index))
            }
            CodeIndex::SystemCommon3
            | CodeIndex::NoteOff
            | CodeIndex::NoteOn
            | CodeIndex::PolyKeyPress
            | CodeIndex::ControlChange
            | CodeIndex::PitchBend => Decoded::ChannelVoice(InboundEvent {
                code_index,
                status: self.status,
                control_or_pitch: self.data1,
                value: self.data2,
            }),
            // TODO: buffer SysEx packets until the end CIN once a SysEx consumer exists
            CodeIndex::SysExContinue
            | CodeIndex::SysExEnd1
            | CodeIndex::SysExEnd2
            | CodeIndex::SysExEnd3 => Decoded::Ignored(Ignored::SysEx(code_index)),
            CodeIndex::SingleByte => Decoded::Ignored(Ignored::SingleByte),
        }
    }
}

impl From<MidiMessage> for UsbMidiPacket {
    fn from(message: MidiMessage) -> Self {
        Self::encode(&message)
    }
}

impl fmt::Display for UsbMidiPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_hex(&self.to_bytes()))
    }
}

/// Result of decoding one inbound packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// Header was zero: nothing received this cycle
    Empty,
    /// A three-byte message (channel voice or System Common)
    ChannelVoice(InboundEvent),
    /// A category the surface does not act on
    Ignored(Ignored),
}

/// Packet categories that are accepted but not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// CIN 0x0 / 0x1
    Reserved(CodeIndex),
    /// Program Change, Channel Pressure, two-byte System Common
    TwoByte(CodeIndex),
    /// SysEx fragments, never reassembled
    SysEx(CodeIndex),
    /// Clock, start, stop and other single-byte messages
    SingleByte,
}

/// A decoded three-byte inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundEvent {
    pub code_index: CodeIndex,
    pub status: u8,
    /// First data byte (note number or controller)
    pub control_or_pitch: u8,
    /// Second data byte (velocity or controller value)
    pub value: u8,
}

impl InboundEvent {
    /// The semantic message, if the status byte is a channel-voice one
    pub fn message(&self) -> Option<MidiMessage> {
        MidiMessage::parse(&[self.status, self.control_or_pitch, self.value])
    }
}
