//! Control surface core
//!
//! Ties the tracker, the USB-MIDI codec and the LED feedback together behind a
//! single `tick()` that an outer scheduler (main loop, timer, test) calls once
//! per cycle. Nothing in here blocks.

pub mod feedback;
pub mod layout;
pub mod tracker;

#[cfg(test)]
mod tests;

use tracing::{debug, info, trace};

use crate::drivers::{InputPins, LedStrip, MidiTransport};
use crate::midi::{Decoded, MidiMessage, UsbMidiPacket};
use crate::quantizer::Quantizer;

pub use feedback::FeedbackMapper;
pub use layout::SurfaceLayout;
pub use tracker::{InputTracker, TrackerState};

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Inbound packet classification (`Decoded::Empty` when nothing arrived)
    pub inbound: Decoded,
    /// LEDs updated by inbound feedback
    pub leds_updated: usize,
    /// Messages sent to the host, in order
    pub sent: Vec<MidiMessage>,
}

/// A running control surface bound to its hardware
pub struct ControlSurface<P, T, L> {
    tracker: InputTracker,
    feedback: FeedbackMapper,
    pins: P,
    transport: T,
    leds: L,
    ticks: u64,
}

impl<P, T, L> ControlSurface<P, T, L>
where
    P: InputPins,
    T: MidiTransport,
    L: LedStrip,
{
    /// Build a surface and blank the LED strip
    pub fn new(
        layout: SurfaceLayout,
        quantizer: Quantizer,
        channel: u8,
        pins: P,
        transport: T,
        mut leds: L,
    ) -> Self {
        leds.clear();

        info!(
            "Control surface ready: channel {}, {}-bit ADC (conversion factor {})",
            (channel & 0x0F) + 1,
            quantizer.resolution(),
            quantizer.conversion_factor()
        );

        Self {
            feedback: FeedbackMapper::new(layout.upper_buttons),
            tracker: InputTracker::new(layout, quantizer, channel),
            pins,
            transport,
            leds,
            ticks: 0,
        }
    }

    /// Run one cycle: inbound feedback first, then input polling
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;

        let inbound = self.receive();
        let leds_updated = match inbound {
            Decoded::ChannelVoice(event) => self.feedback.apply(&event, &mut self.leds),
            _ => 0,
        };

        let sent = self.tracker.poll(&mut self.pins);
        for message in &sent {
            let packet = UsbMidiPacket::encode(message);
            debug!("Sent: {} | {}", packet, message);
            self.transport.send(packet);
        }

        TickReport {
            inbound,
            leds_updated,
            sent,
        }
    }

    fn receive(&mut self) -> Decoded {
        let Some(packet) = self.transport.receive() else {
            return Decoded::Empty;
        };

        let decoded = packet.decode();
        match decoded {
            Decoded::Empty => {}
            Decoded::ChannelVoice(event) => match event.message() {
                Some(message) => debug!("Received: {} | {}", packet, message),
                None => debug!("Received: {}", packet),
            },
            Decoded::Ignored(reason) => trace!("Ignored inbound {}: {:?}", packet, reason),
        }
        decoded
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }
}
