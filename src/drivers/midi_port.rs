//! USB-MIDI transport over host MIDI ports
//!
//! Desktop MIDI APIs exchange plain MIDI bytes, so packets are unframed on
//! the way out and reframed (cable 0) on the way in. Inbound messages are
//! queued by the midir callback and drained one per tick.

use anyhow::{Context, Result};
use colored::*;
use midir::{
    MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection,
    MidiOutputPort,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::MidiTransport;
use crate::config::MidiConfig;
use crate::midi::{format_hex, UsbMidiPacket};

/// Inbound queue depth; packets beyond it are dropped
const INBOUND_CAPACITY: usize = 1000;

/// midir-backed transport
///
/// Either direction may be absent: without an output port packets are only
/// logged, without an input port `receive` always reports nothing.
pub struct MidirTransport {
    output: Option<MidiOutputConnection>,
    _input: Option<MidiInputConnection<()>>,
    inbound_rx: mpsc::Receiver<UsbMidiPacket>,
}

impl MidirTransport {
    /// Open the ports named in the configuration
    pub fn connect(config: &MidiConfig) -> Result<Self> {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        let output = match &config.output_port {
            Some(pattern) => {
                let midi_out = MidiOutput::new(&format!("{}-out", config.client_name))
                    .context("Failed to create MIDI output")?;
                let (port, name) = find_output_port(&midi_out, pattern)
                    .ok_or_else(|| anyhow::anyhow!("Output port '{}' not found", pattern))?;

                info!("Connecting to output port: {}", name);
                let conn = midi_out
                    .connect(&port, &config.client_name)
                    .map_err(|e| anyhow::anyhow!("Failed to connect to output port: {}", e))?;
                Some(conn)
            }
            None => {
                warn!("No MIDI output port configured, outgoing packets are only logged");
                None
            }
        };

        let input = match &config.input_port {
            Some(pattern) => {
                let midi_in = MidiInput::new(&format!("{}-in", config.client_name))
                    .context("Failed to create MIDI input")?;
                let (port, name) = find_input_port(&midi_in, pattern)
                    .ok_or_else(|| anyhow::anyhow!("Input port '{}' not found", pattern))?;

                info!("Connecting to input port: {}", name);
                let conn = midi_in
                    .connect(
                        &port,
                        &config.client_name,
                        move |_timestamp, data, _| match UsbMidiPacket::from_midi_bytes(data) {
                            Some(packet) => {
                                // Never block the MIDI thread
                                if inbound_tx.try_send(packet).is_err() {
                                    warn!("Inbound MIDI queue full, dropping {}", packet);
                                }
                            }
                            None => debug!("Unframed MIDI dropped: {}", format_hex(data)),
                        },
                        (),
                    )
                    .map_err(|e| anyhow::anyhow!("Failed to connect to input port: {}", e))?;
                Some(conn)
            }
            None => None,
        };

        Ok(Self {
            output,
            _input: input,
            inbound_rx,
        })
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }
}

impl MidiTransport for MidirTransport {
    fn send(&mut self, packet: UsbMidiPacket) {
        let Some(output) = self.output.as_mut() else {
            return;
        };

        if let Err(e) = output.send(&packet.midi_bytes()) {
            warn!("Failed to send {}: {}", packet, e);
        }
    }

    fn receive(&mut self) -> Option<UsbMidiPacket> {
        self.inbound_rx.try_recv().ok()
    }
}

/// Find an input port by case-insensitive substring match
fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(MidiInputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_in.ports().into_iter().find_map(|port| {
        let name = midi_in.port_name(&port).ok()?;
        if name.to_lowercase().contains(&pattern) {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            Some((port, name))
        } else {
            None
        }
    })
}

/// Find an output port by case-insensitive substring match
fn find_output_port(midi_out: &MidiOutput, pattern: &str) -> Option<(MidiOutputPort, String)> {
    let pattern = pattern.to_lowercase();
    midi_out.ports().into_iter().find_map(|port| {
        let name = midi_out.port_name(&port).ok()?;
        if name.to_lowercase().contains(&pattern) {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            Some((port, name))
        } else {
            None
        }
    })
}

/// Print all MIDI ports
pub fn print_ports() -> Result<()> {
    let midi_in = MidiInput::new("midi-surface-discovery")?;
    let midi_out = MidiOutput::new("midi-surface-discovery")?;

    println!("\n{}", "=== MIDI Input Ports ===".bold().cyan());
    for (i, port) in midi_in.ports().iter().enumerate() {
        if let Ok(name) = midi_in.port_name(port) {
            println!("  {}: {}", i, name.green());
        }
    }

    println!("\n{}", "=== MIDI Output Ports ===".bold().cyan());
    for (i, port) in midi_out.ports().iter().enumerate() {
        if let Ok(name) = midi_out.port_name(port) {
            println!("  {}: {}", i, name.green());
        }
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_transport_is_silent() {
        let mut transport = MidirTransport::connect(&MidiConfig::default()).unwrap();
        assert!(!transport.has_output());
        transport.send(UsbMidiPacket::new(0x09, 0x90, 44, 127));
        assert_eq!(transport.receive(), None);
    }
}
