//! Tick-level scenarios for the control surface

use super::*;
use crate::leds::{LedBuffer, Rgb};
use crate::midi::{Ignored, UsbMidiPacket};
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
struct TestPins {
    digital: HashMap<u8, bool>,
    analog: HashMap<u8, u16>,
}

impl InputPins for TestPins {
    fn read_digital(&mut self, pin: u8) -> bool {
        self.digital.get(&pin).copied().unwrap_or(true)
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        self.analog.get(&pin).copied().unwrap_or(0)
    }
}

#[derive(Default)]
struct LoopbackTransport {
    inbound: VecDeque<UsbMidiPacket>,
    sent: Vec<UsbMidiPacket>,
}

impl MidiTransport for LoopbackTransport {
    fn send(&mut self, packet: UsbMidiPacket) {
        self.sent.push(packet);
    }

    fn receive(&mut self) -> Option<UsbMidiPacket> {
        self.inbound.pop_front()
    }
}

type TestSurface = ControlSurface<TestPins, LoopbackTransport, LedBuffer>;

fn make_surface() -> TestSurface {
    ControlSurface::new(
        SurfaceLayout::default(),
        Quantizer::default(),
        0,
        TestPins::default(),
        LoopbackTransport::default(),
        LedBuffer::new(5),
    )
}

/// Surface past its startup announcements, with the sent log cleared
fn settled_surface() -> TestSurface {
    let mut surface = make_surface();
    surface.tick();
    surface.transport_mut().sent.clear();
    surface
}

#[test]
fn test_new_clears_leds() {
    let surface = make_surface();
    assert_eq!(surface.leds().flush_count(), 1);
    assert!(surface.leds().pixels().iter().all(|p| *p == Rgb::BLACK));
}

#[test]
fn test_startup_tick_announces_buttons() {
    let mut surface = make_surface();
    let report = surface.tick();

    assert_eq!(report.inbound, Decoded::Empty);
    assert_eq!(report.sent.len(), 10);
    assert_eq!(surface.transport().sent.len(), 10);
    assert!(surface
        .transport()
        .sent
        .iter()
        .all(|p| p.header == 0x08 && p.status == 0x80 && p.data2 == 0));
    assert_eq!(surface.ticks(), 1);
}

#[test]
fn test_idle_tick_sends_nothing() {
    let mut surface = settled_surface();
    let report = surface.tick();
    assert!(report.sent.is_empty());
    assert!(surface.transport().sent.is_empty());
}

#[test]
fn test_button_press_sends_note_on_packet() {
    let mut surface = settled_surface();

    surface.pins_mut().digital.insert(49, false);
    surface.tick();
    assert_eq!(
        surface.transport().sent,
        vec![UsbMidiPacket::new(0x09, 0x90, 49, 127)]
    );

    surface.pins_mut().digital.insert(49, true);
    surface.tick();
    assert_eq!(
        surface.transport().sent[1],
        UsbMidiPacket::new(0x08, 0x80, 49, 0)
    );
}

#[test]
fn test_slider_move_sends_control_change_packet() {
    let mut surface = settled_surface();

    surface.pins_mut().analog.insert(55, 2050);
    surface.tick();
    // 127 - 2050 / 32 on CC 2
    assert_eq!(
        surface.transport().sent,
        vec![UsbMidiPacket::new(0x0B, 0xB0, 2, 63)]
    );
}

#[test]
fn test_inbound_note_lights_led() {
    let mut surface = settled_surface();
    let flushes = surface.leds().flush_count();

    surface
        .transport_mut()
        .inbound
        .push_back(UsbMidiPacket::new(0x09, 0x90, 46, 100));
    let report = surface.tick();

    assert_eq!(report.leds_updated, 1);
    assert!(matches!(report.inbound, Decoded::ChannelVoice(_)));
    assert_eq!(surface.leds().get(2), Some(Rgb::new(0, 200, 0)));
    assert_eq!(surface.leds().flush_count(), flushes + 1);
}

#[test]
fn test_inbound_control_change_also_drives_leds() {
    let mut surface = settled_surface();

    surface
        .transport_mut()
        .inbound
        .push_back(UsbMidiPacket::new(0x0B, 0xB0, 48, 10));
    surface.tick();

    assert_eq!(surface.leds().get(4), Some(Rgb::new(0, 20, 0)));
}

#[test]
fn test_ignored_inbound_leaves_leds_alone() {
    let mut surface = settled_surface();
    let flushes = surface.leds().flush_count();

    surface
        .transport_mut()
        .inbound
        .push_back(UsbMidiPacket::new(0x0F, 0xF8, 0, 0));
    let report = surface.tick();

    assert_eq!(report.inbound, Decoded::Ignored(Ignored::SingleByte));
    assert_eq!(report.leds_updated, 0);
    assert_eq!(surface.leds().flush_count(), flushes);
}

#[test]
fn test_one_inbound_packet_per_tick() {
    let mut surface = settled_surface();
    let inbound = &mut surface.transport_mut().inbound;
    inbound.push_back(UsbMidiPacket::new(0x09, 0x90, 44, 1));
    inbound.push_back(UsbMidiPacket::new(0x09, 0x90, 45, 1));

    surface.tick();
    assert_eq!(surface.leds().get(0), Some(Rgb::new(0, 2, 0)));
    assert_eq!(surface.leds().get(1), Some(Rgb::BLACK));

    surface.tick();
    assert_eq!(surface.leds().get(1), Some(Rgb::new(0, 2, 0)));
}

#[test]
fn test_pressing_key_does_not_light_its_own_led() {
    let mut surface = settled_surface();

    surface.pins_mut().digital.insert(44, false);
    surface.tick();

    assert_eq!(surface.transport().sent.len(), 1);
    assert_eq!(surface.leds().get(0), Some(Rgb::BLACK));
}
