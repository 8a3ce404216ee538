//! Recording bus transport shared by the unit tests.

extern crate std;

use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::interface::BusTransport;

/// One primitive observed on the mock bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Select,
    Deselect,
    Tx(u8),
    Rx(u8),
    DelayUs(u32),
    DelayMs(u32),
}

/// Bus that records every primitive and answers reads from a queue.
///
/// An exhausted queue answers `0x00`, like a floating MISO line pulled low.
#[derive(Debug, Default)]
pub(crate) struct RecordingBus {
    pub events: Vec<Event>,
    responses: VecDeque<u8>,
    selected: bool,
}

impl RecordingBus {
    pub fn new(responses: &[u8]) -> Self {
        Self {
            events: Vec::new(),
            responses: responses.iter().copied().collect(),
            selected: false,
        }
    }

    pub fn push_responses(&mut self, responses: &[u8]) {
        self.responses.extend(responses.iter().copied());
    }

    /// Bytes shifted out, in order.
    pub fn transmitted(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Tx(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    /// First byte of every select/deselect frame, i.e. the address byte of each transaction.
    pub fn frame_addresses(&self) -> Vec<u8> {
        let mut addresses = Vec::new();
        let mut in_frame = false;
        for event in &self.events {
            match event {
                Event::Select => in_frame = true,
                Event::Tx(byte) if in_frame => {
                    addresses.push(*byte);
                    in_frame = false;
                }
                Event::Deselect => in_frame = false,
                _ => {}
            }
        }
        addresses
    }

    /// `true` while a select is not yet matched by a deselect.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn total_delay_ms(&self) -> u32 {
        self.events
            .iter()
            .map(|event| match event {
                Event::DelayMs(ms) => *ms,
                _ => 0,
            })
            .sum()
    }
}

impl BusTransport for RecordingBus {
    type Error = Infallible;

    fn select(&mut self) -> Result<(), Self::Error> {
        assert!(!self.selected, "select while already selected");
        self.selected = true;
        self.events.push(Event::Select);
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Self::Error> {
        assert!(self.selected, "deselect without select");
        self.selected = false;
        self.events.push(Event::Deselect);
        Ok(())
    }

    fn transmit(&mut self, byte: u8) -> Result<(), Self::Error> {
        assert!(self.selected, "transmit outside of a transaction");
        self.events.push(Event::Tx(byte));
        Ok(())
    }

    fn receive(&mut self) -> Result<u8, Self::Error> {
        assert!(self.selected, "receive outside of a transaction");
        let byte = self.responses.pop_front().unwrap_or(0x00);
        self.events.push(Event::Rx(byte));
        Ok(byte)
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::DelayMs(ms));
    }
}
