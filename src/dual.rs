//! Dual-channel front end driving the `flow0` and `flow1` sensors.
//!
//! Each channel owns its own transport and engine; nothing mutable is shared between them.
//! Within one [`DualPmw3360`] the channels are driven one after the other. Use
//! [`DualPmw3360::split`] to hand each channel to its own execution context.

use crate::config::Config;
use crate::cpi::{CpiEncoding, StepEncoding};
use crate::device::Pmw3360;
use crate::error::Result;
use crate::firmware::FirmwareLoader;
use crate::interface::BusTransport;
use crate::log::{info, warn};
use crate::motion::Motion;

/// Identifies one of the two sensor channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// First sensor (`flow0`).
    Flow0,
    /// Second sensor (`flow1`).
    Flow1,
}

impl Channel {
    /// Both channels, in acquisition order.
    pub const ALL: [Channel; 2] = [Channel::Flow0, Channel::Flow1];

    /// Returns the zero-based channel index.
    pub const fn index(self) -> usize {
        match self {
            Self::Flow0 => 0,
            Self::Flow1 => 1,
        }
    }
}

/// Two independently addressed PMW3360 sensors sharing one register map.
pub struct DualPmw3360<BUS, ENC = StepEncoding> {
    flow0: Pmw3360<BUS, ENC>,
    flow1: Pmw3360<BUS, ENC>,
}

impl<BUS> DualPmw3360<BUS> {
    /// Creates both channel drivers with the same configuration and the stock CPI table.
    pub fn new(bus0: BUS, bus1: BUS, config: Config) -> Self {
        Self::from_channels(Pmw3360::new(bus0, config), Pmw3360::new(bus1, config))
    }
}

impl<BUS, ENC> DualPmw3360<BUS, ENC> {
    /// Combines two already constructed channel drivers.
    pub fn from_channels(flow0: Pmw3360<BUS, ENC>, flow1: Pmw3360<BUS, ENC>) -> Self {
        Self { flow0, flow1 }
    }

    /// Returns the driver for `channel`.
    pub fn channel(&self, channel: Channel) -> &Pmw3360<BUS, ENC> {
        match channel {
            Channel::Flow0 => &self.flow0,
            Channel::Flow1 => &self.flow1,
        }
    }

    /// Returns the mutable driver for `channel`.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut Pmw3360<BUS, ENC> {
        match channel {
            Channel::Flow0 => &mut self.flow0,
            Channel::Flow1 => &mut self.flow1,
        }
    }

    /// Presence flags of both channels, indexed by [`Channel::index`].
    pub fn present(&self) -> [bool; 2] {
        [self.flow0.is_present(), self.flow1.is_present()]
    }

    /// Separates the channels so each can be driven from its own execution context.
    pub fn split(self) -> (Pmw3360<BUS, ENC>, Pmw3360<BUS, ENC>) {
        (self.flow0, self.flow1)
    }

    /// Consumes the driver and returns both transports.
    pub fn release(self) -> (BUS, BUS) {
        let (bus0, _) = self.flow0.release();
        let (bus1, _) = self.flow1.release();
        (bus0, bus1)
    }
}

impl<BUS, ENC, CommE> DualPmw3360<BUS, ENC>
where
    BUS: BusTransport<Error = CommE>,
    ENC: CpiEncoding,
{
    /// Initializes both channels.
    ///
    /// A failure on one channel does not stop the other; each entry reports that channel's own
    /// outcome, indexed by [`Channel::index`].
    pub fn init(
        &mut self,
        firmware0: impl FirmwareLoader,
        firmware1: impl FirmwareLoader,
    ) -> [Result<bool, CommE>; 2] {
        let flow0 = self.flow0.init(firmware0);
        log_init(Channel::Flow0, &flow0);
        let flow1 = self.flow1.init(firmware1);
        log_init(Channel::Flow1, &flow1);
        [flow0, flow1]
    }

    /// Writes the same resolution to both channels.
    pub fn set_cpi(&mut self, cpi: u16) -> Result<(), CommE> {
        self.flow0.set_cpi(cpi)?;
        self.flow1.set_cpi(cpi)
    }

    /// Fills `flow0` and `flow1` with one fresh sample per slot.
    ///
    /// All `flow0` slots are read before `flow1`. Both channels must have passed
    /// [`init`](Self::init); an absent chip yields whatever bytes its bus returns.
    pub fn acquire(&mut self, flow0: &mut [Motion], flow1: &mut [Motion]) -> Result<(), CommE> {
        self.flow0.read_samples(flow0)?;
        self.flow1.read_samples(flow1)
    }
}

fn log_init<E>(channel: Channel, outcome: &Result<bool, E>) {
    match outcome {
        Ok(true) => info!("{} initialized", channel),
        Ok(false) => warn!("{} not detected", channel),
        Err(_) => warn!("{} bus error during init", channel),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Channel, DualPmw3360};
    use crate::config::Config;
    use crate::firmware::NoFirmware;
    use crate::interface::BusTransport;
    use crate::mock::RecordingBus;
    use crate::motion::Motion;
    use std::sync::{Arc, Mutex};
    use std::vec;
    use std::vec::Vec;

    const IDENTITY_AND_DRAIN: [u8; 7] = [0x47, 0xB8, 0x00, 0x00, 0x00, 0x00, 0x00];

    fn responses(extra: &[u8]) -> Vec<u8> {
        let mut bytes = IDENTITY_AND_DRAIN.to_vec();
        bytes.extend_from_slice(extra);
        bytes
    }

    #[test]
    fn init_reports_each_channel_independently() {
        let mut dual = DualPmw3360::new(
            RecordingBus::new(&[0x00, 0x00]),
            RecordingBus::new(&IDENTITY_AND_DRAIN),
            Config::default(),
        );

        let [flow0, flow1] = dual.init(NoFirmware, NoFirmware);
        assert!(!flow0.unwrap());
        assert!(flow1.unwrap());
        assert_eq!(dual.present(), [false, true]);
        assert!(dual.channel(Channel::Flow1).is_present());
    }

    #[test]
    fn acquire_produces_one_sample_per_slot_per_channel() {
        let mut dual = DualPmw3360::new(
            RecordingBus::new(&responses(&[0x80, 0x01, 0x00, 0x00, 0x00, 0x40])),
            RecordingBus::new(&responses(&[
                0x88, 0xFF, 0xFF, 0x02, 0x00, 0x10, //
                0x00, 0x00, 0x00, 0x00, 0x00, 0x11,
            ])),
            Config::default(),
        );
        let [flow0, flow1] = dual.init(NoFirmware, NoFirmware);
        assert!(flow0.unwrap() && flow1.unwrap());

        let mut out0 = [Motion::default(); 1];
        let mut out1 = [Motion::default(); 2];
        dual.acquire(&mut out0, &mut out1).unwrap();

        assert_eq!(
            out0[0],
            Motion {
                has_motion: true,
                is_on_surface: true,
                delta_x: 1,
                delta_y: 0,
                surface_quality: 0x40,
            }
        );
        assert_eq!(
            out1[0],
            Motion {
                has_motion: true,
                is_on_surface: false,
                delta_x: -1,
                delta_y: 2,
                surface_quality: 0x10,
            }
        );
        assert!(!out1[1].has_motion);
        assert_eq!(out1[1].surface_quality, 0x11);

        let (bus0, bus1) = dual.release();
        assert_eq!(bus0.frame_addresses().len(), 8 + 6);
        assert_eq!(bus1.frame_addresses().len(), 8 + 12);
    }

    #[test]
    fn set_cpi_reaches_both_channels() {
        let mut dual =
            DualPmw3360::new(RecordingBus::new(&[]), RecordingBus::new(&[]), Config::default());

        dual.set_cpi(400).unwrap();
        for channel in Channel::ALL {
            assert_eq!(dual.channel(channel).cached_cpi(), Some(400));
        }

        let (bus0, bus1) = dual.release();
        assert_eq!(bus0.transmitted(), vec![0x8F, 0x03]);
        assert_eq!(bus1.transmitted(), vec![0x8F, 0x03]);
    }

    /// Bus that shares one global log with its sibling and checks its own select nesting.
    struct SharedLogBus {
        channel: Channel,
        inner: RecordingBus,
        log: Arc<Mutex<Vec<(Channel, bool)>>>,
        depth: u32,
    }

    impl BusTransport for SharedLogBus {
        type Error = core::convert::Infallible;

        fn select(&mut self) -> Result<(), Self::Error> {
            assert_eq!(self.depth, 0, "{:?} selected twice", self.channel);
            self.depth += 1;
            self.log.lock().unwrap().push((self.channel, true));
            self.inner.select()
        }

        fn deselect(&mut self) -> Result<(), Self::Error> {
            assert_eq!(self.depth, 1, "{:?} deselected while idle", self.channel);
            self.depth -= 1;
            self.log.lock().unwrap().push((self.channel, false));
            self.inner.deselect()
        }

        fn transmit(&mut self, byte: u8) -> Result<(), Self::Error> {
            assert_eq!(self.depth, 1);
            self.inner.transmit(byte)
        }

        fn receive(&mut self) -> Result<u8, Self::Error> {
            assert_eq!(self.depth, 1);
            self.inner.receive()
        }

        fn delay_us(&mut self, _us: u32) {
            std::thread::yield_now();
        }

        fn delay_ms(&mut self, _ms: u32) {
            std::thread::yield_now();
        }
    }

    #[test]
    fn split_channels_run_from_separate_threads_without_interleaving() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let samples = 50usize;
        let frame = [0x80, 0x01, 0x00, 0x02, 0x00, 0x40];
        let mut extra = Vec::new();
        for _ in 0..samples {
            extra.extend_from_slice(&frame);
        }

        let make_bus = |channel| SharedLogBus {
            channel,
            inner: RecordingBus::new(&responses(&extra)),
            log: Arc::clone(&log),
            depth: 0,
        };
        let mut dual = DualPmw3360::new(
            make_bus(Channel::Flow0),
            make_bus(Channel::Flow1),
            Config::default(),
        );
        let [flow0, flow1] = dual.init(NoFirmware, NoFirmware);
        assert!(flow0.unwrap() && flow1.unwrap());

        let (mut sensor0, mut sensor1) = dual.split();
        let worker = |sensor: &mut crate::device::Pmw3360<SharedLogBus>| {
            let mut out = vec![Motion::default(); samples];
            sensor.read_samples(&mut out).unwrap();
            out
        };

        let (out0, out1) = std::thread::scope(|scope| {
            let handle0 = scope.spawn(|| worker(&mut sensor0));
            let handle1 = scope.spawn(|| worker(&mut sensor1));
            (handle0.join().unwrap(), handle1.join().unwrap())
        });

        for motion in out0.iter().chain(out1.iter()) {
            assert_eq!(motion.delta_x, 1);
            assert_eq!(motion.delta_y, 2);
            assert_eq!(motion.surface_quality, 0x40);
        }

        // Per channel, every select is closed by a deselect before the next select.
        let log = log.lock().unwrap();
        for channel in Channel::ALL {
            let mut open = false;
            for (_, selected) in log.iter().filter(|(owner, _)| *owner == channel) {
                assert_ne!(open, *selected, "{:?} transaction nesting broken", channel);
                open = *selected;
            }
            assert!(!open);
        }

        let (bus0, _) = sensor0.release();
        assert_eq!(bus0.inner.frame_addresses().len(), 8 + samples * 6);
    }
}
