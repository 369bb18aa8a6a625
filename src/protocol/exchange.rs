// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking command/response exchange with the vision sensor.
//!
//! A session goes like this:
//!
//! 1. Send the command byte, wait for the transmitter to drain, then settle.
//! 2. Discard one ack byte, then buffer bytes until the last three are `01 FE FF`.
//! 3. Hand the segment (terminator stripped) to the caller's handler, which decides whether to
//!    wait for another segment or stop.
//! 4. Send the stop command.
//!
//! Every wait is bounded by [`LinkConfig::byte_timeout_ms`]. If anything fails after the command
//! went out, a stop command is still attempted so the sensor does not keep streaming.
//!
//! The exchange owns the transport for its whole duration. On the board the receive interrupt must
//! be masked while it runs, or the frame synchronizer would steal the response bytes.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::serial;
use heapless::Vec;
use log::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{FieldError, LinkError, LinkResult, Stage};
use crate::protocol::messages::*;

/// Byte-level link in `nb` style.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Queue one byte for transmission.
    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// `WouldBlock` until everything queued has left the wire.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    fn read(&mut self) -> nb::Result<u8, Self::Error>;
}

/// Error of either half of a [`SplitPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError<T, R> {
    Tx(T),
    Rx(R),
}

/// [`Transport`] over separate `embedded-hal` serial halves.
pub struct SplitPort<TX, RX> {
    tx: TX,
    rx: RX,
}

impl<TX, RX> SplitPort<TX, RX> {
    pub fn new(tx: TX, rx: RX) -> Self {
        Self { tx, rx }
    }

    pub fn free(self) -> (TX, RX) {
        (self.tx, self.rx)
    }
}

impl<TX, RX> Transport for SplitPort<TX, RX>
where
    TX: serial::Write<u8>,
    RX: serial::Read<u8>,
    TX::Error: core::fmt::Debug,
    RX::Error: core::fmt::Debug,
{
    type Error = PortError<TX::Error, RX::Error>;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        self.tx.write(byte).map_err(|e| e.map(PortError::Tx))
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.tx.flush().map_err(|e| e.map(PortError::Tx))
    }

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.read().map_err(|e| e.map(PortError::Rx))
    }
}

/// Returned by a response handler to continue or end the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct CommandLink<T, D> {
    transport: T,
    delay: D,
    config: LinkConfig,
}

impl<T, D> CommandLink<T, D>
where
    T: Transport,
    D: DelayMs<u32> + DelayUs<u32>,
{
    pub fn new(transport: T, delay: D, config: LinkConfig) -> Self {
        Self {
            transport,
            delay,
            config,
        }
    }

    pub fn free(self) -> (T, D) {
        (self.transport, self.delay)
    }

    #[inline]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Run one command session.
    ///
    /// `handler` sees each response payload in turn. Returns the number of segments handled.
    pub fn exchange<F>(&mut self, command: u8, mut handler: F) -> LinkResult<u32>
    where
        F: FnMut(&[u8]) -> Result<Flow, FieldError>,
    {
        debug!("command {:#04x}", command);
        self.send(command, Stage::SendingCommand)?;
        self.delay.delay_ms(self.config.settle_ms);

        match self.read_segments(&mut handler) {
            Ok(segments) => {
                self.stop()?;
                debug!("command {:#04x} done after {} segments", command, segments);
                Ok(segments)
            }
            Err(e) => {
                warn!("command {:#04x} failed: {}", command, e);
                if let Err(stop_err) = self.stop() {
                    warn!("stop after failure also failed: {}", stop_err);
                }
                Err(e)
            }
        }
    }

    /// Ask the sensor to confirm it is alive.
    ///
    /// Up to [`LinkConfig::self_check_attempts`] received bytes are inspected for the ack.
    pub fn self_check(&mut self) -> LinkResult<()> {
        self.send(CMD_SELF_CHECK, Stage::SendingCommand)?;
        self.delay.delay_ms(self.config.settle_ms);

        let budget = self.config.self_check_attempts;
        for attempt in 1..=budget {
            match self.read_byte(Stage::WaitingAck) {
                Ok(ACK_SELF_CHECK) => {
                    info!("sensor self-check ok after {} bytes", attempt);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("sensor self-check aborted: {}", e);
                    return Err(LinkError::SelfCheckFailed { attempts: attempt });
                }
            }
        }

        warn!("sensor self-check: no ack in {} bytes", budget);
        Err(LinkError::SelfCheckFailed { attempts: budget })
    }

    fn read_segments<F>(&mut self, handler: &mut F) -> LinkResult<u32>
    where
        F: FnMut(&[u8]) -> Result<Flow, FieldError>,
    {
        let mut buf: Vec<u8, RESPONSE_CAPACITY> = Vec::new();
        let mut segments = 0;

        loop {
            let _ack = self.read_byte(Stage::WaitingAck)?;

            buf.clear();
            let (mut last_last, mut last) = (0u8, 0u8);
            loop {
                let byte = self.read_byte(Stage::ReadingResponse)?;
                buf.push(byte).map_err(|_| LinkError::ResponseOverflow {
                    capacity: RESPONSE_CAPACITY,
                })?;
                if [last_last, last, byte] == RESPONSE_TERMINATOR {
                    break;
                }
                last_last = last;
                last = byte;
            }

            let payload = &buf[..buf.len() - RESPONSE_TERMINATOR.len()];
            segments += 1;
            debug!("segment {}: {} bytes", segments, payload.len());

            match handler(payload)? {
                Flow::Continue => self.delay.delay_ms(self.config.pacing_ms),
                Flow::Stop => return Ok(segments),
            }
        }
    }

    fn stop(&mut self) -> LinkResult<()> {
        self.send(CMD_STOP, Stage::SendingStop)?;
        self.delay.delay_ms(self.config.pacing_ms);
        Ok(())
    }

    fn send(&mut self, byte: u8, stage: Stage) -> LinkResult<()> {
        self.poll(stage, |t| t.write(byte))?;
        self.poll(stage, |t| t.flush())
    }

    fn read_byte(&mut self, stage: Stage) -> LinkResult<u8> {
        self.poll(stage, |t| t.read())
    }

    /// Retry `op` every poll interval until it stops blocking or the byte timeout runs out.
    fn poll<R>(
        &mut self,
        stage: Stage,
        mut op: impl FnMut(&mut T) -> nb::Result<R, T::Error>,
    ) -> LinkResult<R> {
        let interval = self.config.poll_interval_us.max(1);
        let budget = self.config.byte_timeout_ms.saturating_mul(1000) / interval;

        let mut polls = 0;
        loop {
            match op(&mut self.transport) {
                Ok(value) => return Ok(value),
                Err(nb::Error::Other(e)) => {
                    warn!("transport error while {}: {:?}", stage, e);
                    return Err(LinkError::Transport(stage));
                }
                Err(nb::Error::WouldBlock) if polls >= budget => {
                    return Err(LinkError::Timeout {
                        stage,
                        waited_ms: self.config.byte_timeout_ms,
                    });
                }
                Err(nb::Error::WouldBlock) => {
                    polls += 1;
                    self.delay.delay_us(interval);
                }
            }
        }
    }
}
