// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::{interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use embedded_hal::serial::Read as _;
use log::{debug, error, info, LevelFilter};
use panic_halt as _;

use hal::{
    pac::{self, interrupt, Interrupt},
    prelude::*,
    serial::{Config, Event, Rx, Serial},
};
use stm32f7xx_hal as hal;

use gimbal_tracker::{
    config::GimbalConfig,
    control::TrackingController,
    hw::{BoardPins, ServoPwm, Status, StatusLeds, Usart, UsartLogger},
    protocol::{CommandLink, FrameEvent, FrameSync, SplitPort, TargetCell, TargetWatch},
    servo::{Axis, Gimbal},
};

/// Control ticks between diagnostics lines and LED blinks.
const REPORT_EVERY: u32 = 50;

static LOGGER: UsartLogger<pac::USART1> = UsartLogger::new();

// Shared with the USART2 interrupt
static SENSOR_RX: Mutex<RefCell<Option<Rx<pac::USART2>>>> = Mutex::new(RefCell::new(None));
static SYNC: Mutex<RefCell<FrameSync>> = Mutex::new(RefCell::new(FrameSync::new()));
static TARGET: TargetCell = TargetCell::new();

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD);
    let mut leds = StatusLeds::new(pins.leds.red, pins.leds.yellow, pins.leds.green);

    // USART1 (DBG)
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_config(),
    );
    // Only fails if a logger is already installed, and this is the one place that installs one.
    let _ = LOGGER.init(Usart::new(serial), LevelFilter::Info);

    let config = GimbalConfig::default();
    if let Err(e) = config.validate() {
        error!("bad servo calibration: {}", e);
        leds.show(Status::Fault);
        halt();
    }
    let delay = cortex_m::delay::Delay::new(cp.SYST, clocks.sysclk().raw());

    // Servos stay disabled until the sensor answers.
    let (pan, tilt) = ServoPwm::tim3(dp.TIM3, &clocks).split();
    let mut gimbal = Gimbal::new(pan, tilt, &config);

    // USART2 (vision sensor)
    let mut sensor = Serial::new(
        dp.USART2,
        (pins.usart2.tx, pins.usart2.rx),
        &clocks,
        usart_config(),
    );
    sensor.listen(Event::Rxne);
    let (tx, rx) = sensor.split();

    // The receive interrupt is still masked, so the exchange owns the port.
    let mut link = CommandLink::new(SplitPort::new(tx, rx), delay, config.link);
    if let Err(e) = link.self_check() {
        error!("vision sensor not responding: {}", e);
        gimbal.disable();
        leds.show(Status::Fault);
        halt();
    }
    let (port, mut delay) = link.free();
    let (_tx, rx) = port.free();

    cortex_m::interrupt::free(|cs| SENSOR_RX.borrow(cs).replace(Some(rx)));
    unsafe { NVIC::unmask(Interrupt::USART2) };

    gimbal.init();
    let mut controller = TrackingController::new(gimbal, &config);
    leds.show(Status::Searching);
    info!("tracking, tick {} ms", config.tick_ms);

    let mut watch = TargetWatch::new(config.target_timeout_ticks());
    let mut ticks: u32 = 0;
    loop {
        let report = controller.step(TARGET.latest());
        let status = if watch.poll(TARGET.frames()) && report.is_some() {
            Status::Tracking
        } else {
            Status::Searching
        };
        if leds.status() != status {
            info!("target {}", if status == Status::Tracking { "acquired" } else { "lost" });
            leds.show(status);
        }

        ticks = ticks.wrapping_add(1);
        if ticks % REPORT_EVERY == 0 {
            leds.tick();
            let stats = cortex_m::interrupt::free(|cs| SYNC.borrow(cs).borrow().stats());
            debug!(
                "frames {} checksum errors {} resyncs {}",
                stats.committed, stats.checksum_errors, stats.resyncs
            );
            if let Some(report) = report {
                for axis in Axis::ALL {
                    let cmd = report.axis(axis).command;
                    debug!(
                        "{:?} (ch {}) {} deg / duty {}",
                        axis,
                        axis.index(),
                        cmd.angle,
                        cmd.duty
                    );
                }
            }
        }

        delay.delay_ms(config.tick_ms);
    }
}

fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

fn usart_config() -> Config {
    Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    }
}

#[interrupt]
fn USART2() {
    cortex_m::interrupt::free(|cs| {
        let mut rx = SENSOR_RX.borrow(cs).borrow_mut();
        let Some(rx) = rx.as_mut() else {
            return;
        };
        let mut sync = SYNC.borrow(cs).borrow_mut();

        while let Ok(byte) = rx.read() {
            if let FrameEvent::Committed(coord) = sync.push(byte) {
                TARGET.publish(coord);
            }
        }
    });
}
