#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use gcode_firmware_rp2040::{
    register_vocabulary, Device, EmbassyClock, Engine, EngineConfig, FrameStatus, IoTransport,
};
use gcode_proto::vocabulary::{BAUD_RATE, INVALID_REPLY};
use static_cell::StaticCell;

#[cfg(feature = "checksum")]
use gcode_firmware_rp2040::ChecksumMode;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// UART ring buffers.
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("G-code endpoint starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0; 64]);
    let rx_buf = RX_BUF.init([0; 256]);

    #[cfg(not(feature = "uart-flow-control"))]
    let uart = BufferedUart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        tx_buf,
        rx_buf,
        uart_config,
    );

    #[cfg(feature = "uart-flow-control")]
    let uart = BufferedUart::new_with_rtscts(
        p.UART1,
        p.PIN_8,  // TX
        p.PIN_9,  // RX
        p.PIN_11, // RTS
        p.PIN_10, // CTS
        Irqs,
        tx_buf,
        rx_buf,
        uart_config,
    );

    // --- Engine Setup ---
    let config = EngineConfig::new().with_error_reply(INVALID_REPLY);
    #[cfg(feature = "checksum")]
    let config = config.with_checksum(ChecksumMode::Sentinel);

    let mut engine: Engine<'static, _, _, Device> =
        Engine::new(IoTransport::new(uart), EmbassyClock, config);
    if let Err(e) = register_vocabulary(&mut engine) {
        error!("Failed to register commands: {}", e);
    }
    info!("{} commands registered", engine.commands().len());

    // Optional: LED for error indication (on-board LED on Pico)
    let mut led = Output::new(p.PIN_25, Level::Low);

    let mut device = Device::default();
    info!("G-code endpoint initialized, waiting for commands...");

    loop {
        match engine.poll(&mut device) {
            Ok(FrameStatus::None) | Ok(FrameStatus::Ready) => {}
            Ok(status) => {
                warn!("Rejected packet: {}", status);
                led.toggle();
            }
            Err(e) => {
                error!("UART error: {:?}", e);
                led.toggle();
            }
        }

        if device.report_requested {
            device.report_requested = false;
            match device.telemetry() {
                Ok(line) => {
                    if let Err(e) = engine.send(&line) {
                        error!("Telemetry send failed: {:?}", e);
                    }
                }
                Err(_) => warn!("Telemetry line does not fit"),
            }
        }

        // One byte per poll; let other tasks run in between
        embassy_futures::yield_now().await;
    }
}
