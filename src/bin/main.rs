#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use defmt::{error, info, warn};
use esp_hal::{
    Config,
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
};
use nv10_acceptor::{
    Channel, ChannelTable, DebounceConfig, Debouncer, Denomination, PaymentSequencer,
};
use panic_rtt_target as _;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// The note the firmware takes on every boot
const PAYMENT: Denomination = Denomination::Fifty;

#[esp_hal::main]
fn main() -> ! {
    rtt_target::rtt_init_defmt!();

    let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));

    // Accept lines idle high and are pulled low by the validator. Inhibit lines come up high so
    // every channel is closed from the first instruction.
    let accept = InputConfig::default().with_pull(Pull::Up);
    let inhibit = OutputConfig::default();
    let lines = [
        (
            Denomination::Ten,
            Input::new(peripherals.GPIO4, accept),
            Output::new(peripherals.GPIO0, Level::High, inhibit),
        ),
        (
            Denomination::Twenty,
            Input::new(peripherals.GPIO5, accept),
            Output::new(peripherals.GPIO1, Level::High, inhibit),
        ),
        (
            Denomination::Fifty,
            Input::new(peripherals.GPIO6, accept),
            Output::new(peripherals.GPIO3, Level::High, inhibit),
        ),
        (
            Denomination::Hundred,
            Input::new(peripherals.GPIO7, accept),
            Output::new(peripherals.GPIO10, Level::High, inhibit),
        ),
    ];

    let mut channels: ChannelTable<Input, Output> = ChannelTable::new();
    for (denomination, accept_line, inhibit_line) in lines {
        let channel = Channel::for_denomination(denomination, accept_line, inhibit_line);
        if let Err(e) = channels.push(channel) {
            error!("MAIN: Failed to register {} channel: {}", denomination, e);
        }
    }
    if let Err(e) = channels.inhibit_all() {
        error!("MAIN: Failed to inhibit channels: {}", e);
    }

    let debouncer = Debouncer::new(Delay::new(), DebounceConfig::default());
    let mut sequencer = PaymentSequencer::new(channels, debouncer);

    info!("MAIN: Requesting {} PLN", PAYMENT.value());
    match sequencer.pay_denomination(PAYMENT) {
        Ok(true) => info!("MAIN: Successfully paid."),
        Ok(false) => warn!("MAIN: Error occurred during payment."),
        Err(e) => error!("MAIN: Payment aborted: {}", e),
    }

    info!("MAIN: Done, parking");
    loop {
        core::hint::spin_loop();
    }
}
