// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::cell::RefCell;

// Embassy Async Runtime
use embassy_embedded_hal::shared_bus::blocking::i2c::I2cDevice;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, StackResources};
use embassy_sync::blocking_mutex::NoopMutex;

// ESP32-C6 HAL
use defmt::{Debug2Format, error, info, warn};
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::rng::Rng;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::{Rtc, wakeup_cause};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use esp_bodensensor::config::*;
use esp_bodensensor::hal::{AdcMoistureSensor, EspNowLink, load_retained, store_retained};
use esp_bodensensor::tasks::{connect, disconnect, net_task, start_station, sync_time};
use esp_bodensensor::{log_clock, log_outcome, run_cycle};
use esp_core::config::{parse_channel, parse_mac};
use esp_core::cycle::report_due;
use esp_core::schedule::needs_time_sync;
use esp_core::{ReportStatus, Sensors, Si7021, Tmp102};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Ein Durchlauf pro Wake: Uhr prüfen, ggf. per SNTP stellen, messen,
/// zum Sende-Zeitpunkt per ESP-NOW senden, Deep Sleep.
/// Nach dem Deep Sleep startet der Chip wieder hier.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // Standard-Takt reicht, der Wake ist kurz (Batterie!)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::_80MHz);
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // RTC: Uhr und Deep Sleep
    let mut rtc = Rtc::new(peripherals.LPWR);
    info!("Wake: cause {}", Debug2Format(&wakeup_cause()));

    // Zustand aus dem RTC-RAM
    let (mut state, warm_boot) = load_retained();
    if warm_boot {
        info!("State: restored, {} samples logged", state.samples.len());
    } else {
        info!("State: cold boot, RTC memory reset");
    }

    let mut now = state.clock(rtc.current_time_us() / 1_000_000);
    log_clock(now);

    // ------------------------------------------------------------------------
    // Funk: nur hochfahren wenn Zeit-Sync oder Report ansteht
    // ------------------------------------------------------------------------
    let sync_due = needs_time_sync(&state, now, &SCHEDULE);
    let report_pending = matches!(report_due(&state, now, &SCHEDULE), ReportStatus::Due(_));
    let mut link: Option<EspNowLink<'static>> = None;

    if sync_due || report_pending {
        // WiFi Hardware initialisieren
        static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
            static_cell::StaticCell::new();
        let radio_init =
            RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

        let (mut wifi_controller, wifi_interface) =
            esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
                .expect("Failed to initialize Wi-Fi");

        if sync_due {
            // Netzwerk-Stack erstellen
            // Random seed für TCP/IP Stack (von Hardware RNG)
            let rng = Rng::new();
            let seed = (rng.random() as u64) << 32 | rng.random() as u64;

            // Static resources für embassy-net: DNS + ein UDP Socket
            static RESOURCES: static_cell::StaticCell<StackResources<3>> =
                static_cell::StaticCell::new();
            let resources = RESOURCES.init(StackResources::new());

            let (stack, runner) = embassy_net::new(
                wifi_interface.sta,
                NetConfig::dhcpv4(Default::default()),
                resources,
                seed,
            );
            spawner.spawn(net_task(runner)).unwrap();

            match connect(&mut wifi_controller, stack).await {
                Ok(()) => match sync_time(stack).await {
                    Ok(unix_micros) => {
                        rtc.set_current_time_us(unix_micros);
                        let unix_secs = unix_micros / 1_000_000;
                        state.record_sync(unix_secs);
                        now = Some(unix_secs);
                        log_clock(now);
                    }
                    Err(e) => warn!("SNTP: Keeping unsynchronized clock: {}", e),
                },
                Err(e) => warn!("WiFi: Time sync skipped: {}", e),
            }

            // ESP-NOW braucht Station-Modus ohne Verbindung
            disconnect(&mut wifi_controller).await;
        }

        // Nach dem Sync kann ein Report fällig geworden sein
        if matches!(report_due(&state, now, &SCHEDULE), ReportStatus::Due(_)) {
            link = setup_espnow(&mut wifi_controller, wifi_interface.esp_now).await;
        }
    }

    // ------------------------------------------------------------------------
    // Sensoren: SI7021 + TMP102 an I2C0, Bodenfeuchte an ADC1
    // ------------------------------------------------------------------------
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} kHz, soil on GPIO{}",
        I2C_SDA_GPIO, I2C_SCL_GPIO, I2C_FREQUENCY_KHZ, SOIL_MOISTURE_GPIO
    );
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(I2C_FREQUENCY_KHZ)),
    )
    .expect("Failed to initialize I2C")
    .with_sda(peripherals.GPIO6)
    .with_scl(peripherals.GPIO7);
    let i2c_bus = NoopMutex::new(RefCell::new(i2c));

    let mut adc_config = AdcConfig::new();
    let soil_pin = adc_config.enable_pin(peripherals.GPIO4, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);

    let mut sensors = Sensors {
        si7021: Si7021::new(I2cDevice::new(&i2c_bus)),
        tmp102: Tmp102::new(I2cDevice::new(&i2c_bus)),
        moisture: AdcMoistureSensor::new(adc, soil_pin),
    };

    // ------------------------------------------------------------------------
    // Zyklus: messen, ggf. senden, Schlafdauer bestimmen
    // ------------------------------------------------------------------------
    // Uhr neu lesen, WiFi/SNTP-Timeouts können einige Sekunden gekostet haben
    let now = state.clock(rtc.current_time_us() / 1_000_000);
    let outcome = run_cycle(&mut state, now, &mut sensors, &mut link, &SCHEDULE);
    log_outcome(&outcome);

    store_retained(&state);

    info!(
        "Entering deep sleep for {} s (wake #{})",
        outcome.sleep_secs, state.boot_count
    );
    let timer = TimerWakeupSource::new(core::time::Duration::from_secs(outcome.sleep_secs));
    rtc.sleep_deep(&[&timer])
}

/// Richtet ESP-NOW zum Empfänger ein
///
/// Bei Fehlern schlägt der Report mit `LinkError::NotReady` fehl und
/// `run_cycle` plant einen kurzen Wake innerhalb der Toleranz.
async fn setup_espnow(
    controller: &mut esp_radio::wifi::WifiController<'static>,
    esp_now: esp_radio::esp_now::EspNow<'static>,
) -> Option<EspNowLink<'static>> {
    if let Err(e) = start_station(controller).await {
        error!("ESP-NOW: WiFi start failed: {}", e);
        return None;
    }

    let peer = match parse_mac(PEER_MAC) {
        Ok(mac) => mac,
        Err(e) => {
            error!("ESP-NOW: PEER_MAC '{}' invalid: {}", PEER_MAC, e);
            return None;
        }
    };
    let channel = parse_channel(ESPNOW_CHANNEL).unwrap_or_else(|e| {
        warn!("ESP-NOW: ESPNOW_CHANNEL '{}' invalid ({}), using current", ESPNOW_CHANNEL, e);
        0
    });

    match EspNowLink::new(esp_now, peer, channel) {
        Ok(link) => Some(link),
        Err(e) => {
            error!("ESP-NOW: Init failed: {}", e);
            None
        }
    }
}
