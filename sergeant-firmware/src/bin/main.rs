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

// Embassy Async Runtime
use defmt::info;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use study_sergeant::config::{
    DISPLAY_POLICY, EXTRA_HEAP_SIZE, HTTP_TASK_POOL_SIZE, STATUS_SETTLE_DELAY_MS, STATUS_SOURCE,
    WIFI_HEAP_SIZE,
};
use study_sergeant::hal::{ButtonPanel, IndicatorPins, Lcd, LcdPins};
use study_sergeant::tasks::{
    StatusSource, connection_task, http_server_task, net_task, status_task,
};
use study_sergeant::{PendingStatus, Profile, SourceKind};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi, startet Embassy Runtime und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
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

    // Variante aus der Build-Konfiguration
    let profile = Profile::from_settings(STATUS_SOURCE, DISPLAY_POLICY, STATUS_SETTLE_DELAY_MS);
    info!("Main: Profile {}", profile);

    // Indikator-LEDs (aus beim Start)
    let indicator_pins = IndicatorPins {
        green: Output::new(peripherals.GPIO0, Level::Low, OutputConfig::default()),
        red: Output::new(peripherals.GPIO1, Level::Low, OutputConfig::default()),
        blue: Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default()),
    };

    // 16x2 Display (blockiert kurz für die Init-Sequenz)
    let lcd = Lcd::new(
        LcdPins {
            rs: Output::new(peripherals.GPIO6, Level::Low, OutputConfig::default()),
            en: Output::new(peripherals.GPIO7, Level::Low, OutputConfig::default()),
            d4: Output::new(peripherals.GPIO18, Level::Low, OutputConfig::default()),
            d5: Output::new(peripherals.GPIO19, Level::Low, OutputConfig::default()),
            d6: Output::new(peripherals.GPIO20, Level::Low, OutputConfig::default()),
            d7: Output::new(peripherals.GPIO21, Level::Low, OutputConfig::default()),
        },
        Delay::new(),
    )
    .expect("Failed to initialize LCD");

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: DHCP + DNS + MQTT (1) bzw. HTTP-Listener (HTTP_TASK_POOL_SIZE)
    static RESOURCES: static_cell::StaticCell<StackResources<6>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    // Stack muss 'static sein für Tasks
    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Spawn WiFi Tasks
    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();

    let source = match profile.source {
        SourceKind::Local => {
            // Taster gegen GND, interner Pull-Up
            let input_config = InputConfig::default().with_pull(Pull::Up);
            let buttons = ButtonPanel {
                blue: Input::new(peripherals.GPIO3, input_config),
                green: Input::new(peripherals.GPIO4, input_config),
                red: Input::new(peripherals.GPIO5, input_config),
            };

            // setStatus Übergabe (HTTP → Status Task)
            static PENDING: static_cell::StaticCell<PendingStatus> =
                static_cell::StaticCell::new();
            let pending = &*PENDING.init(PendingStatus::new());

            // Jede Task-Instanz kann eine Connection gleichzeitig handeln
            for task_id in 0..HTTP_TASK_POOL_SIZE {
                spawner
                    .spawn(http_server_task(task_id, stack, pending))
                    .unwrap();
            }

            StatusSource::Local { buttons, pending }
        }
        SourceKind::Remote => StatusSource::Remote { stack },
    };

    // Spawn Status Task (besitzt LEDs und Display exklusiv)
    spawner
        .spawn(status_task(
            profile,
            indicator_pins,
            peripherals.GPIO8,
            peripherals.RMT,
            lcd,
            source,
        ))
        .unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
