// Status Task - Reconciler-Loop für LEDs und Display
use defmt::{error, info, warn};
use embassy_net::Stack;
use embassy_time::{Duration, Instant, Timer};
use esp_hal_smartled::smart_led_buffer;
use sergeant_core::{
    CharDisplay, IndicatorLeds, Profile, ReconcileError, StatusReconciler, Tick, local_poll,
};

use crate::PendingStatus;
use crate::config::{LED_BRIGHTNESS, LOCAL_POLL_INTERVAL_MS, RMT_CLOCK_MHZ};
use crate::hal::{ButtonPanel, GpioIndicator, IndicatorPins, Lcd, RmtLedWriter};
use crate::tasks::mqtt::run_remote;

/// Quelle des Status, passend zum Profil
pub enum StatusSource {
    /// Taster + setStatus Kommandos vom HTTP-Task
    Local {
        buttons: ButtonPanel<'static>,
        pending: &'static PendingStatus,
    },
    /// Status-Feed vom MQTT Broker
    Remote { stack: &'static Stack<'static> },
}

/// Status Task - Embassy Task, läuft endlos
///
/// Übernimmt die Hardware-Initialisierung der Onboard LED und ruft dann
/// den passenden Loop mit dem testbaren `StatusReconciler` auf.
///
/// # Parameter
/// - `profile`: Variante (Quelle + Display-Verhalten)
/// - `pins`: Die drei Indikator-Ausgänge
/// - `gpio8`, `rmt_peripheral`: Onboard WS2812 (Spiegel)
/// - `display`: Initialisiertes 16x2 Display
/// - `source`: Taster/Endpoint oder Broker
#[embassy_executor::task]
pub async fn status_task(
    profile: Profile,
    pins: IndicatorPins<'static>,
    gpio8: esp_hal::peripherals::GPIO8<'static>,
    rmt_peripheral: esp_hal::peripherals::RMT<'static>,
    display: Lcd,
    source: StatusSource,
) {
    // Buffer für SmartLED Daten (1 LED)
    let mut rmt_buffer = smart_led_buffer!(1);
    let mirror = match RmtLedWriter::new(gpio8, rmt_peripheral, RMT_CLOCK_MHZ, &mut rmt_buffer) {
        Ok(writer) => Some(writer),
        Err(e) => {
            warn!("Status: Onboard LED unavailable: {}", e);
            None
        }
    };

    let leds = GpioIndicator::new(pins, mirror, LED_BRIGHTNESS);
    let mut reconciler = StatusReconciler::new(leds, display, profile);

    if let Err(e) = reconciler.start(now_ms()) {
        error!("Status: Initial render failed: {}", e);
    }
    info!("Status: Reconciler started");

    match source {
        StatusSource::Local { buttons, pending } => {
            run_local(&mut reconciler, buttons, pending).await
        }
        StatusSource::Remote { stack } => run_remote(stack, &mut reconciler).await,
    }
}

/// Lokaler Loop: Taster pollen, setStatus übernehmen, Reconciler ticken
async fn run_local<L: IndicatorLeds, D: CharDisplay>(
    reconciler: &mut StatusReconciler<L, D>,
    buttons: ButtonPanel<'static>,
    pending: &'static PendingStatus,
) -> ! {
    loop {
        // Signal::try_take liest und leert atomar (Copy-on-Read)
        let command = pending.try_take();
        let poll = local_poll(buttons.read(), command);
        log_tick(reconciler.tick(poll, now_ms()));

        Timer::after(Duration::from_millis(LOCAL_POLL_INTERVAL_MS)).await;
    }
}

/// Monotone Zeit seit Start in Millisekunden
pub(crate) fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Loggt das Ergebnis eines Loop-Durchlaufs
///
/// Fehler beim Schreiben werden nur geloggt, der Loop läuft weiter.
pub(crate) fn log_tick(result: Result<Tick, ReconcileError>) {
    match result {
        Ok(Tick::Idle) => {}
        Ok(Tick::Changed { lamp }) => info!("Status: Changed, lamp {}", lamp),
        Ok(Tick::Settled) => info!("Status: Settled message shown"),
        Err(e) => error!("Status: Output failed: {}", e),
    }
}
