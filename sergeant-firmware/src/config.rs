// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
//
// GPIO-Belegung (ESP32-C6 DevKit):
//   LEDs:    GPIO0 = Grün, GPIO1 = Rot, GPIO2 = Blau (Anode an GPIO, Kathode über Widerstand an GND)
//   Taster:  GPIO3 = Blau, GPIO4 = Grün, GPIO5 = Rot (gegen GND, interner Pull-Up)
//   LCD:     RS = GPIO6, EN = GPIO7, D4..D7 = GPIO18..GPIO21, RW an GND
//   Onboard: GPIO8 = WS2812 RGB LED (Spiegel des Indikators)

// ============================================================================
// Status-Variante
// ============================================================================

/// Status-Quelle: "local" (Taster + setStatus) oder "remote" (MQTT Feed)
/// Optional in .env als STATUS_SOURCE, Default "local"
pub const STATUS_SOURCE: &str = match option_env!("STATUS_SOURCE") {
    Some(source) => source,
    None => "local",
};

/// Display-Verhalten: "immediate" oder "settled" (Meldung nach Ruhezeit)
/// Optional in .env als DISPLAY_POLICY, Default "immediate"
pub const DISPLAY_POLICY: &str = match option_env!("DISPLAY_POLICY") {
    Some(policy) => policy,
    None => "immediate",
};

/// Ruhezeit bis zur ausführlichen Meldung in Millisekunden
pub const STATUS_SETTLE_DELAY_MS: u64 = 10_000;

/// Poll-Intervall der lokalen Taster in Millisekunden
pub const LOCAL_POLL_INTERVAL_MS: u64 = 20;

// ============================================================================
// LED Konfiguration
// ============================================================================

/// Helligkeits-Level für die Onboard RGB LED (0-255)
/// Wert ist gedimmt für Augenschonung
pub const LED_BRIGHTNESS: u8 = 10;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach WiFi-Fehler in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
///
/// Achtung: rust-mqtt spricht nur MQTT v5. Broker die nur 3.1.1 anbieten
/// (z.B. io.adafruit.com) lehnen das CONNECT ab. Dann den Feed über einen
/// v5-fähigen Broker (z.B. Mosquitto als Bridge) bereitstellen.
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Benutzername (z.B. Feed-Account)
pub const MQTT_USERNAME: &str = env!(
    "MQTT_USERNAME",
    "MQTT Username nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Passwort / API-Key
pub const MQTT_PASSWORD: &str = env!(
    "MQTT_PASSWORD",
    "MQTT Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Topic mit dem Status-Text (z.B. "<user>/feeds/devicestatus")
pub const MQTT_TOPIC_STATUS: &str = env!(
    "MQTT_TOPIC_STATUS",
    "MQTT Topic Status nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Feste Wartezeit zwischen Verbindungsversuchen in Sekunden
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// Timeout für ein einzelnes Receive in Millisekunden
/// Danach läuft der Loop weiter (Settle-Timer)
pub const FEED_RECEIVE_TIMEOUT_MS: u64 = 200;

/// Abstand der Bereitschafts-Abfragen innerhalb des Receive-Fensters
pub const FEED_READY_POLL_MS: u64 = 10;

/// MQTT Keep-Alive in Sekunden, Ping nach der Hälfte
pub const MQTT_KEEP_ALIVE_SECS: u16 = 30;

/// Socket-Timeout (Inaktivität) in Sekunden
pub const MQTT_SOCKET_TIMEOUT_SECS: u64 = 60;

/// MQTT Buffer-Größe in Bytes
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// TCP Buffer-Größe für die Broker-Verbindung in Bytes
pub const MQTT_TCP_BUFFER_SIZE: usize = 4096;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// HTTP Server Konfiguration (setStatus Endpoint)
// ============================================================================

/// HTTP Port
pub const HTTP_PORT: u16 = 80;

/// Anzahl paralleler HTTP Server Tasks
pub const HTTP_TASK_POOL_SIZE: usize = 2;

/// HTTP Buffer-Größe in Bytes
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;
