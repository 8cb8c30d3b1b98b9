// MQTT Feed - Empfängt den Status-Text vom Broker
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use sergeant_core::{
    CharDisplay, IndicatorLeds, LinkSupervisor, PingSchedule, ReceiveWindow, ReconnectPolicy,
    SourcePoll, StatusReconciler, receive_outcome,
};

use crate::config::*;
use crate::tasks::status::{log_tick, now_ms};
use crate::tasks::wifi::wait_for_network;

/// Remote-Loop - läuft endlos im Status Task
///
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit dem Broker und abonniert den Status-Feed
/// - Pro Durchlauf genau ein Receive (200 ms Fenster) + ein Tick
/// - Bei Fehlern: feste Wartezeit, dann neuer Versuch (ohne Limit)
///
/// Solange keine Verbindung steht, wird nicht getickt. LEDs und Display
/// behalten den letzten Status.
pub async fn run_remote<L: IndicatorLeds, D: CharDisplay>(
    stack: &'static Stack<'static>,
    reconciler: &mut StatusReconciler<L, D>,
) -> ! {
    let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(MQTT_RECONNECT_DELAY_SECS * 1000));

    info!("MQTT: Waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match feed_session(stack, &mut link, reconciler).await {
            Ok(()) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        let delay_ms = link.session_failed();
        info!(
            "MQTT: Reconnecting in {} ms (failed attempts: {})",
            delay_ms,
            link.failed_attempts()
        );
        Timer::after(Duration::from_millis(delay_ms)).await;
    }
}

/// Eine Broker-Session vom DNS Lookup bis zum ersten Fehler
///
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen
/// 3. MQTT CONNECT (mit Benutzername/Passwort) senden
/// 4. Status-Topic abonnieren
/// 5. Receive/Tick Loop, Ping nach halber Keep-Alive Zeit in einem
///    Durchlauf ohne Nachricht
async fn feed_session<L: IndicatorLeds, D: CharDisplay>(
    stack: &'static Stack<'static>,
    link: &mut LinkSupervisor,
    reconciler: &mut StatusReconciler<L, D>,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; MQTT_TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(MQTT_SOCKET_TIMEOUT_SECS)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.add_username(MQTT_USERNAME);
    config.add_password(MQTT_PASSWORD);
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker");

    client
        .subscribe_to_topic(MQTT_TOPIC_STATUS)
        .await
        .map_err(|_| MqttError::SubscribeFailed)?;
    info!("MQTT: Subscribed to '{}'", MQTT_TOPIC_STATUS);

    let retries = link.connected();
    if retries > 0 {
        info!("MQTT: Reconnected after {} failed attempts", retries);
    }

    let mut pings = PingSchedule::new(MQTT_KEEP_ALIVE_SECS, now_ms());

    loop {
        // Genau ein Receive pro Durchlauf. Gelesen wird nur wenn Daten
        // bereitliegen, ein Paket wird nie mittendrin abgebrochen.
        let window = ReceiveWindow::open(now_ms(), FEED_RECEIVE_TIMEOUT_MS);
        let poll = loop {
            match client.receive_message_if_ready().await {
                Ok(Some((topic, payload))) => break feed_poll(topic, payload),
                Ok(None) if window.expired(now_ms()) => break SourcePoll::NoUpdate,
                Ok(None) => Timer::after(Duration::from_millis(FEED_READY_POLL_MS)).await,
                Err(_) => return Err(MqttError::ReceiveFailed),
            }
        };

        let idle = poll == SourcePoll::NoUpdate;
        log_tick(reconciler.tick(poll, now_ms()));

        if pings.due(now_ms(), idle) {
            client
                .send_ping()
                .await
                .map_err(|_| MqttError::PingFailed)?;
            pings.pinged(now_ms());
        }
    }
}

/// Nachricht vom Broker auf das Status-Topic filtern
fn feed_poll(topic: &str, payload: &[u8]) -> SourcePoll {
    if topic == MQTT_TOPIC_STATUS {
        info!("MQTT: Received {} bytes", payload.len());
        receive_outcome(Some(payload))
    } else {
        warn!("MQTT: Ignoring message on '{}'", topic);
        SourcePoll::NoUpdate
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => addrs
            .iter()
            .find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            })
            .ok_or(MqttError::DnsResolutionFailed),
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
///
/// Alle Fehler beenden die Session, der Remote-Loop verbindet neu.
#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PingFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PingFailed => defmt::write!(fmt, "Ping failed"),
        }
    }
}
