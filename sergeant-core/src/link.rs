//! Broker-Verbindung: Zustand und Reconnect-Policy
//!
//! Das Gerät hat keinen Fallback ohne Broker. Verbindungsfehler werden
//! deshalb nie nach oben gereicht, sondern mit fester Wartezeit endlos
//! wiederholt. Während der Wartezeit läuft der Reconciler nicht, LEDs und
//! Display zeigen den letzten bekannten Status.

/// Feste Wartezeit zwischen Verbindungsversuchen (kein Backoff, kein Limit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay_ms: u64,
}

impl ReconnectPolicy {
    pub const fn fixed(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    /// Wartezeit vor dem nächsten Versuch, unabhängig von der Anzahl
    pub fn delay_for(&self, _attempt: u32) -> u64 {
        self.delay_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Verfolgt den Verbindungszustand zum Broker
#[derive(Debug, Clone)]
pub struct LinkSupervisor {
    policy: ReconnectPolicy,
    state: LinkState,
    failed_attempts: u32,
}

impl LinkSupervisor {
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: LinkState::Disconnected,
            failed_attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Muss vor dem nächsten Receive verbunden werden?
    pub fn needs_connect(&self) -> bool {
        self.state == LinkState::Disconnected
    }

    /// Fehlgeschlagene Versuche seit der letzten erfolgreichen Verbindung
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Verbindungsversuch fehlgeschlagen, liefert Wartezeit in ms
    pub fn connect_failed(&mut self) -> u64 {
        self.state = LinkState::Disconnected;
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.policy.delay_for(self.failed_attempts)
    }

    /// Verbindung steht, liefert die Anzahl vorheriger Fehlversuche
    pub fn connected(&mut self) -> u32 {
        self.state = LinkState::Connected;
        core::mem::take(&mut self.failed_attempts)
    }

    /// Bestehende Verbindung verloren, liefert Wartezeit in ms
    pub fn connection_lost(&mut self) -> u64 {
        self.state = LinkState::Disconnected;
        self.policy.delay_for(0)
    }

    /// Fehler einer Session einordnen: vor oder nach dem Verbinden
    pub fn session_failed(&mut self) -> u64 {
        match self.state {
            LinkState::Disconnected => self.connect_failed(),
            LinkState::Connected => self.connection_lost(),
        }
    }
}

/// Zeitfenster für das eine Receive eines Durchlaufs
///
/// Innerhalb des Fensters wird nur gelesen, wenn Daten bereitliegen. Ein
/// angefangenes Paket wird so immer komplett gelesen und nie abgebrochen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveWindow {
    deadline_ms: u64,
}

impl ReceiveWindow {
    pub fn open(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            deadline_ms: now_ms.saturating_add(timeout_ms),
        }
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }
}

/// Ping-Zeitplan: nach der halben Keep-Alive Zeit, aber nur in einem
/// Durchlauf ohne empfangene Nachricht
///
/// Während auf PINGRESP gewartet wird, gehen eintreffende Nachrichten
/// verloren. Ein leeres Fenster direkt davor macht das unwahrscheinlich.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingSchedule {
    interval_ms: u64,
    last_ms: u64,
}

impl PingSchedule {
    pub fn new(keep_alive_secs: u16, now_ms: u64) -> Self {
        Self {
            interval_ms: u64::from(keep_alive_secs) * 1000 / 2,
            last_ms: now_ms,
        }
    }

    pub fn due(&self, now_ms: u64, idle: bool) -> bool {
        idle && now_ms.saturating_sub(self.last_ms) >= self.interval_ms
    }

    pub fn pinged(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
        assert!(link.needs_connect());
        assert_eq!(link.failed_attempts(), 0);
    }

    #[test]
    fn test_constant_delay_without_limit() {
        let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
        for _ in 0..1000 {
            assert_eq!(link.connect_failed(), 5000);
        }
        assert_eq!(link.failed_attempts(), 1000);
        assert!(link.needs_connect());
    }

    #[test]
    fn test_connected_resets_attempts() {
        let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
        link.connect_failed();
        link.connect_failed();
        assert_eq!(link.connected(), 2);
        assert_eq!(link.failed_attempts(), 0);
        assert!(!link.needs_connect());
    }

    #[test]
    fn test_session_failed_after_connect_is_lost_connection() {
        let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
        link.connected();
        assert_eq!(link.session_failed(), 5000);
        assert_eq!(link.state(), LinkState::Disconnected);
        // Verlust zählt nicht als Fehlversuch
        assert_eq!(link.failed_attempts(), 0);
    }

    #[test]
    fn test_receive_window_expires_at_deadline() {
        let window = ReceiveWindow::open(1_000, 200);
        assert!(!window.expired(1_000));
        assert!(!window.expired(1_199));
        assert!(window.expired(1_200));
    }

    #[test]
    fn test_ping_at_half_keep_alive() {
        let pings = PingSchedule::new(30, 0);
        assert!(!pings.due(14_999, true));
        assert!(pings.due(15_000, true));
    }

    #[test]
    fn test_ping_waits_for_idle_window() {
        let mut pings = PingSchedule::new(30, 0);
        assert!(!pings.due(20_000, false));
        assert!(pings.due(20_200, true));

        pings.pinged(20_200);
        assert!(!pings.due(20_400, true));
        assert!(pings.due(35_200, true));
    }
}
