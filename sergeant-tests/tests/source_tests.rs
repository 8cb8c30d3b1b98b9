//! Integration Tests für Status-Quellen, setStatus Endpoint und Broker-Link
//!
//! Simuliert die Loops der Firmware-Tasks auf dem Host

use std::collections::VecDeque;

use sergeant_core::{
    ButtonLevels, CharDisplay, CommandError, DisplayError, IndicatorLeds, Lamp, LedError,
    LinkSupervisor, PingSchedule, Profile, ReceiveWindow, ReconnectPolicy, SourcePoll, StatusReconciler, StatusValue, Tick,
    command_return_code, local_poll, parse_set_status, receive_outcome,
};

// ============================================================================
// Mock Hardware (nur Zähler, Details testet reconciler_tests)
// ============================================================================

#[derive(Default)]
struct CountingLeds {
    states: [bool; 3],
    writes: usize,
}

impl IndicatorLeds for CountingLeds {
    fn set_lamp(&mut self, lamp: Lamp, on: bool) -> Result<(), LedError> {
        self.states[lamp.index()] = on;
        self.writes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct CountingDisplay {
    top: String,
    row: u8,
    writes: usize,
}

impl CharDisplay for CountingDisplay {
    fn set_cursor(&mut self, _col: u8, row: u8) -> Result<(), DisplayError> {
        self.row = row;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.row == 0 {
            self.top = text.trim_end().to_string();
        }
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Fake Broker
// ============================================================================

/// Broker der die ersten `refuse` Verbindungsversuche ablehnt
struct FakeBroker {
    refuse: u32,
    connect_attempts: u32,
    connected: bool,
    inbox: VecDeque<Vec<u8>>,
}

impl FakeBroker {
    fn new(refuse: u32) -> Self {
        Self {
            refuse,
            connect_attempts: 0,
            connected: false,
            inbox: VecDeque::new(),
        }
    }

    fn connect(&mut self) -> Result<(), ()> {
        self.connect_attempts += 1;
        if self.connect_attempts <= self.refuse {
            return Err(());
        }
        self.connected = true;
        Ok(())
    }

    /// Receive mit Timeout: None = nichts angekommen
    fn receive(&mut self) -> Option<Vec<u8>> {
        self.inbox.pop_front()
    }
}

/// Nachbau des Remote-Loops: erst verbinden (mit fester Wartezeit), dann
/// pro Durchlauf genau ein Receive + Tick. Liefert die Wartezeiten.
fn run_remote(
    broker: &mut FakeBroker,
    link: &mut LinkSupervisor,
    reconciler: &mut StatusReconciler<CountingLeds, CountingDisplay>,
    clock: &mut u64,
    ticks: usize,
) -> Vec<u64> {
    let mut waits = Vec::new();
    while link.needs_connect() {
        match broker.connect() {
            Ok(()) => {
                link.connected();
            }
            Err(()) => {
                let delay = link.connect_failed();
                waits.push(delay);
                *clock += delay;
            }
        }
    }
    for _ in 0..ticks {
        let payload = broker.receive();
        *clock += 200;
        let poll = receive_outcome(payload.as_deref());
        reconciler.tick(poll, *clock).unwrap();
    }
    waits
}

// ============================================================================
// Tests: setStatus Endpoint
// ============================================================================

#[test]
fn test_set_status_purple_rejected_state_unchanged() {
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::local(),
    );
    r.start(0).unwrap();
    r.tick(local_poll(ButtonLevels::default(), Some(Lamp::Red)), 10)
        .unwrap();
    let leds_before = r.leds().writes;

    let result = parse_set_status("purple");
    assert_eq!(result, Err(CommandError::UnknownStatus));
    assert_eq!(command_return_code(&result), -1);

    // Abgelehntes Kommando wird nicht weitergereicht
    let pending = result.ok();
    let tick = r.tick(local_poll(ButtonLevels::default(), pending), 20).unwrap();
    assert_eq!(tick, Tick::Idle);
    assert_eq!(r.state().status, StatusValue::Mode(Lamp::Red));
    assert_eq!(r.leds().writes, leds_before);
}

#[test]
fn test_set_status_accepted_switches_mode() {
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::local(),
    );
    r.start(0).unwrap();

    let result = parse_set_status("blue");
    assert_eq!(command_return_code(&result), 1);

    r.tick(local_poll(ButtonLevels::default(), result.ok()), 10)
        .unwrap();
    assert_eq!(r.state().status, StatusValue::Mode(Lamp::Blue));
    assert_eq!(r.leds().states, [false, false, true]);
    assert_eq!(r.display().top, "Blue Mode");
}

#[test]
fn test_last_writer_wins_within_tick() {
    let held_green = ButtonLevels {
        green: true,
        ..Default::default()
    };
    assert_eq!(
        local_poll(held_green, parse_set_status("red").ok()),
        SourcePoll::Received(StatusValue::Mode(Lamp::Green))
    );
}

// ============================================================================
// Tests: Broker-Link
// ============================================================================

#[test]
fn test_disconnected_broker_retries_without_output_changes() {
    let mut broker = FakeBroker::new(7);
    let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::remote(10_000),
    );
    r.start(0).unwrap();
    let led_writes = r.leds().writes;
    let display_writes = r.display().writes;
    let mut clock = 0;

    let waits = run_remote(&mut broker, &mut link, &mut r, &mut clock, 0);

    assert_eq!(waits, vec![5000; 7]);
    assert_eq!(broker.connect_attempts, 8);
    assert!(broker.connected);
    assert!(!link.needs_connect());
    assert_eq!(link.failed_attempts(), 0);

    // Während der Wiederholungen keine Ausgabe
    assert_eq!(r.leds().writes, led_writes);
    assert_eq!(r.display().writes, display_writes);
    assert_eq!(r.display().top, "Study Sergeant");
}

#[test]
fn test_remote_loop_studying_then_silence() {
    let mut broker = FakeBroker::new(0);
    broker.inbox.push_back(b"Studying".to_vec());
    let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::remote(10_000),
    );
    r.start(0).unwrap();
    let mut clock = 0;

    run_remote(&mut broker, &mut link, &mut r, &mut clock, 1);
    assert_eq!(r.leds().states, [true, false, false]);
    assert_eq!(r.display().top, "Status:");

    // 60 Durchläufe à 200 ms = 12 s ohne neue Nachricht
    run_remote(&mut broker, &mut link, &mut r, &mut clock, 60);
    assert_eq!(r.display().top, "Great Job!");
    assert!(r.state().message_shown);
}

#[test]
fn test_lost_connection_keeps_last_status() {
    let mut broker = FakeBroker::new(0);
    broker.inbox.push_back(b"On Phone".to_vec());
    let mut link = LinkSupervisor::new(ReconnectPolicy::fixed(5000));
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::remote(10_000),
    );
    r.start(0).unwrap();
    let mut clock = 0;
    run_remote(&mut broker, &mut link, &mut r, &mut clock, 1);

    assert_eq!(link.session_failed(), 5000);
    broker.connected = false;
    broker.refuse = broker.connect_attempts + 2;

    let waits = run_remote(&mut broker, &mut link, &mut r, &mut clock, 0);
    assert_eq!(waits, vec![5000, 5000]);
    assert_eq!(r.leds().states, [false, true, false]);
    assert_eq!(r.state().status, StatusValue::feed("On Phone"));
}

#[test]
fn test_receive_window_lasts_timeout() {
    let window = ReceiveWindow::open(5_000, 200);
    let polls_until_expired = (0..)
        .map(|i| 5_000 + i * 10)
        .take_while(|t| !window.expired(*t))
        .count();
    assert_eq!(polls_until_expired, 20);
}

#[test]
fn test_ping_deferred_while_messages_arrive() {
    let mut r = StatusReconciler::new(
        CountingLeds::default(),
        CountingDisplay::default(),
        Profile::remote(10_000),
    );
    r.start(0).unwrap();
    let mut pings = PingSchedule::new(30, 0);
    let mut pinged_at = Vec::new();

    // 40 s Loop, von 15.0 s bis 15.4 s kommt in jedem Durchlauf eine Nachricht
    let mut clock = 0;
    while clock < 40_000 {
        clock += 200;
        let poll = if (15_000..=15_400).contains(&clock) {
            receive_outcome(Some(b"Studying".as_slice()))
        } else {
            SourcePoll::NoUpdate
        };
        let idle = poll == SourcePoll::NoUpdate;
        r.tick(poll, clock).unwrap();

        if pings.due(clock, idle) {
            pinged_at.push(clock);
            pings.pinged(clock);
        }
    }

    assert_eq!(pinged_at, vec![15_600, 30_600]);
    assert_eq!(r.state().status, StatusValue::feed("Studying"));
}
