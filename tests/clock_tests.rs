use rautoclock::core::clock::{
    ClockController, DoubleClock, IdleOutcome, IdleProgress, IdleSettings, progress_percent,
};
use rautoclock::core::login::LoginController;
use rautoclock::core::selectors as sel;
use rautoclock::errors::AppError;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

mod common;
use common::{
    FakePortal, PortalScript, RecordingNotifier, credentials, fast_idle, keys_event, session,
};

fn not_cancelled() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn test_clock_in_without_double_clock_popup() {
    let (portal, log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    let double_clock = clock.clock_in(&mut session).unwrap();

    assert_eq!(double_clock, DoubleClock::Absent);
    assert!(clock.record().clock_in_time().is_some());
    assert!(!clock.record().clock_in_synthetic());
    assert!(clock.record().clock_out_time().is_none());

    let menu = log.position(&keys_event(sel::PUNCH_MENU_ID)).unwrap();
    let punch = log.position(&keys_event(sel::PUNCH_IN_ID)).unwrap();
    assert!(menu < punch);
    assert!(!log.contains(&keys_event(sel::DOUBLE_CLOCK_OK_ID)));
}

#[test]
fn test_clock_in_dismisses_double_clock_popup() {
    let (portal, log) = FakePortal::new(PortalScript {
        double_clock_popup: true,
        ..PortalScript::default()
    });
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    let double_clock = clock.clock_in(&mut session).unwrap();

    assert_eq!(double_clock, DoubleClock::Dismissed);
    assert!(clock.record().clock_in_time().is_some());
    let ok = log.position(&keys_event(sel::DOUBLE_CLOCK_OK_ID)).unwrap();
    let back = log.position(&keys_event(sel::DOUBLE_CLOCK_BACK_ID)).unwrap();
    assert!(ok < back);
}

#[test]
fn test_clock_in_reports_double_clock_confirmed_without_back() {
    let (portal, log) = FakePortal::new(PortalScript {
        double_clock_popup: true,
        double_clock_without_back: true,
        ..PortalScript::default()
    });
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    let double_clock = clock.clock_in(&mut session).unwrap();

    assert_eq!(double_clock, DoubleClock::Confirmed);
    assert!(clock.record().clock_in_time().is_some());
    assert!(log.contains(&keys_event(sel::DOUBLE_CLOCK_OK_ID)));
    assert!(!log.contains(&keys_event(sel::DOUBLE_CLOCK_BACK_ID)));
}

#[test]
fn test_idle_requires_clock_in() {
    let (portal, _log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    let err = clock.idle(&mut session, 1.0).unwrap_err();
    assert!(matches!(err, AppError::PunchState(_)));
}

#[test]
fn test_idle_refreshes_and_dismisses_timeout_popup() {
    let (portal, log) = FakePortal::new(PortalScript {
        session_timeout_popup: true,
        ..PortalScript::default()
    });
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    clock.clock_in(&mut session).unwrap();
    let refreshes_after_login = log.count("refresh");

    let outcome = clock.idle(&mut session, 0.05).unwrap();

    assert_eq!(outcome, IdleOutcome::Completed);
    assert!(log.count("refresh") > refreshes_after_login);
    assert!(log.contains(&keys_event(sel::SESSION_TIMEOUT_POPUP_ID)));
}

#[test]
fn test_idle_without_popup_keeps_going() {
    let (portal, log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    clock.clock_in(&mut session).unwrap();
    let outcome = clock.idle(&mut session, 0.05).unwrap();

    assert_eq!(outcome, IdleOutcome::Completed);
    assert!(!log.contains(&keys_event(sel::SESSION_TIMEOUT_POPUP_ID)));
}

#[test]
fn test_idle_reports_progress_while_holding() {
    let (portal, _log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    clock.clock_in(&mut session).unwrap();
    assert_eq!(clock.progress(), None);
    clock.idle(&mut session, 0.05).unwrap();

    let progress = clock.progress().unwrap();
    assert_eq!(progress.total_secs, 0.05);
    assert!(progress.elapsed_secs > 0.0);
    assert!(progress.percent() > 0.0 && progress.percent() <= 100.0);
}

#[test]
fn test_progress_line_shows_elapsed_remaining_and_percent() {
    let quarter = IdleProgress {
        elapsed_secs: 2.0 * 3600.0,
        total_secs: 8.0 * 3600.0,
    };
    assert_eq!(
        quarter.to_string(),
        "Clocking: 02h 00m elapsed, 06h 00m remaining (25.0%)"
    );

    let overrun = IdleProgress {
        elapsed_secs: 100.0,
        total_secs: 60.0,
    };
    assert_eq!(overrun.remaining_secs(), 0.0);
    assert_eq!(overrun.percent(), 100.0);
}

#[test]
fn test_idle_stops_when_cancelled() {
    let (portal, log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let cancel = Arc::new(AtomicBool::new(true));
    let mut clock = ClockController::new(&login, fast_idle(), cancel);

    clock.clock_in(&mut session).unwrap();
    let before = log.len();
    let outcome = clock.idle(&mut session, 3600.0).unwrap();

    assert_eq!(outcome, IdleOutcome::Interrupted);
    assert_eq!(log.len(), before);
}

#[test]
fn test_clock_out_records_elapsed() {
    let (portal, log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    clock.clock_in(&mut session).unwrap();
    std::thread::sleep(Duration::from_millis(20));
    clock.clock_out(&mut session).unwrap();

    let record = clock.record();
    let start = record.clock_in_time().unwrap();
    let end = record.clock_out_time().unwrap();
    let elapsed = record.elapsed_seconds().unwrap();
    assert!(elapsed >= 0.02);
    assert!(
        (elapsed - (end - start).num_microseconds().unwrap() as f64 / 1e6).abs() < 1e-9
    );
    assert!(log.contains(&keys_event(sel::PUNCH_OUT_ID)));
}

#[test]
fn test_clock_out_after_skipped_clock_in() {
    let (portal, log) = FakePortal::stock();
    let mut session = session(portal);
    let creds = credentials();
    let notifier = RecordingNotifier::default();
    let login = LoginController::new(&creds, &notifier);
    let mut clock = ClockController::new(&login, fast_idle(), not_cancelled());

    clock.skip_clock_in().unwrap();
    clock.clock_out(&mut session).unwrap();

    assert!(clock.record().clock_in_synthetic());
    assert!(clock.record().elapsed_seconds().is_some());
    assert!(!log.contains(&keys_event(sel::PUNCH_IN_ID)));
}

#[test]
fn test_keepalive_cadence_in_ticks() {
    let default = IdleSettings::default();
    assert_eq!(default.tick, Duration::from_millis(600));
    assert_eq!(default.ticks_per_keepalive(), 1500);

    let odd = IdleSettings {
        tick: Duration::from_secs(10),
        keepalive_every: Duration::from_secs(1),
        progress_every: Duration::from_secs(60),
    };
    assert_eq!(odd.ticks_per_keepalive(), 1);
    assert_eq!(odd.ticks_per_progress(), 6);
    assert_eq!(default.ticks_per_progress(), 500);
}

#[test]
fn test_progress_percent_is_clamped() {
    assert_eq!(progress_percent(30.0, 60.0), 50.0);
    assert_eq!(progress_percent(120.0, 60.0), 100.0);
    assert_eq!(progress_percent(5.0, 0.0), 100.0);
}
