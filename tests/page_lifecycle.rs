//! Page lifecycle against the manual host.
//!
//! Mounts and unmounts pages the way a router would and checks that no timer
//! or watcher survives, then walks the countdown, reveal and accordion flows
//! end to end through the public API.
//!
//! Run with: cargo test --test page_lifecycle

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use spark_page::host::manual::ManualHost;
use spark_page::{
    mount, CountdownSnapshot, DisclosureError, PageConfig, RegionId, RevealState, TargetInstant,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 20, 12, 0, 0).unwrap()
}

fn config_with_target(ms_from_start: i64) -> PageConfig {
    let at = start() + chrono::Duration::milliseconds(ms_from_start);
    PageConfig {
        target: TargetInstant::new(at.fixed_offset()),
        ..PageConfig::default()
    }
}

// =============================================================================
// RESOURCE LEAKS
// =============================================================================

#[test]
fn test_repeated_mount_cycles_leak_nothing() {
    let manual = ManualHost::starting_at(start());
    let host = manual.host();
    let config = config_with_target(3_600_000);

    for cycle in 0..50 {
        let page = mount(&config, &host).unwrap();
        assert_eq!(manual.scheduler.active_timers(), 1, "cycle {cycle}");
        assert_eq!(manual.viewport.active_watchers(), config.sections.len(), "cycle {cycle}");

        // Reveal a couple of sections and let the clock tick in between
        manual.viewport.set_visibility(&RegionId::from("countdown"), 1.0);
        manual.scheduler.advance(Duration::from_millis(1_500));
        manual.viewport.set_visibility(&RegionId::from("faq"), 0.3);

        page.unmount();
        assert_eq!(manual.live_resources(), 0, "cycle {cycle}");
    }
}

#[test]
fn test_no_ticks_after_unmount() {
    let manual = ManualHost::starting_at(start());
    let page = mount(&config_with_target(60_000), &manual.host()).unwrap();
    let signal = page.countdown().unwrap().snapshot_signal();

    page.unmount();
    assert_eq!(manual.scheduler.advance(Duration::from_secs(10)), 0);
    assert_eq!(signal.get().minutes, 1);
}

#[test]
fn test_unmount_mid_flight_with_two_pages() {
    let manual = ManualHost::starting_at(start());
    let host = manual.host();
    let home = mount(&config_with_target(120_000), &host).unwrap();
    let other = mount(&config_with_target(240_000), &host).unwrap();
    assert_eq!(manual.scheduler.active_timers(), 2);

    home.unmount();
    manual.scheduler.advance(Duration::from_secs(1));
    assert_eq!(manual.scheduler.active_timers(), 1);
    assert_eq!(
        other.countdown().unwrap().snapshot(),
        CountdownSnapshot {
            days: 0,
            hours: 0,
            minutes: 3,
            seconds: 59,
        }
    );

    drop(other);
    assert_eq!(manual.live_resources(), 0);
}

// =============================================================================
// COUNTDOWN
// =============================================================================

#[test]
fn test_countdown_scenario_one_of_each() {
    let manual = ManualHost::starting_at(start());
    let page = mount(&config_with_target(90_061_001), &manual.host()).unwrap();

    assert_eq!(
        page.snapshot().countdown,
        CountdownSnapshot {
            days: 1,
            hours: 1,
            minutes: 1,
            seconds: 1,
        }
    );
}

#[test]
fn test_countdown_scenario_past_target() {
    let manual = ManualHost::starting_at(start());
    let page = mount(&config_with_target(-5_000), &manual.host()).unwrap();

    assert_eq!(page.snapshot().countdown, CountdownSnapshot::ZERO);
    assert_eq!(manual.scheduler.active_timers(), 0);
    assert_eq!(manual.viewport.active_watchers(), 5);
}

#[test]
fn test_countdown_runs_to_zero_and_stays() {
    let manual = ManualHost::starting_at(start());
    let page = mount(&config_with_target(65_000), &manual.host()).unwrap();

    let mut previous = page.snapshot().countdown.total_seconds();
    for _ in 0..64 {
        manual.scheduler.advance(Duration::from_secs(1));
        let now = page.snapshot().countdown.total_seconds();
        assert_eq!(now + 1, previous);
        previous = now;
    }

    manual.scheduler.advance(Duration::from_secs(1));
    assert!(page.countdown().unwrap().is_expired());
    assert_eq!(manual.scheduler.active_timers(), 0);

    manual.scheduler.advance(Duration::from_secs(3_600));
    assert_eq!(page.snapshot().countdown, CountdownSnapshot::ZERO);
}

#[test]
fn test_workshop_page_after_event_is_zero() {
    let manual = ManualHost::starting_at(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    let page = mount(&PageConfig::default(), &manual.host()).unwrap();

    let digits: Vec<String> = page
        .snapshot()
        .countdown
        .units()
        .iter()
        .map(|unit| unit.padded())
        .collect();
    assert_eq!(digits, ["00", "00", "00", "00"]);
}

// =============================================================================
// REVEAL
// =============================================================================

#[test]
fn test_sections_reveal_once_in_any_order() {
    let manual = ManualHost::starting_at(start());
    let page = mount(&config_with_target(60_000), &manual.host()).unwrap();
    let reveal = page.reveal().unwrap();

    for id in ["faq", "benefits", "countdown"] {
        let region = RegionId::from(id);
        manual.viewport.set_visibility(&region, 0.09);
        assert_eq!(reveal.state(&region), RevealState::Hidden);
        manual.viewport.set_visibility(&region, 0.5);
        assert_eq!(reveal.state(&region), RevealState::Revealed);
        manual.viewport.set_visibility(&region, 0.0);
        assert_eq!(reveal.state(&region), RevealState::Revealed);
    }

    assert_eq!(reveal.revealed_count(), 3);
    assert_eq!(manual.viewport.active_watchers(), 2);
}

// =============================================================================
// DISCLOSURE
// =============================================================================

#[test]
fn test_faq_scenario() {
    let manual = ManualHost::starting_at(start());
    let mut page = mount(&PageConfig::default(), &manual.host()).unwrap();
    let faq = page.faq_mut();

    assert_eq!(faq.open_index(), None);
    assert_eq!(faq.toggle(2), Ok(Some(2)));
    assert_eq!(faq.toggle(4), Ok(Some(4)));
    assert_eq!(faq.toggle(4), Ok(None));
    assert_eq!(
        faq.toggle(7),
        Err(DisclosureError::IndexOutOfRange { index: 7, len: 5 })
    );
}

#[test]
fn test_faq_and_guide_are_independent() {
    let manual = ManualHost::starting_at(start());
    let mut page = mount(&PageConfig::default(), &manual.host()).unwrap();

    page.faq_mut().toggle(0).unwrap();
    page.guide_mut().toggle_key("fusion360").unwrap();

    let snapshot = page.snapshot();
    assert_eq!(snapshot.faq_open, Some(0));
    assert_eq!(snapshot.guide_open, Some(1));

    let open_question = page.faq().open_entry().map(|entry| entry.question.clone());
    assert_eq!(open_question.as_deref(), Some("Who can attend?"));
}

#[test]
fn test_config_from_toml_mounts() {
    let manual = ManualHost::starting_at(start());
    let config = PageConfig::from_toml_str(
        r#"
        title = "Techtonic 2.0"
        target = "2024-09-21T17:30:00+05:30"

        [[sections]]
        id = "countdown"

        [[faq]]
        question = "Who can attend?"
        answer = "Everyone."
        "#,
    )
    .unwrap();

    let page = mount(&config, &manual.host()).unwrap();
    // 2024-09-21T12:00:00Z is exactly one day after start
    assert_eq!(page.snapshot().countdown.days, 1);
    assert_eq!(page.snapshot().countdown.total_seconds(), 86_400);
    assert_eq!(manual.viewport.active_watchers(), 1);
    assert_eq!(page.faq().len(), 1);
}
