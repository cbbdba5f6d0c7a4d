//! Integration tests for the cached scan service: dedupe, refresh, decisions.

mod common;

use common::{universe, Behavior, ScriptedProvider};
use entryscan_core::domain::Signal;
use entryscan_runner::{ScanConfig, ScanService};
use std::sync::Arc;
use std::time::Duration;

const SYMBOLS: [&str; 3] = ["A", "B", "C"];

fn provider() -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::new(&[
        ("A", Behavior::Uptrend),
        ("B", Behavior::Selloff),
        ("C", Behavior::Selloff),
    ]))
}

#[test]
fn repeated_scans_hit_the_cache() {
    let provider = provider();
    let service = ScanService::new(provider.clone(), ScanConfig::default()).unwrap();
    let u = universe(&SYMBOLS);

    let first = service.scan(&u).unwrap();
    let second = service.scan(&u).unwrap();
    assert_eq!(first, second);
    assert_eq!(provider.calls(), SYMBOLS.len());
}

#[test]
fn concurrent_identical_scans_share_one_computation() {
    let provider = Arc::new(
        ScriptedProvider::new(&[("A", Behavior::Selloff), ("B", Behavior::Selloff)])
            .with_delay(Duration::from_millis(100)),
    );
    let service = ScanService::new(provider.clone(), ScanConfig::default()).unwrap();
    let u = universe(&["A", "B"]);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6).map(|_| s.spawn(|| service.scan(&u))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| r.as_ref().unwrap().len() == 2));
    assert_eq!(provider.calls(), 2);
}

#[test]
fn refresh_invalidates_and_recomputes() {
    let provider = provider();
    let service = ScanService::new(provider.clone(), ScanConfig::default()).unwrap();
    let u = universe(&SYMBOLS);

    service.scan(&u).unwrap();
    let refreshed = service.refresh(&u).unwrap();
    assert_eq!(provider.calls(), 2 * SYMBOLS.len());
    assert_eq!(refreshed.shortlist.len(), 2);

    // The refreshed result is cached again.
    service.scan(&u).unwrap();
    assert_eq!(provider.calls(), 2 * SYMBOLS.len());
}

#[test]
fn different_config_is_a_different_key() {
    let provider = provider();
    let u = universe(&SYMBOLS);
    let tight = ScanService::new(provider.clone(), ScanConfig::default()).unwrap();
    let classic = ScanService::new(
        provider.clone(),
        ScanConfig {
            profile: entryscan_core::ScoringProfile::Classic,
            ..ScanConfig::default()
        },
    )
    .unwrap();
    assert_ne!(tight.scan_key(&u), classic.scan_key(&u));
}

#[test]
fn expired_entries_are_recomputed() {
    let provider = provider();
    let config = ScanConfig {
        cache_ttl_secs: 0,
        ..ScanConfig::default()
    };
    let service = ScanService::new(provider.clone(), config).unwrap();
    let u = universe(&SYMBOLS);
    service.scan(&u).unwrap();
    service.scan(&u).unwrap();
    assert_eq!(provider.calls(), 2 * SYMBOLS.len());
}

#[test]
fn largest_configured_ttl_is_served_from_cache() {
    let provider = provider();
    let config = ScanConfig::from_toml("cache_ttl_secs = 9223372036854775807").unwrap();
    let service = ScanService::new(provider.clone(), config).unwrap();
    let u = universe(&SYMBOLS);

    let first = service.scan(&u).unwrap();
    let second = service.scan(&u).unwrap();
    assert_eq!(first, second);
    assert_eq!(provider.calls(), SYMBOLS.len());
}

#[test]
fn decide_on_shortlisted_record() {
    let service = ScanService::new(provider(), ScanConfig::default()).unwrap();
    let shortlist = service.scan(&universe(&SYMBOLS)).unwrap();
    let record = shortlist.get("B").unwrap();

    let decision = service.decide(record);
    assert_eq!(decision.signal, Signal::Buy);
    assert_eq!(decision.entry_price, record.latest_close);
    let sl = decision.stop_loss.unwrap();
    let tp = decision.take_profit.unwrap();
    assert!((sl - record.latest_close * 0.985).abs() < 1e-9);
    assert!((tp - record.latest_close * 1.06).abs() < 1e-9);

    let at_other_price = service.decide_with_price(record, 10.0);
    assert!((at_other_price.stop_loss.unwrap() - 9.85).abs() < 1e-9);
    assert!((at_other_price.take_profit.unwrap() - 10.6).abs() < 1e-9);
}

#[test]
fn hold_below_threshold_has_no_levels() {
    let config = ScanConfig {
        min_confidence: Some(0.0),
        ..ScanConfig::default()
    };
    let service = ScanService::new(provider(), config).unwrap();
    let shortlist = service.scan(&universe(&SYMBOLS)).unwrap();
    let uptrend = shortlist.get("A").unwrap().clone();

    let strict = ScanService::new(provider(), ScanConfig::default()).unwrap();
    let decision = strict.decide(&uptrend);
    assert_eq!(decision.signal, Signal::Hold);
    assert_eq!(decision.stop_loss, None);
    assert_eq!(decision.take_profit, None);
}

#[test]
#[should_panic(expected = "finite positive latest price")]
fn decide_without_valid_price_is_a_programming_error() {
    let service = ScanService::new(provider(), ScanConfig::default()).unwrap();
    let shortlist = service.scan(&universe(&SYMBOLS)).unwrap();
    service.decide_with_price(shortlist.top().unwrap(), f64::NAN);
}
