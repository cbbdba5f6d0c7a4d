//! Property tests for indicator and scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Momentum stays within [0, 100] once defined, undefined before the window
//! 2. Volatility range is non-negative and undefined only before the window
//! 3. The liquidity floor never looks at the bar it is compared against
//! 4. Confidence stays within [0, 96] and is monotone in each condition
//! 5. Decision levels bracket the entry price

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use entryscan_core::domain::{Instrument, PriceBar, PriceSeries, ScoreRecord, Signal};
use entryscan_core::indicators::{Indicator, LiquidityFloor, Momentum, VolatilityRange};
use entryscan_core::scoring::{
    ConfidenceScorer, Perturbation, ScoreInputs, ScoringProfile, CONFIDENCE_CAP,
};
use entryscan_core::{Analyzer, DecisionEngine, RiskParams};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of sane OHLCV bars: (return, upper wick, lower wick, volume).
fn arb_bars(min: usize, max: usize) -> impl Strategy<Value = Vec<PriceBar>> {
    prop::collection::vec(
        (-0.05..0.05_f64, 0.0..0.02_f64, 0.0..0.02_f64, 0.0..1e6_f64),
        min..max,
    )
    .prop_map(|steps| {
        let base = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let mut price = 10.0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (ret, up, down, volume))| {
                let open = price;
                let close = price * (1.0 + ret);
                price = close;
                PriceBar {
                    timestamp: base + Duration::days(i as i64),
                    open,
                    high: open.max(close) * (1.0 + up),
                    low: open.min(close) * (1.0 - down),
                    close,
                    volume,
                }
            })
            .collect()
    })
}

fn arb_inputs() -> impl Strategy<Value = ScoreInputs> {
    (0.0..=100.0_f64, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(momentum, in_demand_zone, gap_flag, volume_spike)| ScoreInputs {
            momentum,
            in_demand_zone,
            gap_flag,
            volume_spike,
        },
    )
}

fn arb_profile() -> impl Strategy<Value = ScoringProfile> {
    prop_oneof![Just(ScoringProfile::Tight), Just(ScoringProfile::Classic)]
}

// ── 1-3. Indicators ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn momentum_bounded_once_defined(bars in arb_bars(2, 120), period in 2usize..30) {
        let values = Momentum::new(period).compute(&bars);
        prop_assert_eq!(values.len(), bars.len());
        for (i, v) in values.iter().enumerate() {
            if i < period {
                prop_assert!(v.is_nan(), "index {} defined before window", i);
            } else {
                prop_assert!((0.0..=100.0).contains(v), "index {} out of range: {}", i, v);
            }
        }
    }

    #[test]
    fn volatility_range_non_negative(bars in arb_bars(2, 120), period in 2usize..30) {
        for (i, v) in VolatilityRange::new(period).compute(&bars).into_iter().enumerate() {
            prop_assert_eq!(v.is_nan(), i < period, "bar {} of {}", i, bars.len());
            prop_assert!(v.is_nan() || v >= 0.0);
        }
    }

    /// Changing the current bar's low never changes its own floor.
    #[test]
    fn floor_excludes_current_bar(bars in arb_bars(25, 80), cut in 0.1..0.9_f64) {
        let floor = LiquidityFloor::new(20);
        let before = floor.compute(&bars);

        let mut altered = bars.clone();
        let last = altered.len() - 1;
        altered[last].low *= cut;
        altered[last].open = altered[last].open.max(altered[last].low);
        let after = floor.compute(&altered);

        prop_assert_eq!(before[last].to_bits(), after[last].to_bits());
        let prior_min = bars[last - 20..last]
            .iter()
            .map(|b| b.low)
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!(after[last], prior_min);
    }
}

// ── 4. Confidence ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn confidence_within_cap(
        profile in arb_profile(),
        inputs in arb_inputs(),
        seed in any::<u64>(),
        perturb in any::<bool>(),
    ) {
        let weights = profile.weights();
        let mut scorer = ConfidenceScorer::new(weights);
        if perturb {
            scorer = scorer.with_perturbation(Perturbation::new(weights.perturbation, seed, "prop"));
        }
        let c = scorer.score("1155.KL", &inputs);
        prop_assert!((0.0..=CONFIDENCE_CAP).contains(&c), "confidence {}", c);
    }

    /// Turning any condition on never lowers the score.
    #[test]
    fn confidence_monotone_in_conditions(profile in arb_profile(), inputs in arb_inputs()) {
        let scorer = ConfidenceScorer::new(profile.weights());
        let base = scorer.score("X", &inputs);

        let zone = ScoreInputs { in_demand_zone: true, ..inputs };
        let gap = ScoreInputs { gap_flag: true, ..inputs };
        let spike = ScoreInputs { volume_spike: true, ..inputs };
        let oversold = ScoreInputs { momentum: 10.0, ..inputs };

        prop_assert!(scorer.score("X", &zone) >= base);
        prop_assert!(scorer.score("X", &gap) >= base);
        prop_assert!(scorer.score("X", &spike) >= base);
        prop_assert!(scorer.score("X", &oversold) >= base);
    }

    /// Analysis of any long-enough sane series yields a bounded score.
    #[test]
    fn analysis_confidence_bounded(bars in arb_bars(30, 90), profile in arb_profile()) {
        let series = PriceSeries::new("SYM", bars).unwrap();
        let analyzer = Analyzer::new(14, 20, ConfidenceScorer::new(profile.weights()));
        let record = analyzer.analyze(&Instrument::new("SYM", "SYM"), &series).unwrap();
        prop_assert!((0.0..=CONFIDENCE_CAP).contains(&record.confidence));
        prop_assert!((0.0..=100.0).contains(&record.momentum_latest));
    }
}

// ── 5. Decisions ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn buy_levels_bracket_price(price in 0.01..10_000.0_f64, confidence in 0.0..=96.0_f64) {
        let engine = DecisionEngine::new(85.0, RiskParams::default());
        let record = ScoreRecord {
            instrument: Instrument::new("X", "X"),
            latest_close: price,
            confidence,
            momentum_latest: 50.0,
            in_demand_zone: false,
            volume_spike: false,
            gap_flag: false,
            volatility_latest: None,
        };
        let d = engine.decide(&record, price);
        prop_assert_eq!(d.entry_price, price);
        match d.signal {
            Signal::Buy => {
                prop_assert!(confidence >= 85.0);
                let sl = d.stop_loss.unwrap();
                let tp = d.take_profit.unwrap();
                prop_assert!(sl < price && price < tp);
            }
            Signal::Hold => {
                prop_assert!(confidence < 85.0);
                prop_assert!(d.stop_loss.is_none() && d.take_profit.is_none());
            }
        }
    }
}
