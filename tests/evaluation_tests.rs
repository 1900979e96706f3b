//! End-to-end scenarios over the pure evaluation core.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use arbwatch::evaluation::performance::{self, cumulative, drawdown_series, max_drawdown, DailyPnl};
use arbwatch::evaluation::signals::{summarize, SignalFilter, TimeWindow};
use arbwatch::evaluation::{
    assess, classify, evaluate_risk, BacktestMetrics, DailyActivity, DeviationLevel,
    DeviationThresholds, RiskAlert, RiskLimits, Verdict,
};
use arbwatch::models::{Signal, SignalLevel, SignalStatus, Trade};

fn signal(id: i64, status: SignalStatus, level: Option<SignalLevel>) -> Signal {
    Signal {
        id,
        market_id: format!("m-{id}"),
        question: None,
        signal_type: "BUY_BOTH".into(),
        confidence: dec!(0.7),
        suggested_amount: None,
        reason: None,
        status,
        level,
        expiry_minutes: None,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(id),
        confirmed_at: None,
        executed_at: None,
    }
}

fn settled(id: i64, day: u32, pnl: Decimal) -> Trade {
    Trade {
        id,
        market_id: "m".into(),
        side: "YES".into(),
        amount: dec!(100),
        price: dec!(0.45),
        pnl: Some(pnl),
        status: "settled".into(),
        created_at: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
    }
}

#[test]
fn test_classifier_boundaries_and_windows() {
    let t = DeviationThresholds::default();

    assert_eq!(classify(dec!(1.49), &t).level, DeviationLevel::None);
    assert_eq!(classify(dec!(1.5), &t).level, DeviationLevel::Conservative);
    assert_eq!(classify(dec!(3), &t).level, DeviationLevel::Aggressive);
    assert_eq!(classify(dec!(5), &t).level, DeviationLevel::Risky);
    assert_eq!(classify(dec!(42), &t).level, DeviationLevel::Risky);

    // more severe tiers stay valid longer
    let windows: Vec<u32> = [dec!(2), dec!(4), dec!(6)]
        .iter()
        .map(|d| classify(*d, &t).validity_minutes.unwrap())
        .collect();
    assert_eq!(windows, vec![3, 5, 10]);
}

#[test]
fn test_drawdown_scenario() {
    let cum = cumulative(&[dec!(10), dec!(-5), dec!(20), dec!(-30), dec!(5)]);
    assert_eq!(cum, vec![dec!(10), dec!(5), dec!(25), dec!(-5), dec!(0)]);

    let dd = drawdown_series(&cum, dec!(1000));
    assert_eq!(dd[0], Decimal::ZERO);
    assert_eq!(dd[2], Decimal::ZERO);
    assert!(dd[1] > dec!(0.49) && dd[1] < dec!(0.50));
    assert!(dd[3] > dec!(2.9) && dd[3] < dec!(2.95));
    assert!(dd[4] > dec!(2.43) && dd[4] < dec!(2.45));

    assert_eq!(max_drawdown(&cum, dec!(1000)), Some(dd[3]));
}

#[test]
fn test_drawdown_never_negative() {
    let rising = cumulative(&[dec!(1), dec!(2), dec!(3)]);
    assert_eq!(max_drawdown(&rising, dec!(1000)), Some(Decimal::ZERO));

    let falling = cumulative(&[dec!(-10), dec!(-20), dec!(-30)]);
    let dd = drawdown_series(&falling, dec!(1000));
    assert!(dd.iter().all(|d| *d >= Decimal::ZERO));
    // peak stays at -10: (-10 - -60) / 990
    assert!(dd[2] > dec!(5.05) && dd[2] < dec!(5.06));
}

#[test]
fn test_performance_over_settled_trades() {
    let mut trades = vec![
        settled(1, 1, dec!(10)),
        settled(2, 2, dec!(-5)),
        settled(3, 3, dec!(20)),
        settled(4, 4, dec!(-30)),
        settled(5, 5, dec!(5)),
    ];
    let mut pending = settled(6, 5, dec!(999));
    pending.status = "pending".into();
    trades.push(pending);

    let summary = performance::summarize(&trades, dec!(1000)).unwrap();
    assert_eq!(summary.total_trades, 5);
    assert_eq!(summary.winning_trades, 3);
    assert_eq!(summary.win_rate, Some(dec!(60)));
    assert_eq!(summary.total_pnl, Some(Decimal::ZERO));
    assert!(summary.max_drawdown.unwrap() > dec!(2.9));

    let history = performance::pnl_history(&performance::daily_pnl(&trades), dec!(1000)).unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[4].cumulative_pnl, Decimal::ZERO);
}

#[test]
fn test_empty_history_is_not_available() {
    let summary = performance::summarize(&[], dec!(1000)).unwrap();
    assert_eq!(summary.total_trades, 0);
    assert!(summary.win_rate.is_none());
    assert!(summary.max_drawdown.is_none());

    let empty: Vec<DailyPnl> = Vec::new();
    assert!(performance::pnl_history(&empty, dec!(1000)).unwrap().is_empty());
    assert!(performance::pnl_history(&empty, Decimal::ZERO).is_err());
}

#[test]
fn test_risk_scenarios() {
    let limits = RiskLimits::default();

    let loss = evaluate_risk(
        &limits,
        &DailyActivity {
            realized_pnl: dec!(-60),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(loss.daily_loss_used_fraction, dec!(1.2));
    assert_eq!(loss.daily_loss_display_fraction, Decimal::ONE);
    assert!(loss.circuit_breaker_tripped);

    let at_cap = DailyActivity {
        confirmed_or_executed_signals: 3,
        ..Default::default()
    };
    assert!(evaluate_risk(&limits, &at_cap).unwrap().circuit_breaker_tripped);

    let below_cap = DailyActivity {
        confirmed_or_executed_signals: 2,
        ..Default::default()
    };
    let status = evaluate_risk(&limits, &below_cap).unwrap();
    assert!(!status.circuit_breaker_tripped);
    assert_eq!(status.alert, RiskAlert::Warning);

    let broke = RiskLimits {
        total_capital: Decimal::ZERO,
        ..RiskLimits::default()
    };
    assert!(evaluate_risk(&broke, &DailyActivity::default()).is_err());
}

#[test]
fn test_signal_execution_rate_scenario() {
    let aggressive = Some(SignalLevel::Aggressive);
    let mut signals = Vec::new();
    let mut id = 0;
    for (status, n) in [
        (SignalStatus::Pending, 2),
        (SignalStatus::Confirmed, 1),
        (SignalStatus::Executed, 5),
        (SignalStatus::Rejected, 1),
    ] {
        for _ in 0..n {
            id += 1;
            signals.push(signal(id, status, aggressive));
        }
    }

    let window = TimeWindow {
        start: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap(),
    };
    let summary = summarize(&signals, &window, &SignalFilter::default());

    let level = &summary.by_level[&SignalLevel::Aggressive];
    assert_eq!(level.total, 9);
    assert_eq!(level.by_status[&SignalStatus::Expired], 0);
    let rate = level.execution_rate.unwrap();
    assert!(rate > dec!(55.5) && rate < dec!(55.6));

    // levels with no signals report N/A
    assert!(summary.by_level[&SignalLevel::Risky].execution_rate.is_none());
}

#[test]
fn test_verdict_rule_order() {
    let excellent = BacktestMetrics {
        total_pnl_percent: dec!(60),
        win_rate: dec!(65),
        sharpe_ratio: dec!(2.0),
        max_drawdown: dec!(5),
    };
    assert_eq!(assess(&excellent).verdict, Verdict::Excellent);

    let deep = BacktestMetrics {
        max_drawdown: dec!(20),
        ..excellent
    };
    assert_eq!(assess(&deep).verdict, Verdict::Mediocre);
}
