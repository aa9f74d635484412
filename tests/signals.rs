//! Integration tests for the analyzer lifecycle: history, export, settings.

use candle_signals::prelude::*;

fn hammer() -> Bar {
    Bar::new(100.0, 100.05, 90.0, 100.0)
        .with_volume(1500.0)
        .with_timestamp(1_700_000_000_000)
}

fn quiet() -> Bar {
    Bar::new(100.0, 102.0, 98.0, 101.0).with_timestamp(1_700_000_060_000)
}

fn engulfing() -> [Bar; 2] {
    [
        Bar::new(100.0, 101.0, 95.0, 96.0).with_timestamp(1_700_000_000_000),
        Bar::new(95.0, 106.0, 94.0, 105.0).with_timestamp(1_700_000_060_000),
    ]
}

#[test]
fn test_history_records_signals_in_order() {
    let mut analyzer = SignalAnalyzer::builder()
        .with_all_defaults()
        .pair("BTC/USD")
        .build()
        .unwrap();

    analyzer.analyze(&[hammer()]);
    analyzer.analyze(&engulfing());
    analyzer.analyze(&[hammer()]);

    let history = analyzer.history();
    assert_eq!(history.len(), 3);
    let patterns: Vec<_> = history.iter().map(|s| s.pattern).collect();
    assert_eq!(
        patterns,
        [
            Some(Pattern::Hammer),
            Some(Pattern::BullishEngulfing),
            Some(Pattern::Hammer)
        ]
    );
    assert!(history.iter().all(|s| s.pair == "BTC/USD"));
}

#[test]
fn test_history_skips_non_signals() {
    let mut analyzer = SignalAnalyzer::new();

    let empty: [Bar; 0] = [];
    assert!(!analyzer.analyze(&empty).is_signal());
    assert!(!analyzer.analyze(&[quiet()]).is_signal());
    assert!(analyzer.history().is_empty());

    analyzer.analyze(&[hammer()]);
    assert_eq!(analyzer.history().len(), 1);
    assert_eq!(analyzer.history().last().unwrap().pattern, Some(Pattern::Hammer));
}

#[test]
fn test_analysis_is_deterministic() {
    let mut a = SignalAnalyzer::new();
    let mut b = SignalAnalyzer::new();
    let bars = engulfing();

    let first = a.analyze(&bars);
    let second = b.analyze(&bars);
    assert_eq!(first, second);
    assert_eq!(first, a.evaluate(&bars));
}

#[test]
fn test_untimestamped_analysis_is_deterministic() {
    let bars = [
        Bar::new(100.0, 101.0, 95.0, 96.0),
        Bar::new(95.0, 106.0, 94.0, 105.0),
    ];
    let mut a = SignalAnalyzer::new();
    let mut b = SignalAnalyzer::new();

    let first = a.analyze(&bars);
    let second = b.analyze(&bars);
    assert_eq!(first.pair, second.pair);
    assert_eq!(first.pattern, second.pattern);
    assert_eq!(first.signal_type, second.signal_type);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.price, second.price);
    assert_eq!(first.volume, second.volume);
    assert_eq!(first.reason, second.reason);

    // Timestamps fall back to wall-clock time; identical once aligned
    let aligned = Signal {
        timestamp: first.timestamp,
        ..second
    };
    assert_eq!(first, aligned);
}

#[test]
fn test_signal_carries_bar_fields() {
    let signal = SignalAnalyzer::new().evaluate(&[hammer()]);

    assert_eq!(signal.pair, "UNKNOWN");
    assert_eq!(signal.price, 100.0);
    assert_eq!(signal.volume, 1500.0);
    assert_eq!(signal.timestamp.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(signal.reason, None);
}

#[test]
fn test_history_summary() {
    let mut analyzer = SignalAnalyzer::new();
    analyzer.analyze(&[hammer()]);
    analyzer.analyze(&[Bar::new(100.0, 110.0, 100.0, 100.0)]);
    analyzer.analyze(&engulfing());

    let summary = analyzer.history().summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.buys, 2);
    assert_eq!(summary.sells, 1);
    assert_eq!(summary.holds, 0);
    assert_eq!(summary.by_pattern["Gravestone Doji"], 1);
    assert!((summary.average_confidence - 0.75).abs() < 1e-9);
}

#[test]
fn test_export_and_load_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("signals.json");

    let mut analyzer = SignalAnalyzer::builder()
        .with_all_defaults()
        .pair("ETH/USD")
        .build()
        .unwrap();
    analyzer.analyze(&[hammer()]);
    analyzer.analyze(&engulfing());
    analyzer.export_history(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entries = raw.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["pattern"], "Hammer");
    assert_eq!(entries[0]["type"], "BUY");
    assert_eq!(entries[1]["pattern"], "Bullish Engulfing");

    let loaded = SignalHistory::load_json(&path).unwrap();
    assert_eq!(&loaded, analyzer.history());
}

#[test]
fn test_bad_volume_never_reaches_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signals.json");

    let mut analyzer = SignalAnalyzer::new();
    for volume in [f64::NAN, -5.0] {
        let signal = analyzer.analyze(&[hammer().with_volume(volume)]);
        assert!(!signal.is_signal());
        assert!(signal.reason.unwrap().starts_with("Malformed candle data"));
    }
    analyzer.analyze(&[hammer()]);
    assert_eq!(analyzer.history().len(), 1);

    analyzer.export_history(&path).unwrap();
    let loaded = SignalHistory::load_json(&path).unwrap();
    assert_eq!(&loaded, analyzer.history());
}

#[test]
fn test_export_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.json");

    SignalAnalyzer::new().export_history(&path).unwrap();
    let loaded = SignalHistory::load_json(&path).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SignalHistory::load_json(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, PatternError::Io(_)));
}

#[test]
fn test_settings_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analyzer.toml");
    std::fs::write(
        &path,
        r#"
pair = "SOL/USD"
enabled_rules = ["hammer", "bullish_engulfing"]

[rules.hammer]
confidence = 0.9
"#,
    )
    .unwrap();

    let settings = AnalyzerSettings::from_file(&path).unwrap();
    let mut analyzer = settings.build().unwrap();
    assert_eq!(analyzer.rules().len(), 2);

    let signal = analyzer.analyze(&[hammer()]);
    assert_eq!(signal.pair, "SOL/USD");
    assert_eq!(signal.pattern, Some(Pattern::Hammer));
    assert_eq!(signal.confidence, 0.9);

    // Doji rule disabled, so a gravestone bar yields nothing
    let signal = analyzer.analyze(&[Bar::new(100.0, 110.0, 100.0, 100.0)]);
    assert!(!signal.is_signal());
    assert_eq!(analyzer.history().len(), 1);
}

#[test]
fn test_settings_tie_break_by_rule_order() {
    // Hammer lowered to the Dragonfly Doji confidence
    let settings = AnalyzerSettings::from_toml_str("[rules.hammer]\nconfidence = 0.7").unwrap();
    let analyzer = AnalyzerBuilder::from_config(&settings)
        .unwrap()
        .pair("ADA/USD")
        .build()
        .unwrap();

    let signal = analyzer.evaluate(&[hammer()]);
    assert_eq!(signal.pattern, Some(Pattern::Hammer));
    assert_eq!(signal.confidence, 0.7);
    assert_eq!(signal.pair, "ADA/USD");
}

#[test]
fn test_bars_from_json() {
    let bars: Vec<Bar> = serde_json::from_str(
        r#"[
            {"open": 100.0, "high": 101.0, "low": 95.0, "close": 96.0},
            {"open": 95.0, "high": 106.0, "low": 94.0, "close": 105.0, "volume": 42.0}
        ]"#,
    )
    .unwrap();

    let signal = SignalAnalyzer::new().evaluate(&bars);
    assert_eq!(signal.pattern, Some(Pattern::BullishEngulfing));
    assert_eq!(signal.volume, 42.0);
}
