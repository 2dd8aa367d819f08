use fnplot::session::{PlotSession, SessionSnapshot};
use fnplot::render::chart::Chart;
use fnplot::state::prepared_input::PlotInput;
use fnplot::state::settings::PlotSettings;
use fnplot::state::viewport::Viewport;

#[test]
fn snapshot_survives_json_exactly() {
    let snapshot = SessionSnapshot {
        input: Some(PlotInput::new("sin(x)/x", "x")),
        viewport: Some(Viewport::new(-0.1 - 0.2, 2.0_f64.sqrt(), -1e-9, 123456.789).unwrap()),
    };
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
    let (a, b) = (back.viewport.unwrap(), snapshot.viewport.unwrap());
    assert_eq!(a.x_min.to_bits(), b.x_min.to_bits());
    assert_eq!(a.x_max.to_bits(), b.x_max.to_bits());
}

#[test]
fn save_and_restore_round_trip() {
    let settings = PlotSettings::default();
    let mut first = PlotSession::new(Chart::new(), settings.clone()).unwrap();
    let saved = Viewport::new(-2.5, 7.0 / 3.0, -1.0, 4.0).unwrap();
    first.restore(SessionSnapshot {
        input: Some(PlotInput::new("x^3", "x")),
        viewport: Some(saved),
    });
    let json = serde_json::to_string(&first.snapshot()).unwrap();
    drop(first);

    let mut second = PlotSession::new(Chart::new(), settings).unwrap();
    second.restore(serde_json::from_str(&json).unwrap());
    assert_eq!(second.viewport(), Some(saved));
    assert_eq!(second.chart().viewport(), saved);
    assert_eq!(second.input().input(), Some(&PlotInput::new("x^3", "x")));
    assert!(second.input().is_from_explicit_args());
}

#[test]
fn display_following_session_saves_no_input() {
    let session = PlotSession::new(Chart::new(), PlotSettings::default()).unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot, SessionSnapshot::default());

    // Older snapshots without fields still load.
    let empty: SessionSnapshot = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, SessionSnapshot::default());
}

#[test]
fn settings_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fnplot.json");
    let settings = PlotSettings {
        steps: 64,
        interpolate: false,
        ..PlotSettings::default()
    };
    settings.save(&path).unwrap();
    assert_eq!(PlotSettings::load(&path).unwrap(), settings);
}
