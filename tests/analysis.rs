use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;

use seo_forecast::config::{ForecastConfig, OptionOverrides};
use seo_forecast::ctr::CtrSource;
use seo_forecast::dataset::{KeywordRow, RawTable};
use seo_forecast::projection::ConversionRates;
use seo_forecast::report::UNCLUSTERED;
use seo_forecast::scenario::ScenarioId;
use seo_forecast::timeline::{GrowthCurve, TimelineMode};
use seo_forecast::{analyze, analyze_rows, AnalysisOptions, ProjectionError};

const SAMPLE: &str = "\
Keyword,Search Volume,Clicks,Position,Cluster,Search Intent
running shoes,1000,20,5,shoes,transactional
trail shoes,500,3,25,shoes,commercial
how to lace shoes,2000,40,12,,informational
";

fn options(scenario: ScenarioId) -> AnalysisOptions {
    AnalysisOptions {
        scenario_id: scenario,
        random_seed: Some(42),
        ..AnalysisOptions::default()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn improve_by_one_projects_documented_example() {
    let rows = vec![KeywordRow::new("kw", 1000.0, 5.0).with_clicks(80.0)];
    let report = analyze_rows(&rows, &options(ScenarioId::ImproveOne), &mut rng()).unwrap();
    let row = &report.rows[0];

    assert_eq!(row.adjusted_position, 4.0);
    assert!((row.potential_ctr - 0.15).abs() < 1e-9);
    assert!((row.potential_traffic - 150.0).abs() < 1e-6);
    assert!((row.potential_conversions - 3.75).abs() < 1e-6);
    assert!((row.current_conversions - 2.0).abs() < 1e-6);
    assert!(!row.ctr_fallback);
}

#[test]
fn page_two_lift_is_seeded_and_in_range() {
    let rows = vec![KeywordRow::new("kw", 1000.0, 25.0)];
    let opts = options(ScenarioId::PageTwo);

    let first = analyze_rows(&rows, &opts, &mut StdRng::seed_from_u64(42)).unwrap();
    let second = analyze_rows(&rows, &opts, &mut StdRng::seed_from_u64(42)).unwrap();
    let row = &first.rows[0];

    assert_eq!(row.adjusted_position, second.rows[0].adjusted_position);
    assert!((11.0..=20.0).contains(&row.adjusted_position));
    assert!((row.potential_ctr - 0.02).abs() < 1e-9);
    assert!(!row.ctr_fallback);
}

#[test]
fn analyze_with_seed_is_reproducible() {
    let table = RawTable::from_csv_str(SAMPLE).unwrap();
    let opts = options(ScenarioId::PageOne);

    let a = analyze(&table, &opts).unwrap();
    let b = analyze(&table, &opts).unwrap();
    let positions = |report: &seo_forecast::AnalysisReport| {
        report
            .rows
            .iter()
            .map(|row| row.adjusted_position)
            .collect::<Vec<_>>()
    };
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn missing_search_volume_is_a_schema_error() {
    let table = RawTable::from_csv_str("Keyword,Clicks,Position\nshoes,10,4\n").unwrap();
    match analyze(&table, &AnalysisOptions::default()) {
        Err(ProjectionError::Schema { missing }) => {
            assert_eq!(missing, vec!["Search Volume".to_string()]);
        }
        other => panic!("expected schema error, got {:?}", other.map(|r| r.rows.len())),
    }
}

#[test]
fn schema_error_lists_every_missing_column() {
    let table = RawTable::from_csv_str("Keyword\nshoes\n").unwrap();
    let err = table.keyword_rows().unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing required columns: Search Volume, Clicks, Position"
    );
}

#[test]
fn column_aliases_normalise_to_internal_schema() {
    let csv = "\
keyword,Monthly Search Volume per Keyword,Current Clicks per Month,Current Ranking Position,Intent
shoes,\"1,200\",15,8,Transactional
";
    let rows = RawTable::from_csv_str(csv).unwrap().keyword_rows().unwrap();
    let row = &rows[0];

    assert_eq!(row.keyword, "shoes");
    assert_eq!(row.search_volume, 1200.0);
    assert_eq!(row.current_clicks, Some(15.0));
    assert_eq!(row.current_position, 8.0);
    assert_eq!(row.search_intent.as_deref(), Some("Transactional"));
    assert_eq!(row.cluster, None);
    assert_eq!(row.row, 1);
}

#[test]
fn invalid_rows_are_isolated_not_zeroed() {
    let csv = "\
Keyword,Search Volume,Clicks,Position
good,1000,10,5
bad volume,lots,10,5
bad position,1000,10,0
";
    let table = RawTable::from_csv_str(csv).unwrap();
    let report = analyze(&table, &options(ScenarioId::ImproveOne)).unwrap();

    assert_eq!(report.totals.keywords, 1);
    assert_eq!(report.totals.failed, 2);

    let bad_volume = &report.rows[1];
    let error = bad_volume.error.as_ref().expect("row error");
    assert_eq!(error.row, 2);
    assert_eq!(error.column, "Search Volume");
    assert!(bad_volume.potential_traffic.is_nan());
    assert!(bad_volume.monthly_clicks.iter().all(|point| point.value.is_nan()));

    let bad_position = &report.rows[2];
    assert_eq!(
        bad_position.error.as_ref().map(|err| err.column.as_str()),
        Some("Position")
    );

    assert!((report.totals.potential_traffic - 150.0).abs() < 1e-6);
    assert!(report.monthly.iter().all(|point| point.clicks.is_finite()));
}

#[test]
fn only_thousands_separators_are_accepted_in_numbers() {
    let csv = "\
Keyword,Search Volume,Clicks,Position
shoes,1000,10,\"4,5\"
boots,\"1,2,3\",10,3
hats,\"12,345.5\",\"1,000\",2
";
    let rows = RawTable::from_csv_str(csv).unwrap().keyword_rows().unwrap();

    assert!(rows[0].current_position.is_nan());
    assert_eq!(
        rows[0].validate().map_err(|err| err.column),
        Err("Position".to_string())
    );
    assert!(rows[1].search_volume.is_nan());
    assert_eq!(
        rows[1].validate().map_err(|err| err.column),
        Err("Search Volume".to_string())
    );
    assert_eq!(rows[2].search_volume, 12345.5);
    assert_eq!(rows[2].current_clicks, Some(1000.0));
    assert!(rows[2].validate().is_ok());
}

#[test]
fn non_utf8_cells_do_not_abort_the_batch() {
    let bytes: &[u8] = b"Keyword,Search Volume,Clicks,Position\n\
        good,1000,10,5\n\
        m\xfcnchen,500,3,7\n";
    let table = RawTable::from_reader(bytes).unwrap();
    let report = analyze(&table, &options(ScenarioId::ImproveOne)).unwrap();

    assert_eq!(report.totals.keywords, 2);
    assert_eq!(report.totals.failed, 0);
    assert!(report.rows[1].source.keyword.starts_with('m'));
    assert!(report.rows[1].source.keyword.contains('\u{fffd}'));
    assert!((report.rows[1].potential_traffic - 40.0).abs() < 1e-6);
    assert!((report.totals.potential_traffic - 190.0).abs() < 1e-6);
}

#[test]
fn traffic_timeline_moves_from_current_clicks_to_projection() {
    let rows = vec![KeywordRow::new("kw", 1000.0, 5.0).with_clicks(50.0)];
    let opts = AnalysisOptions {
        custom_curve: Some(GrowthCurve::new(vec![50.0, 100.0]).unwrap()),
        ..options(ScenarioId::ImproveOne)
    };
    let report = analyze_rows(&rows, &opts, &mut rng()).unwrap();
    let months = &report.rows[0].monthly_clicks;

    assert_eq!(months.len(), 2);
    assert!((months[0].value - 100.0).abs() < 1e-6);
    assert_eq!(months[1].value, report.rows[0].potential_traffic);
    assert_eq!(report.duration, "custom");
}

#[test]
fn monthly_series_aggregates_clicks_and_conversions() {
    let rows = vec![
        KeywordRow::new("a", 1000.0, 5.0).with_clicks(100.0),
        KeywordRow::new("b", 1000.0, 5.0).with_clicks(100.0),
    ];
    let opts = AnalysisOptions {
        conversion: ConversionRates::new(10.0).unwrap(),
        custom_curve: Some(GrowthCurve::new(vec![50.0, 100.0]).unwrap()),
        ..options(ScenarioId::ImproveOne)
    };
    let report = analyze_rows(&rows, &opts, &mut rng()).unwrap();

    assert_eq!(report.monthly.len(), 2);
    assert!((report.monthly[0].clicks - 250.0).abs() < 1e-6);
    assert!((report.monthly[1].clicks - 300.0).abs() < 1e-6);
    assert!((report.monthly[1].conversions - 30.0).abs() < 1e-6);
}

#[test]
fn position_timeline_recomputes_position_each_month() {
    let rows = vec![KeywordRow::new("kw", 1000.0, 15.0)];
    let opts = AnalysisOptions {
        timeline_mode: TimelineMode::Position,
        custom_curve: Some(GrowthCurve::new(vec![50.0, 100.0]).unwrap()),
        ..options(ScenarioId::ImproveTen)
    };
    let report = analyze_rows(&rows, &opts, &mut rng()).unwrap();
    let row = &report.rows[0];

    assert_eq!(row.adjusted_position, 5.0);
    assert!((row.monthly_clicks[0].value - 35.0).abs() < 1e-6);
    assert!((row.monthly_clicks[1].value - 100.0).abs() < 1e-6);
    assert!((row.potential_traffic - 100.0).abs() < 1e-6);
}

#[test]
fn position_timeline_is_rejected_for_absolute_scenarios() {
    let opts = AnalysisOptions {
        timeline_mode: TimelineMode::Position,
        ..options(ScenarioId::PageTwo)
    };
    assert!(matches!(
        opts.calculator(),
        Err(ProjectionError::InvalidScenario(_))
    ));
}

#[test]
fn intent_specific_conversion_rates_apply_per_row() {
    let table = RawTable::from_csv_str(SAMPLE).unwrap();
    let opts = AnalysisOptions {
        conversion: ConversionRates::new(2.0)
            .unwrap()
            .with_intent("Transactional", 5.0)
            .unwrap(),
        ..options(ScenarioId::ImproveOne)
    };
    let report = analyze(&table, &opts).unwrap();

    assert_eq!(report.rows[0].conversion_rate, 5.0);
    assert_eq!(report.rows[1].conversion_rate, 2.0);
    assert!((report.rows[0].current_conversions - 1.0).abs() < 1e-9);
}

#[test]
fn clusters_group_rows_and_collect_unclustered() {
    let table = RawTable::from_csv_str(SAMPLE).unwrap();
    let report = analyze(&table, &options(ScenarioId::ImproveOne)).unwrap();

    let names: Vec<&str> = report
        .clusters
        .iter()
        .map(|cluster| cluster.cluster.as_str())
        .collect();
    assert_eq!(names, vec![UNCLUSTERED, "shoes"]);

    let shoes = &report.clusters[1];
    assert_eq!(shoes.keywords, 2);
    assert!((shoes.current_clicks - 23.0).abs() < 1e-9);
}

#[test]
fn banded_source_changes_projection() {
    let rows = vec![KeywordRow::new("kw", 1000.0, 2.0)];
    let opts = AnalysisOptions {
        ctr_source: CtrSource::Banded,
        ..options(ScenarioId::PositionOne)
    };
    let report = analyze_rows(&rows, &opts, &mut rng()).unwrap();
    assert!((report.rows[0].potential_traffic - 325.0).abs() < 1e-6);
    assert_eq!(report.ctr_source, "banded");
}

#[test]
fn default_config_resolves_to_default_options() {
    let options = ForecastConfig::default().to_options().unwrap();
    assert_eq!(options.scenario_id, ScenarioId::ImproveOne);
    assert_eq!(options.ctr_source, CtrSource::Standard);
    assert_eq!(options.conversion.default_percent(), 2.5);
    assert_eq!(options.curve().months(), 12);
    assert_eq!(options.random_seed, None);
}

#[test]
fn partial_config_file_fills_defaults() {
    let config: ForecastConfig = toml::from_str(
        r#"
[analysis]
scenario = "page-one"
random_seed = 9

[conversion.by_intent]
transactional = 6.0
"#,
    )
    .unwrap();
    let options = config.to_options().unwrap();

    assert_eq!(options.scenario_id, ScenarioId::PageOne);
    assert_eq!(options.random_seed, Some(9));
    assert_eq!(options.conversion.percent_for(Some("transactional")), 6.0);
    assert_eq!(options.conversion.percent_for(None), 2.5);
}

#[test]
fn unknown_config_values_are_reported() {
    let mut config = ForecastConfig::default();
    config.analysis.scenario = "moonshot".to_string();
    let err = config.to_options().unwrap_err();
    assert_eq!(err.to_string(), "configuration error: unknown scenario: moonshot");

    let mut config = ForecastConfig::default();
    config.analysis.conversion_rate = 140.0;
    assert!(matches!(config.to_options(), Err(ProjectionError::Config(_))));

    let mut config = ForecastConfig::default();
    config.timeline.custom_curve = Some(vec![10.0, 5.0, 100.0]);
    assert!(matches!(
        config.to_options(),
        Err(ProjectionError::InvalidCurve(_))
    ));
}

#[test]
fn overrides_take_precedence_over_file_values() {
    let mut config = ForecastConfig::default();
    let env: HashMap<&str, &str> = [("SEO_SCENARIO", "top-three"), ("SEO_RANDOM_SEED", "11")]
        .into_iter()
        .collect();
    config
        .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
        .unwrap();
    assert_eq!(config.analysis.scenario, "top-three");
    assert_eq!(config.analysis.random_seed, Some(11));

    config.apply(&OptionOverrides {
        scenario: Some("top-five".to_string()),
        duration: Some("6".to_string()),
        ..OptionOverrides::default()
    });
    let options = config.to_options().unwrap();
    assert_eq!(options.scenario_id, ScenarioId::TopFive);
    assert_eq!(options.curve().months(), 6);
    assert_eq!(options.random_seed, Some(11));
}

#[test]
fn malformed_numeric_overrides_are_rejected() {
    for (key, value) in [("SEO_RANDOM_SEED", "12ab"), ("SEO_CONVERSION_RATE", "two")] {
        let mut config = ForecastConfig::default();
        let err = config
            .apply_overrides(|name| (name == key).then(|| value.to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("configuration error: invalid {}: {}", key, value)
        );
        assert_eq!(config.analysis.random_seed, None);
    }
}

#[test]
fn config_round_trips_through_file() {
    let dir = std::env::temp_dir().join(format!("seo-forecast-test-{}", std::process::id()));
    let path = dir.join("forecast.toml");

    let mut config = ForecastConfig::default();
    config.analysis.duration = "24-months".to_string();
    config.write(&path).unwrap();

    let loaded = ForecastConfig::from_file(&path).unwrap();
    assert_eq!(loaded.to_options().unwrap().curve().months(), 24);

    let _ = std::fs::remove_dir_all(dir);
}
