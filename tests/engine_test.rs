//! End-to-end tests of the macro analysis services over the in-memory
//! repository: alignment, normalization, correlation, and the dashboard
//! read models, exercised through the same service layer the HTTP
//! handlers call.

use chrono::NaiveDate;
use macrodash::application::indicators::IndicatorService;
use macrodash::application::macro_service::{MacroService, SeriesQuery, MAX_MULTI_SERIES};
use macrodash::application::normalize::ZSCORE_UNIT;
use macrodash::domain::errors::ApiError;
use macrodash::domain::series::SeriesMeta;
use macrodash::infrastructure::repositories::InMemorySeriesRepository;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly(start_month: u32, values: &[f64]) -> Vec<(NaiveDate, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let month0 = start_month - 1 + i as u32;
            (date(2024 + (month0 / 12) as i32, month0 % 12 + 1, 1), v)
        })
        .collect()
}

async fn service_with(
    seeds: &[(&str, Vec<(NaiveDate, f64)>)],
) -> (MacroService, Arc<InMemorySeriesRepository>) {
    let repo = Arc::new(InMemorySeriesRepository::new());
    for (id, points) in seeds {
        repo.seed(SeriesMeta::bare(*id), points).await;
    }
    (MacroService::new(repo.clone()), repo)
}

#[tokio::test]
async fn multi_series_aligns_on_union_axis_with_null_gaps() {
    let (service, _) = service_with(&[
        ("A", monthly(1, &[1.0, 2.0, 3.0])),
        ("B", monthly(2, &[10.0, 20.0, 30.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["A".to_string(), "B".to_string()],
        ..Default::default()
    };
    let table = service.multi_series(&query, false).await.unwrap();

    assert_eq!(
        table.dates,
        vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]
    );
    assert_eq!(table.columns[0].values, vec![Some(1.0), Some(2.0), Some(3.0), None]);
    assert_eq!(table.columns[1].values, vec![None, Some(10.0), Some(20.0), Some(30.0)]);
}

#[tokio::test]
async fn multi_series_respects_date_range() {
    let (service, _) = service_with(&[("A", monthly(1, &[1.0, 2.0, 3.0, 4.0]))]).await;

    let query = SeriesQuery {
        series_ids: vec!["A".to_string()],
        start: Some(date(2024, 2, 1)),
        end: Some(date(2024, 3, 1)),
    };
    let table = service.multi_series(&query, false).await.unwrap();
    assert_eq!(table.dates, vec![date(2024, 2, 1), date(2024, 3, 1)]);
    assert_eq!(table.columns[0].values, vec![Some(2.0), Some(3.0)]);
}

#[tokio::test]
async fn multi_series_normalizes_and_flags_degenerate_columns() {
    let (service, _) = service_with(&[
        ("TREND", monthly(1, &[1.0, 2.0, 3.0, 4.0])),
        ("FLAT", monthly(1, &[5.0, 5.0, 5.0, 5.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["TREND".to_string(), "FLAT".to_string()],
        ..Default::default()
    };
    let table = service.multi_series(&query, true).await.unwrap();

    let trend = &table.columns[0];
    assert_eq!(trend.meta.unit, ZSCORE_UNIT);
    assert!(!trend.degenerate);
    let mean: f64 =
        trend.values.iter().flatten().sum::<f64>() / trend.present_count() as f64;
    assert!(mean.abs() < 1e-12);

    let flat = &table.columns[1];
    assert!(flat.degenerate);
    assert!(flat.values.iter().all(Option::is_none));
}

#[tokio::test]
async fn unknown_ids_are_all_reported() {
    let (service, _) = service_with(&[("A", monthly(1, &[1.0, 2.0]))]).await;

    let query = SeriesQuery {
        series_ids: vec!["A".to_string(), "GHOST1".to_string(), "GHOST2".to_string()],
        ..Default::default()
    };
    let err = service.multi_series(&query, false).await.unwrap_err();
    match err {
        ApiError::UnknownSeries { ids } => {
            assert_eq!(ids, vec!["GHOST1".to_string(), "GHOST2".to_string()]);
        }
        other => panic!("expected UnknownSeries, got {other:?}"),
    }
}

#[tokio::test]
async fn series_count_limits_are_enforced() {
    let (service, _) = service_with(&[]).await;

    let query = SeriesQuery {
        series_ids: (0..=MAX_MULTI_SERIES).map(|i| format!("S{i}")).collect(),
        ..Default::default()
    };
    assert!(matches!(
        service.multi_series(&query, false).await.unwrap_err(),
        ApiError::Input { .. }
    ));

    let query = SeriesQuery {
        series_ids: vec!["ONLY".to_string()],
        ..Default::default()
    };
    assert!(matches!(
        service.correlation(&query, None).await.unwrap_err(),
        ApiError::Input { .. }
    ));
}

#[tokio::test]
async fn correlation_matrix_is_symmetric_with_unit_diagonal() {
    let (service, _) = service_with(&[
        ("UP", monthly(1, &[1.0, 2.0, 3.0, 4.0, 5.0])),
        ("DOWN", monthly(1, &[5.0, 4.0, 3.0, 2.0, 1.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["UP".to_string(), "DOWN".to_string()],
        ..Default::default()
    };
    let (matrix, _) = service.correlation(&query, Some(0)).await.unwrap();

    assert_eq!(matrix.matrix[0][0], Some(1.0));
    assert_eq!(matrix.matrix[1][1], Some(1.0));
    let r = matrix.matrix[0][1].unwrap();
    assert!((r + 1.0).abs() < 1e-12);
    assert_eq!(matrix.matrix[0][1], matrix.matrix[1][0]);
}

#[tokio::test]
async fn disjoint_series_yield_null_correlation_not_zero() {
    let (service, _) = service_with(&[
        ("EARLY", monthly(1, &[1.0, 2.0, 3.0])),
        ("LATE", monthly(7, &[4.0, 5.0, 6.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["EARLY".to_string(), "LATE".to_string()],
        ..Default::default()
    };
    let (matrix, lagged) = service.correlation(&query, Some(0)).await.unwrap();

    assert_eq!(matrix.matrix[0][1], None);
    assert_eq!(lagged.len(), 1);
    assert_eq!(lagged[0].correlation, None);
    assert_eq!(lagged[0].optimal_lag, 0);
}

#[tokio::test]
async fn lag_analysis_finds_the_leading_series() {
    // LEADER at month i equals FOLLOWER at month i+3.
    let leader: Vec<f64> = (0..24).map(|i| (i as f64 * 0.7).sin()).collect();
    let follower: Vec<f64> = (0..24)
        .map(|i| ((i as f64 - 3.0) * 0.7).sin())
        .collect();

    let (service, _) = service_with(&[
        ("LEADER", monthly(1, &leader)),
        ("FOLLOWER", monthly(1, &follower)),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["LEADER".to_string(), "FOLLOWER".to_string()],
        ..Default::default()
    };
    let (_, lagged) = service.correlation(&query, Some(6)).await.unwrap();

    let pair = &lagged[0];
    assert_eq!(pair.series_a, "LEADER");
    assert_eq!(pair.optimal_lag, 3);
    assert!(pair.correlation.unwrap() > 0.999);
}

#[tokio::test]
async fn lag_window_is_capped_by_sample_length() {
    let (service, _) = service_with(&[
        ("A", monthly(1, &[1.0, 2.0, 4.0, 3.0, 5.0, 4.0])),
        ("B", monthly(1, &[2.0, 1.0, 3.0, 5.0, 4.0, 6.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["A".to_string(), "B".to_string()],
        ..Default::default()
    };
    // 6 axis dates cap the window at 2 regardless of the requested 100.
    let (_, lagged) = service.correlation(&query, Some(100)).await.unwrap();
    assert!(lagged[0].optimal_lag.abs() <= 2);
}

#[tokio::test]
async fn out_of_range_correlation_degrades_to_null_shapes_not_an_error() {
    // Both series are known but the requested window predates every
    // observation, so each column aligns to an empty axis.
    let (service, _) = service_with(&[
        ("A", monthly(1, &[1.0, 2.0, 3.0])),
        ("B", monthly(1, &[4.0, 5.0, 6.0])),
    ])
    .await;

    let query = SeriesQuery {
        series_ids: vec!["A".to_string(), "B".to_string()],
        start: Some(date(2010, 1, 1)),
        end: Some(date(2010, 12, 31)),
    };
    let (matrix, lagged) = service.correlation(&query, None).await.unwrap();

    assert_eq!(matrix.series_ids, vec!["A".to_string(), "B".to_string()]);
    assert!(
        matrix.matrix.iter().flatten().all(Option::is_none),
        "no observations in range must mean undefined everywhere, got {:?}",
        matrix.matrix
    );
    assert_eq!(lagged.len(), 1);
    assert_eq!(lagged[0].correlation, None);
    assert_eq!(lagged[0].optimal_lag, 0);
}

#[tokio::test]
async fn empty_store_indicator_endpoints_degrade_to_empty_shapes() {
    let repo = Arc::new(InMemorySeriesRepository::new());
    let indicators = IndicatorService::new(repo);

    let curve = indicators.yield_curve().await.unwrap();
    assert!(curve.points.is_empty());
    assert_eq!(curve.date, None);

    assert!(indicators.indicators().await.unwrap().is_empty());

    let risk = indicators.recession_risk().await.unwrap();
    assert_eq!(risk.score, 0);
    assert_eq!(risk.total_signals, 0);
    assert!(risk.signals.is_empty());
}

#[tokio::test]
async fn recession_risk_scores_triggered_signals() {
    let repo = Arc::new(InMemorySeriesRepository::new());
    // Inverted 10Y-3M curve fires; the 10Y-2Y spread does not.
    repo.seed(SeriesMeta::bare("T10Y3M"), &monthly(1, &[-0.5]))
        .await;
    repo.seed(SeriesMeta::bare("T10Y2Y"), &monthly(1, &[0.3]))
        .await;
    let indicators = IndicatorService::new(repo);

    let risk = indicators.recession_risk().await.unwrap();
    assert_eq!(risk.total_signals, 2);
    assert_eq!(risk.score, 1);
    let fired = risk.signals.iter().find(|s| s.series_id == "T10Y3M").unwrap();
    assert!(fired.signal);
}

#[tokio::test]
async fn yield_curve_orders_maturities_short_to_long() {
    let repo = Arc::new(InMemorySeriesRepository::new());
    for (code, rate) in [("DGS3MO", 5.3), ("DGS2", 4.6), ("DGS10", 4.2)] {
        repo.seed(SeriesMeta::bare(code), &monthly(1, &[rate])).await;
    }
    let indicators = IndicatorService::new(repo);

    let curve = indicators.yield_curve().await.unwrap();
    let labels: Vec<&str> = curve.points.iter().map(|p| p.maturity.as_str()).collect();
    assert_eq!(labels, vec!["3M", "2Y", "10Y"]);
    assert_eq!(curve.date, Some(date(2024, 1, 1)));
}
