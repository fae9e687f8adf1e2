//! Dashboard read models built from latest repository readings: the
//! Treasury yield-curve snapshot, the key-indicator summary strip, and the
//! composite recession-risk score.

use crate::domain::errors::ApiError;
use crate::domain::repositories::SeriesRepository;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// Treasury maturities used for the yield curve snapshot, short to long.
const YIELD_CURVE_SERIES: [&str; 6] = ["DGS3MO", "DGS1", "DGS2", "DGS5", "DGS10", "DGS30"];

/// Key macro indicators displayed on the dashboard.
const KEY_INDICATORS: [(&str, &str, &str); 10] = [
    ("GDP", "Real GDP", "Billions $"),
    ("CPIAUCSL", "CPI (All Urban)", "Index"),
    ("UNRATE", "Unemployment Rate", "%"),
    ("FEDFUNDS", "Fed Funds Rate", "%"),
    ("DGS10", "10-Year Treasury", "%"),
    ("DGS2", "2-Year Treasury", "%"),
    ("T10Y2Y", "10Y-2Y Spread", "%"),
    ("BAMLH0A0HYM2", "HY OAS", "bps"),
    ("MANEMP", "Mfg Employment", "Thousands"),
    ("NFCI", "Financial Conditions", "Index"),
];

#[derive(Debug, Clone, Serialize)]
pub struct YieldCurvePoint {
    pub maturity: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct YieldCurveSnapshot {
    pub date: Option<NaiveDate>,
    pub points: Vec<YieldCurvePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSummary {
    pub name: String,
    pub value: f64,
    pub change: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecessionSignal {
    pub name: String,
    pub series_id: String,
    pub signal: bool,
    pub value: f64,
    pub threshold: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecessionRisk {
    pub score: usize,
    pub total_signals: usize,
    pub signals: Vec<RecessionSignal>,
}

/// How a recession check compares the latest reading to its threshold.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Below(f64),
    Above(f64),
    AtLeast(f64),
}

impl Trigger {
    fn fires(self, value: f64) -> bool {
        match self {
            Trigger::Below(t) => value < t,
            Trigger::Above(t) => value > t,
            Trigger::AtLeast(t) => value >= t,
        }
    }
}

struct RecessionCheck {
    name: &'static str,
    series_id: &'static str,
    trigger: Trigger,
    threshold: &'static str,
    description: &'static str,
}

const RECESSION_CHECKS: [RecessionCheck; 10] = [
    RecessionCheck {
        name: "Yield Curve (10Y-3M)",
        series_id: "T10Y3M",
        trigger: Trigger::Below(0.0),
        threshold: "< 0 (inverted)",
        description: "10Y-3M spread inverted; historically precedes recession by 12-18mo",
    },
    RecessionCheck {
        name: "Yield Curve (10Y-2Y)",
        series_id: "T10Y2Y",
        trigger: Trigger::Below(0.0),
        threshold: "< 0 (inverted)",
        description: "10Y-2Y spread inverted; every inversion since 1955 preceded recession",
    },
    RecessionCheck {
        name: "HY Credit Spread",
        series_id: "BAMLH0A0HYM2",
        trigger: Trigger::Above(5.0),
        threshold: "> 500 bps",
        description: "High yield OAS above 500bps signals elevated credit stress",
    },
    RecessionCheck {
        name: "Manufacturing Employment",
        series_id: "MANEMP",
        trigger: Trigger::Below(12_000.0),
        threshold: "< 12,000K (declining)",
        description: "Manufacturing employment below 12M signals sector weakness",
    },
    RecessionCheck {
        name: "Chicago Fed NFCI",
        series_id: "NFCI",
        trigger: Trigger::Above(0.0),
        threshold: "> 0 (tighter than avg)",
        description: "Positive NFCI means financial conditions tighter than average",
    },
    RecessionCheck {
        name: "Financial Stress (StL Fed)",
        series_id: "STLFSI4",
        trigger: Trigger::Above(1.0),
        threshold: "> 1.0 (elevated)",
        description: "StL Fed stress index above 1 std deviation indicates stress",
    },
    RecessionCheck {
        name: "Sahm Rule",
        series_id: "SAHMREALTIME",
        trigger: Trigger::AtLeast(0.5),
        threshold: ">= 0.50 pp",
        description: "3-month avg unemployment rise >= 0.5pp triggers Sahm recession signal",
    },
    RecessionCheck {
        name: "Recession Probability",
        series_id: "RECPROUSM156N",
        trigger: Trigger::Above(30.0),
        threshold: "> 30%",
        description: "Smoothed recession probability above 30% indicates elevated risk",
    },
    RecessionCheck {
        name: "Chicago Fed Activity",
        series_id: "CFNAI",
        trigger: Trigger::Below(-0.7),
        threshold: "< -0.70",
        description: "CFNAI below -0.7 signals recession may have begun",
    },
    RecessionCheck {
        name: "Leading Index (US)",
        series_id: "USSLIND",
        trigger: Trigger::Below(0.0),
        threshold: "< 0 (declining)",
        description: "Negative leading index suggests deteriorating economic outlook",
    },
];

pub struct IndicatorService {
    repo: Arc<dyn SeriesRepository>,
}

impl IndicatorService {
    pub fn new(repo: Arc<dyn SeriesRepository>) -> Self {
        Self { repo }
    }

    /// Latest reading per curve maturity. Maturities with no data are
    /// skipped; an empty store yields an empty snapshot, not an error.
    pub async fn yield_curve(&self) -> Result<YieldCurveSnapshot, ApiError> {
        let mut points = Vec::new();
        let mut latest_date: Option<NaiveDate> = None;

        for code in YIELD_CURVE_SERIES {
            let Some(obs) = self.repo.latest_n(code, 1).await?.into_iter().next() else {
                continue;
            };
            let Some(rate) = obs.value else { continue };

            points.push(YieldCurvePoint {
                maturity: maturity_label(code),
                rate,
            });
            if latest_date.is_none_or(|d| obs.date > d) {
                latest_date = Some(obs.date);
            }
        }

        Ok(YieldCurveSnapshot {
            date: latest_date,
            points,
        })
    }

    /// Latest value and period-over-period change for each key indicator
    /// that has data.
    pub async fn indicators(&self) -> Result<Vec<IndicatorSummary>, ApiError> {
        let mut summaries = Vec::new();

        for (code, name, unit) in KEY_INDICATORS {
            let recent = self.repo.latest_n(code, 2).await?;
            let values: Vec<f64> = recent.iter().filter_map(|o| o.value).collect();
            let Some(&value) = values.first() else {
                continue;
            };

            summaries.push(IndicatorSummary {
                name: name.to_string(),
                value,
                change: values.get(1).map(|prev| value - prev),
                unit: unit.to_string(),
            });
        }

        Ok(summaries)
    }

    /// Composite 0..=10 score: one point per triggered signal among the
    /// checks whose series currently have a reading.
    pub async fn recession_risk(&self) -> Result<RecessionRisk, ApiError> {
        let mut signals = Vec::new();

        for check in &RECESSION_CHECKS {
            let Some(obs) = self
                .repo
                .latest_n(check.series_id, 1)
                .await?
                .into_iter()
                .next()
            else {
                continue;
            };
            let Some(value) = obs.value else { continue };

            signals.push(RecessionSignal {
                name: check.name.to_string(),
                series_id: check.series_id.to_string(),
                signal: check.trigger.fires(value),
                value,
                threshold: check.threshold.to_string(),
                description: check.description.to_string(),
            });
        }

        Ok(RecessionRisk {
            score: signals.iter().filter(|s| s.signal).count(),
            total_signals: signals.len(),
            signals,
        })
    }
}

/// "DGS3MO" -> "3M", "DGS10" -> "10Y".
fn maturity_label(code: &str) -> String {
    let raw = code.trim_start_matches("DGS");
    if let Some(months) = raw.strip_suffix("MO") {
        format!("{months}M")
    } else {
        format!("{raw}Y")
    }
}
