use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Cumulative day-of-year on which each month of a 365-day year closes.
const MONTH_END_DAYS: [u32; 12] = [31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("unsupported compounding frequency: {key:?} (expected annually, monthly or daily)")]
    UnsupportedFrequency { key: String },
    #[error("periods per year must be a positive integer, got {periods}")]
    NonPositivePeriods { periods: u32 },
    #[error("no contribution schedule is defined for {periods} periods per year")]
    UnsupportedPeriods { periods: u32 },
}

/// How often growth is compounded within a year.
///
/// Every variant owns its contribution schedule. Annually and Monthly follow
/// the month-boundary rule (a deposit when the period index is a multiple of
/// `12 / periods_per_year`), so a single annual period never reaches month 12
/// and receives no deposit. Daily deposits on the last day of each month.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Frequency {
    Annually,
    Monthly,
    Daily,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Annually, Frequency::Monthly, Frequency::Daily];

    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annually => 1,
            Frequency::Monthly => 12,
            Frequency::Daily => 365,
        }
    }

    /// Whether a contribution is deposited at the end of `period` (1-based
    /// within the year).
    pub fn contributes_at(self, period: u32) -> bool {
        match self {
            Frequency::Annually | Frequency::Monthly => {
                period % (MONTHS_PER_YEAR / self.periods_per_year()) == 0
            }
            Frequency::Daily => MONTH_END_DAYS.contains(&period),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Frequency::Annually => "annually",
            Frequency::Monthly => "monthly",
            Frequency::Daily => "daily",
        }
    }

    /// Strict lookup of a frequency key. Accepts the lowercase keys and the
    /// capitalised labels shown in the form ("Monthly").
    pub fn from_key(key: &str) -> Result<Self, ProjectionError> {
        match key {
            "annually" | "Annually" => Ok(Frequency::Annually),
            "monthly" | "Monthly" => Ok(Frequency::Monthly),
            "daily" | "Daily" => Ok(Frequency::Daily),
            other => Err(ProjectionError::UnsupportedFrequency {
                key: other.to_string(),
            }),
        }
    }

    pub fn from_periods_per_year(periods: u32) -> Result<Self, ProjectionError> {
        if periods == 0 {
            return Err(ProjectionError::NonPositivePeriods { periods });
        }
        Frequency::ALL
            .into_iter()
            .find(|f| f.periods_per_year() == periods)
            .ok_or(ProjectionError::UnsupportedPeriods { periods })
    }
}

/// Compounding periods per year together with the deposit rule applied to
/// them: a named [`Frequency`], or any other divisor of twelve using the
/// month-boundary rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Schedule {
    Named(Frequency),
    MonthDivisor { periods_per_year: u32 },
}

impl Schedule {
    pub fn for_periods(periods: u32) -> Result<Self, ProjectionError> {
        if periods == 0 {
            return Err(ProjectionError::NonPositivePeriods { periods });
        }
        if let Ok(frequency) = Frequency::from_periods_per_year(periods) {
            return Ok(Schedule::Named(frequency));
        }
        if MONTHS_PER_YEAR % periods == 0 {
            return Ok(Schedule::MonthDivisor {
                periods_per_year: periods,
            });
        }
        Err(ProjectionError::UnsupportedPeriods { periods })
    }

    pub fn periods_per_year(self) -> u32 {
        match self {
            Schedule::Named(frequency) => frequency.periods_per_year(),
            Schedule::MonthDivisor { periods_per_year } => periods_per_year,
        }
    }

    pub fn contributes_at(self, period: u32) -> bool {
        match self {
            Schedule::Named(frequency) => frequency.contributes_at(period),
            Schedule::MonthDivisor { periods_per_year } => {
                period % (MONTHS_PER_YEAR / periods_per_year) == 0
            }
        }
    }

    /// Deposits made over one full year.
    pub fn contributions_per_year(self) -> u32 {
        (1..=self.periods_per_year())
            .filter(|&p| self.contributes_at(p))
            .count() as u32
    }
}

impl From<Frequency> for Schedule {
    fn from(value: Frequency) -> Self {
        Schedule::Named(value)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Frequency {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::from_key(s)
    }
}

/// Immutable inputs of a single projection. Rates are fractions (0.12 for 12%).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInputs {
    pub initial_amount: f64,
    pub periodic_contribution: f64,
    pub annual_growth_rate: f64,
    pub years: u32,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    pub future_value: f64,
    pub contributions_only: f64,
}

impl YearSnapshot {
    pub fn growth(&self) -> f64 {
        self.future_value - self.contributions_only
    }
}

/// Year-by-year projection, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub years: Vec<YearSnapshot>,
}

/// The two plotted lines of a projection against the year axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub years: Vec<u32>,
    pub future_value: Vec<f64>,
    pub contributions_only: Vec<f64>,
}

impl Projection {
    pub fn future_values(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.future_value).collect()
    }

    pub fn contributions_only(&self) -> Vec<f64> {
        self.years.iter().map(|y| y.contributions_only).collect()
    }

    pub fn last(&self) -> Option<&YearSnapshot> {
        self.years.last()
    }

    pub fn series(&self) -> ChartSeries {
        ChartSeries {
            years: self.years.iter().map(|y| y.year).collect(),
            future_value: self.future_values(),
            contributions_only: self.contributions_only(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributions_per_year_follow_month_boundaries() {
        assert_eq!(Schedule::from(Frequency::Annually).contributions_per_year(), 0);
        assert_eq!(Schedule::from(Frequency::Monthly).contributions_per_year(), 12);
        assert_eq!(Schedule::from(Frequency::Daily).contributions_per_year(), 12);
    }

    #[test]
    fn daily_deposits_land_on_month_end_days() {
        assert!(!Frequency::Daily.contributes_at(30));
        assert!(Frequency::Daily.contributes_at(31));
        assert!(Frequency::Daily.contributes_at(59));
        assert!(Frequency::Daily.contributes_at(365));
    }

    #[test]
    fn quarterly_schedule_deposits_when_index_reaches_interval() {
        let schedule = Schedule::for_periods(4).expect("4 divides 12");
        assert_eq!(schedule, Schedule::MonthDivisor { periods_per_year: 4 });
        let hits: Vec<u32> = (1..=4).filter(|&p| schedule.contributes_at(p)).collect();
        assert_eq!(hits, vec![3]);
        assert_eq!(schedule.contributions_per_year(), 1);
    }

    #[test]
    fn schedule_for_periods_accepts_divisors_of_twelve_only() {
        for periods in [2, 3, 4, 6] {
            assert_eq!(
                Schedule::for_periods(periods),
                Ok(Schedule::MonthDivisor {
                    periods_per_year: periods
                })
            );
        }
        assert_eq!(
            Schedule::for_periods(12),
            Ok(Schedule::Named(Frequency::Monthly))
        );
        assert_eq!(
            Schedule::for_periods(365),
            Ok(Schedule::Named(Frequency::Daily))
        );
        assert_eq!(
            Schedule::for_periods(0),
            Err(ProjectionError::NonPositivePeriods { periods: 0 })
        );
        assert_eq!(
            Schedule::for_periods(52),
            Err(ProjectionError::UnsupportedPeriods { periods: 52 })
        );
    }

    #[test]
    fn from_key_rejects_unknown_frequency() {
        let err = Frequency::from_key("Weekly").expect_err("weekly is not supported");
        assert_eq!(
            err,
            ProjectionError::UnsupportedFrequency {
                key: "Weekly".to_string()
            }
        );
        assert_eq!("Monthly".parse::<Frequency>(), Ok(Frequency::Monthly));
        assert_eq!("daily".parse::<Frequency>(), Ok(Frequency::Daily));
    }

    #[test]
    fn from_periods_per_year_maps_known_counts_and_rejects_zero() {
        assert_eq!(Frequency::from_periods_per_year(1), Ok(Frequency::Annually));
        assert_eq!(Frequency::from_periods_per_year(12), Ok(Frequency::Monthly));
        assert_eq!(Frequency::from_periods_per_year(365), Ok(Frequency::Daily));
        assert_eq!(
            Frequency::from_periods_per_year(0),
            Err(ProjectionError::NonPositivePeriods { periods: 0 })
        );
        assert_eq!(
            Frequency::from_periods_per_year(7),
            Err(ProjectionError::UnsupportedPeriods { periods: 7 })
        );
    }

    #[test]
    fn series_reshapes_snapshots_into_parallel_lines() {
        let projection = Projection {
            years: vec![
                YearSnapshot {
                    year: 1,
                    future_value: 110.0,
                    contributions_only: 100.0,
                },
                YearSnapshot {
                    year: 2,
                    future_value: 121.0,
                    contributions_only: 100.0,
                },
            ],
        };
        let series = projection.series();
        assert_eq!(series.years, vec![1, 2]);
        assert_eq!(series.future_value, vec![110.0, 121.0]);
        assert_eq!(series.contributions_only, vec![100.0, 100.0]);
        assert_eq!(projection.last().map(YearSnapshot::growth), Some(21.0));
    }
}
