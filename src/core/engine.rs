use super::types::{
    Frequency, Projection, ProjectionError, ProjectionInputs, Schedule, YearSnapshot,
};

pub fn project(inputs: &ProjectionInputs) -> Projection {
    run_schedule(
        inputs.initial_amount,
        inputs.periodic_contribution,
        inputs.annual_growth_rate,
        inputs.years,
        inputs.frequency.into(),
    )
}

/// Parallel `(future values, contributions only)` sequences, one entry per year.
pub fn calculate_future_values(
    initial_amount: f64,
    periodic_contribution: f64,
    annual_growth_rate: f64,
    years: u32,
    frequency: Frequency,
) -> (Vec<f64>, Vec<f64>) {
    let projection = project(&ProjectionInputs {
        initial_amount,
        periodic_contribution,
        annual_growth_rate,
        years,
        frequency,
    });
    (projection.future_values(), projection.contributions_only())
}

/// Same as [`calculate_future_values`] but keyed by a raw periods-per-year
/// count. Divisors of twelve use the month-boundary rule; zero and other
/// counts have no schedule and fail.
pub fn calculate_for_periods(
    initial_amount: f64,
    periodic_contribution: f64,
    annual_growth_rate: f64,
    years: u32,
    periods_per_year: u32,
) -> Result<(Vec<f64>, Vec<f64>), ProjectionError> {
    let schedule = Schedule::for_periods(periods_per_year)?;
    let projection = run_schedule(
        initial_amount,
        periodic_contribution,
        annual_growth_rate,
        years,
        schedule,
    );
    Ok((projection.future_values(), projection.contributions_only()))
}

fn run_schedule(
    initial_amount: f64,
    periodic_contribution: f64,
    annual_growth_rate: f64,
    years: u32,
    schedule: Schedule,
) -> Projection {
    let periods = schedule.periods_per_year();
    let growth_factor = 1.0 + annual_growth_rate / f64::from(periods);

    let mut total_value = initial_amount;
    let mut total_contributions = initial_amount;
    let mut snapshots = Vec::with_capacity(years as usize);

    for year in 1..=years {
        for period in 1..=periods {
            total_value *= growth_factor;
            if schedule.contributes_at(period) {
                total_value += periodic_contribution;
                total_contributions += periodic_contribution;
            }
        }
        snapshots.push(YearSnapshot {
            year,
            future_value: total_value,
            contributions_only: total_contributions,
        });
    }

    Projection { years: snapshots }
}
