mod engine;
mod types;

pub use engine::{calculate_for_periods, calculate_future_values, project};
pub use types::{
    ChartSeries, Frequency, Projection, ProjectionError, ProjectionInputs, Schedule, YearSnapshot,
};
