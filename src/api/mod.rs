use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{ChartSeries, Frequency, Projection, ProjectionInputs, YearSnapshot, project};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Upper bound on the horizon so a single request stays a bounded loop.
const MAX_YEARS: u32 = 200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequency {
    Annually,
    Monthly,
    Daily,
}

impl From<CliFrequency> for Frequency {
    fn from(value: CliFrequency) -> Self {
        match value {
            CliFrequency::Annually => Frequency::Annually,
            CliFrequency::Monthly => Frequency::Monthly,
            CliFrequency::Daily => Frequency::Daily,
        }
    }
}

impl From<Frequency> for CliFrequency {
    fn from(value: Frequency) -> Self {
        match value {
            Frequency::Annually => CliFrequency::Annually,
            Frequency::Monthly => CliFrequency::Monthly,
            Frequency::Daily => CliFrequency::Daily,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_amount: Option<f64>,
    #[serde(alias = "contribution", alias = "periodicContribution")]
    monthly_contribution: Option<f64>,
    annual_growth_rate: Option<f64>,
    years: Option<u32>,
    #[serde(alias = "frequency")]
    compounding_frequency: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "compounding",
    about = "Projects the future value of a recurring investment year by year"
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Initial amount invested")]
    initial_amount: f64,
    #[arg(
        long,
        default_value_t = 500.0,
        help = "Amount added at the end of every calendar month"
    )]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Expected annual growth rate in percent, e.g. 12"
    )]
    annual_growth_rate: f64,
    #[arg(long, default_value_t = 10, help = "Number of years to project")]
    years: u32,
    #[arg(long, value_enum, default_value_t = CliFrequency::Monthly)]
    compounding_frequency: CliFrequency,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    frequency: &'static str,
    initial_amount: f64,
    monthly_contribution: f64,
    annual_growth_fraction: f64,
    years: u32,
    final_future_value: f64,
    final_contributions: f64,
    total_growth: f64,
    year_results: Vec<YearSnapshot>,
    series: ChartSeries,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<ProjectionInputs, String> {
    if !cli.initial_amount.is_finite() || cli.initial_amount < 0.0 {
        return Err("--initial-amount must be >= 0".to_string());
    }

    if !cli.monthly_contribution.is_finite() || cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    if !cli.annual_growth_rate.is_finite() || cli.annual_growth_rate < 0.0 {
        return Err("--annual-growth-rate must be >= 0".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be > 0".to_string());
    }

    if cli.years > MAX_YEARS {
        return Err(format!("--years must be <= {MAX_YEARS}"));
    }

    Ok(ProjectionInputs {
        initial_amount: cli.initial_amount,
        periodic_contribution: cli.monthly_contribution,
        annual_growth_rate: cli.annual_growth_rate / 100.0,
        years: cli.years,
        frequency: cli.compounding_frequency.into(),
    })
}

fn build_project_response(inputs: &ProjectionInputs, projection: &Projection) -> ProjectResponse {
    let (final_future_value, final_contributions) = projection
        .last()
        .map(|y| (y.future_value, y.contributions_only))
        .unwrap_or((inputs.initial_amount, inputs.initial_amount));

    ProjectResponse {
        frequency: inputs.frequency.key(),
        initial_amount: inputs.initial_amount,
        monthly_contribution: inputs.periodic_contribution,
        annual_growth_fraction: inputs.annual_growth_rate,
        years: inputs.years,
        final_future_value,
        final_contributions,
        total_growth: final_future_value - final_contributions,
        year_results: projection.years.clone(),
        series: projection.series(),
    }
}

fn render_table(inputs: &ProjectionInputs, projection: &Projection) -> String {
    let mut out = format!(
        "Compounding {} at {:.2}% for {} years\n",
        inputs.frequency,
        inputs.annual_growth_rate * 100.0,
        inputs.years
    );
    out.push_str(&format!(
        "{:>4}  {:>16}  {:>18}\n",
        "Year", "Future Value", "Contributions Only"
    ));
    for year in &projection.years {
        out.push_str(&format!(
            "{:>4}  {:>16.2}  {:>18.2}\n",
            year.year, year.future_value, year.contributions_only
        ));
    }
    out
}

/// Parses command-line arguments, runs the projection and returns the text
/// to print on stdout.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    let inputs = build_inputs(&cli)?;
    let projection = project(&inputs);
    debug!(
        years = inputs.years,
        frequency = %inputs.frequency,
        "projection computed for cli"
    );

    match cli.format {
        OutputFormat::Table => Ok(render_table(&inputs, &projection)),
        OutputFormat::Json => {
            let response = build_project_response(&inputs, &projection);
            serde_json::to_string_pretty(&response)
                .map(|json| format!("{json}\n"))
                .map_err(|e| format!("failed to encode projection: {e}"))
        }
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("investment calculator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            warn!(error = %msg, "rejected projection request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let projection = project(&inputs);
    debug!(
        years = inputs.years,
        frequency = %inputs.frequency,
        "projection computed"
    );
    json_response(StatusCode::OK, build_project_response(&inputs, &projection))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<ProjectionInputs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<ProjectionInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_amount {
        cli.initial_amount = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_growth_rate {
        cli.annual_growth_rate = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(key) = payload.compounding_frequency {
        let frequency = Frequency::from_key(&key).map_err(|e| e.to_string())?;
        cli.compounding_frequency = frequency.into();
    }

    build_inputs(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_amount: 10_000.0,
        monthly_contribution: 500.0,
        annual_growth_rate: 12.0,
        years: 10,
        compounding_frequency: CliFrequency::Monthly,
        format: OutputFormat::Json,
    }
}
