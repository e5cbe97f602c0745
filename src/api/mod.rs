use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    EngineConfig, EngineError, FeasibilityEngine, GoalParameters, InvestmentExperience,
    MarketParameters, PerformanceMetrics, UserProfile,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CliExperience {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<CliExperience> for InvestmentExperience {
    fn from(value: CliExperience) -> Self {
        match value {
            CliExperience::Beginner => InvestmentExperience::Beginner,
            CliExperience::Intermediate => InvestmentExperience::Intermediate,
            CliExperience::Advanced => InvestmentExperience::Advanced,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "goalcheck",
    about = "Monte Carlo feasibility checks for investment goals"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Full feasibility check against the risk tier's market
    Check {
        #[command(flatten)]
        goal: GoalArgs,
        #[command(flatten)]
        profile: ProfileArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Monte Carlo simulation against an explicit market
    Simulate {
        #[command(flatten)]
        goal: GoalArgs,
        #[command(flatten)]
        market: MarketArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct GoalArgs {
    #[arg(long, help = "Target amount in today's money")]
    target_amount: f64,
    #[arg(long)]
    timeline_months: u32,
    #[arg(long)]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 0.0)]
    initial_investment: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Annual inflation rate in percent"
    )]
    inflation_rate: f64,
    #[arg(long, default_value_t = 5, help = "Risk tolerance tier, 1-10")]
    risk_tolerance: u32,
    #[arg(long)]
    has_emergency_fund: bool,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    #[arg(long, default_value_t = 35)]
    age: u32,
    #[arg(long, value_enum, default_value_t = CliExperience::Intermediate)]
    experience: CliExperience,
    #[arg(long)]
    current_income: Option<f64>,
    #[arg(long, default_value_t = 0)]
    dependents: u32,
    #[arg(long, help = "The investor already holds an emergency fund")]
    profile_emergency_fund: bool,
}

#[derive(Args, Debug, Clone)]
struct MarketArgs {
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Expected annual return in percent"
    )]
    expected_return: f64,
    #[arg(
        long,
        default_value_t = 16.0,
        help = "Annual return volatility in percent"
    )]
    volatility: f64,
    #[arg(long, default_value_t = 4.5, help = "Risk-free rate in percent")]
    risk_free_rate: f64,
}

#[derive(Args, Debug, Clone, Default)]
struct EngineArgs {
    #[arg(long, help = "Fixed seed for reproducible results")]
    seed: Option<u64>,
    #[arg(long, help = "Trials in the base simulation")]
    trials: Option<u32>,
    #[arg(long)]
    scenario_trials: Option<u32>,
    #[arg(long)]
    stress_trials: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    target_amount: Option<f64>,
    timeline_months: Option<u32>,
    monthly_contribution: Option<f64>,
    initial_investment: Option<f64>,
    inflation_rate: Option<f64>,
    risk_tolerance: Option<u32>,
    has_emergency_fund: Option<bool>,

    age: Option<u32>,
    investment_experience: Option<CliExperience>,
    current_income: Option<f64>,
    dependents: Option<u32>,
    profile_has_emergency_fund: Option<bool>,

    expected_return: Option<f64>,
    volatility: Option<f64>,
    risk_free_rate: Option<f64>,

    seed: Option<u64>,
    trials: Option<u32>,
    scenario_trials: Option<u32>,
    stress_trials: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct ApiRequest {
    goal: GoalParameters,
    profile: UserProfile,
    market: MarketParameters,
    config: EngineConfig,
}

fn goal_from_args(args: &GoalArgs) -> GoalParameters {
    GoalParameters {
        target_amount: args.target_amount,
        timeline_months: args.timeline_months,
        monthly_contribution: args.monthly_contribution,
        initial_investment: args.initial_investment,
        inflation_rate: args.inflation_rate / 100.0,
        risk_tolerance: args.risk_tolerance,
        has_emergency_fund: args.has_emergency_fund,
    }
}

fn profile_from_args(args: &ProfileArgs) -> UserProfile {
    UserProfile {
        age: args.age,
        investment_experience: args.experience.into(),
        has_emergency_fund: args.profile_emergency_fund,
        current_income: args.current_income,
        dependents: args.dependents,
    }
}

fn market_from_args(args: &MarketArgs) -> MarketParameters {
    MarketParameters {
        expected_return: args.expected_return / 100.0,
        volatility: args.volatility / 100.0,
        risk_free_rate: args.risk_free_rate / 100.0,
    }
}

fn config_from_args(base: EngineConfig, args: &EngineArgs) -> EngineConfig {
    EngineConfig {
        seed: args.seed.or(base.seed),
        base_trials: args.trials.unwrap_or(base.base_trials),
        scenario_trials: args.scenario_trials.unwrap_or(base.scenario_trials),
        stress_trials: args.stress_trials.unwrap_or(base.stress_trials),
        ..base
    }
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::Check {
            goal,
            profile,
            engine,
        } => {
            let goal = goal_from_args(&goal);
            let profile = profile_from_args(&profile);
            let engine = FeasibilityEngine::new(config_from_args(EngineConfig::default(), &engine));
            let report = tokio::task::spawn_blocking(move || {
                engine.check_goal_feasibility(&goal, &profile, &mut PerformanceMetrics::default())
            })
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Simulate {
            goal,
            market,
            engine,
        } => {
            let goal = goal_from_args(&goal);
            let market = market_from_args(&market);
            let engine = FeasibilityEngine::new(config_from_args(EngineConfig::default(), &engine));
            let report = tokio::task::spawn_blocking(move || {
                engine.simulate_goal_achievement(&goal, &market, &mut PerformanceMetrics::default())
            })
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[derive(Clone)]
struct AppState {
    config: EngineConfig,
    metrics: Arc<Mutex<PerformanceMetrics>>,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let state = AppState {
        config: EngineConfig::default(),
        metrics: Arc::new(Mutex::new(PerformanceMetrics::default())),
    };
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "goalcheck HTTP API listening");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/feasibility",
            get(feasibility_get_handler).post(feasibility_post_handler),
        )
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/metrics", get(metrics_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let snapshot = *state
        .metrics
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    json_response(StatusCode::OK, snapshot)
}

async fn feasibility_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<GoalPayload>,
) -> Response {
    feasibility_handler_impl(state, payload).await
}

async fn feasibility_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<GoalPayload>,
) -> Response {
    feasibility_handler_impl(state, payload).await
}

async fn simulate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<GoalPayload>,
) -> Response {
    simulate_handler_impl(state, payload).await
}

async fn simulate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<GoalPayload>,
) -> Response {
    simulate_handler_impl(state, payload).await
}

async fn feasibility_handler_impl(state: AppState, payload: GoalPayload) -> Response {
    let request = api_request_from_payload(payload, state.config);
    let config = request.config;
    run_engine(state, config, move |engine, metrics| {
        engine.check_goal_feasibility(&request.goal, &request.profile, metrics)
    })
    .await
}

async fn simulate_handler_impl(state: AppState, payload: GoalPayload) -> Response {
    let request = api_request_from_payload(payload, state.config);
    let config = request.config;
    run_engine(state, config, move |engine, metrics| {
        engine.simulate_goal_achievement(&request.goal, &request.market, metrics)
    })
    .await
}

async fn run_engine<T, F>(state: AppState, config: EngineConfig, call: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&FeasibilityEngine, &mut PerformanceMetrics) -> Result<T, EngineError>
        + Send
        + 'static,
{
    let joined = tokio::task::spawn_blocking(move || {
        let engine = FeasibilityEngine::new(config);
        let mut run = PerformanceMetrics::default();
        let result = call(&engine, &mut run);
        (result, run)
    })
    .await;

    let (result, run) = match joined {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "engine task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Engine task failed");
        }
    };

    if run.runs > 0 {
        state
            .metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(run.last_execution_ms, run.trials_simulated);
    }

    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => engine_error_response(err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            violations: Vec::new(),
        },
    )
}

fn engine_error_response(err: EngineError) -> Response {
    match err {
        EngineError::Validation(v) => json_response(
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: v.to_string(),
                violations: v.violations,
            },
        ),
        err @ EngineError::Computation { .. } => {
            tracing::error!(error = %err, "goal computation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<GoalPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload, EngineConfig::default()))
}

// Payload rates are percentages, like the CLI flags.
fn api_request_from_payload(payload: GoalPayload, base: EngineConfig) -> ApiRequest {
    let mut goal = default_goal_args();
    let mut profile = default_profile_args();
    let mut market = default_market_args();

    if let Some(v) = payload.target_amount {
        goal.target_amount = v;
    }
    if let Some(v) = payload.timeline_months {
        goal.timeline_months = v;
    }
    if let Some(v) = payload.monthly_contribution {
        goal.monthly_contribution = v;
    }
    if let Some(v) = payload.initial_investment {
        goal.initial_investment = v;
    }
    if let Some(v) = payload.inflation_rate {
        goal.inflation_rate = v;
    }
    if let Some(v) = payload.risk_tolerance {
        goal.risk_tolerance = v;
    }
    if let Some(v) = payload.has_emergency_fund {
        goal.has_emergency_fund = v;
    }

    if let Some(v) = payload.age {
        profile.age = v;
    }
    if let Some(v) = payload.investment_experience {
        profile.experience = v;
    }
    if payload.current_income.is_some() {
        profile.current_income = payload.current_income;
    }
    if let Some(v) = payload.dependents {
        profile.dependents = v;
    }
    if let Some(v) = payload.profile_has_emergency_fund {
        profile.profile_emergency_fund = v;
    }

    if let Some(v) = payload.expected_return {
        market.expected_return = v;
    }
    if let Some(v) = payload.volatility {
        market.volatility = v;
    }
    if let Some(v) = payload.risk_free_rate {
        market.risk_free_rate = v;
    }

    let engine = EngineArgs {
        seed: payload.seed,
        trials: payload.trials,
        scenario_trials: payload.scenario_trials,
        stress_trials: payload.stress_trials,
    };

    let goal = goal_from_args(&goal);
    ApiRequest {
        profile: profile_from_args(&profile),
        goal,
        market: market_from_args(&market),
        config: config_from_args(base, &engine),
    }
}

fn default_goal_args() -> GoalArgs {
    GoalArgs {
        target_amount: 1_000_000.0,
        timeline_months: 360,
        monthly_contribution: 2_000.0,
        initial_investment: 10_000.0,
        inflation_rate: 3.0,
        risk_tolerance: 5,
        has_emergency_fund: false,
    }
}

fn default_profile_args() -> ProfileArgs {
    ProfileArgs {
        age: 35,
        experience: CliExperience::Intermediate,
        current_income: None,
        dependents: 0,
        profile_emergency_fund: false,
    }
}

fn default_market_args() -> MarketArgs {
    MarketArgs {
        expected_return: 10.0,
        volatility: 16.0,
        risk_free_rate: 4.5,
    }
}
