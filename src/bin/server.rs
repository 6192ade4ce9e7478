use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use bar_optimizer::solver::Solver;
use bar_optimizer::stats;
use bar_optimizer::types::{DemandLine, Solution, Window, deserialize_u32_from_number};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    stock_length: f64,
    cuts: Vec<CutRequest>,
    #[serde(default)]
    kerf: f64,
    #[serde(default)]
    min_leftover: Option<f64>,
    #[serde(default)]
    max_leftover: Option<f64>,
    #[serde(default)]
    allowance: f64,
}

#[derive(Deserialize, Serialize)]
struct CutRequest {
    length: f64,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    qty: u32,
}

#[derive(Serialize)]
struct OptimizeResponse {
    patterns: Vec<PatternResponse>,
    stock_length: f64,
    total_bars: u32,
    total_pieces: u32,
    wasted_len: f64,
    feasible: bool,
}

#[derive(Serialize)]
struct PatternResponse {
    count: u32,
    cuts: Vec<DemandLine>,
    total_len: f64,
    leftover: f64,
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let demand: Vec<DemandLine> = req
        .cuts
        .iter()
        .map(|c| DemandLine::new(c.length, c.qty))
        .collect();

    let mut solver = Solver::new(req.stock_length, req.kerf, demand)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match (req.min_leftover, req.max_leftover) {
        (Some(min), Some(max)) => {
            let window =
                Window::new(min, max).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            solver = solver
                .with_window(window)
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        }
        (None, None) => {}
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "min_leftover and max_leftover must be given together".to_string(),
            ));
        }
    }

    let solution: Solution = solver.solve();
    let feasible = !solution.is_empty() || req.cuts.iter().all(|c| c.qty == 0);

    let response = OptimizeResponse {
        patterns: solution
            .entries()
            .iter()
            .map(|(pattern, count)| PatternResponse {
                count: *count,
                cuts: pattern.cuts().lines().to_vec(),
                total_len: pattern.total_len(),
                leftover: pattern.leftover(req.stock_length),
            })
            .collect(),
        stock_length: req.stock_length,
        total_bars: solution.total_stock_bars(),
        total_pieces: stats::total_pieces(&solution),
        wasted_len: stats::wasted_len(&solution, req.stock_length, req.allowance),
        feasible,
    };

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
