use crate::config::SolverConfig;
use crate::data::{SchedulingInput, SolveResult};
use crate::solver;
use axum::extract::State;
use axum::{Json, Router, routing::post};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;

async fn solve_handler(
    State(config): State<Arc<SolverConfig>>,
    Json(input): Json<SchedulingInput>,
) -> Json<SolveResult> {
    // the solver is CPU-bound, keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || solver::solve_input(&input, &config)).await;
    match outcome {
        Ok(result) => Json(result),
        Err(e) => {
            error!("Solve task failed: {}", e);
            Json(SolveResult::error(
                format!("Unexpected error: {}", e),
                Vec::new(),
            ))
        }
    }
}

pub fn router(config: SolverConfig) -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .with_state(Arc::new(config))
}

pub async fn run_server(addr: SocketAddr, config: SolverConfig) -> anyhow::Result<()> {
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
