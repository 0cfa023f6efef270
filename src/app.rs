use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use csv::Writer;
use dotenv::dotenv;
use tracing::{info, span, Instrument, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::PlannerConfig;
use crate::fixtures::data_generator::demo_request;
use crate::report::plan::log_plan;
use crate::setup::init::RoutePlanner;
use crate::setup::init_types::RouteRequest;

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .try_init()?;

    dotenv().ok();
    Ok(())
}

/// Request from `ROUTE_REQUEST_PATH`, or the Pune demo when unset.
fn load_request() -> Result<RouteRequest, Box<dyn Error>> {
    match env::var("ROUTE_REQUEST_PATH") {
        Ok(path) => {
            info!("Reading route request from {}", path);
            let body = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&body)?)
        }
        Err(_) => {
            info!("ROUTE_REQUEST_PATH not set, planning the demo request");
            Ok(demo_request())
        }
    }
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;

    let config = PlannerConfig::from_env()?;
    info!(
        "Starting route planner: provider {}, max sweeps {}, time limit {:?}",
        config.provider.name(), config.budget.max_sweeps, config.budget.time_limit
    );

    let request = load_request()?;
    let planner = RoutePlanner::from_config(&config);

    let outcome = planner
        .plan_detailed(&request)
        .instrument(span!(Level::INFO, "plan", bins = request.bins.len()))
        .await?;

    log_plan(&outcome.plan);
    println!("{}", serde_json::to_string_pretty(&outcome.plan)?);

    if let Ok(path) = env::var("HISTORY_CSV_PATH") {
        save_to_csv(
            outcome.solution.stats.construction_objective,
            &outcome.solution.stats.history,
            &path,
        )?;
        info!("Wrote improvement history to {}", path);
    }

    Ok(())
}

/// One row per accepted move, preceded by the construction result at sweep 0.
pub fn save_to_csv(
    construction_objective: u64,
    history: &[(usize, u64)],
    filename: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(["sweep", "total_distance"])?;
    wtr.write_record(["0".to_string(), construction_objective.to_string()])?;
    for (sweep, value) in history {
        wtr.write_record([sweep.to_string(), value.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_csv_starts_with_construction() {
        let path = env::temp_dir().join(format!("binroute-history-{}.csv", std::process::id()));
        save_to_csv(120, &[(1, 100), (2, 95)], &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(written, "sweep,total_distance\n0,120\n1,100\n2,95\n");
    }
}
