// Entrypoint for the smoke run.
// - Logs go to stderr (filter from `RUST_LOG`), status lines to stdout.
// - Failed calls are reported by the driver; the process still exits 0.

use gophermart_smoke::{api::ApiClient, driver, fixtures};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api = ApiClient::new(fixtures::BASE_URL)?;
    let scenario = fixtures::Scenario::default();

    let stdout = std::io::stdout();
    driver::run(&api, &scenario, &mut stdout.lock())?;
    Ok(())
}
