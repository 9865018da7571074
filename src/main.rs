use route_dispatch::cli::run_cli;
use route_dispatch::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging_with_config(&LogConfig::from_env())?;
    run_cli()
}
