use std::path::PathBuf;

use clap::Parser;
use ratewatch::app::App;
use ratewatch::config::Config;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ratewatch", version, about = "Currency exchange rate watcher")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = match Config::load_or_default(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.logging.init();
    info!("ratewatch starting");

    if let Err(e) = App::run(config).await {
        error!(error = %e, "Fatal error");
        std::process::exit(1);
    }

    info!("ratewatch stopped");
}
