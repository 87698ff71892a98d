use clap::{CommandFactory, Parser};
use userid_etl::utils::{logger, validation::Validate};
use userid_etl::{CliConfig, ConfigProvider, EtlEngine, HttpResolver, ResolvePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.debug);

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        eprintln!();
        // Printing help only fails if stderr is gone.
        let _ = CliConfig::command().write_help(&mut std::io::stderr());
        std::process::exit(1);
    }

    if config.fullname {
        tracing::debug!("Fullname flag is set");
    }

    let endpoint = match config.endpoint() {
        Ok(endpoint) => endpoint,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let resolver = HttpResolver::new(endpoint);
    let pipeline = ResolvePipeline::new(resolver, config.run_settings());
    let mut engine = EtlEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("Records processed: {}", summary.rows_written);
            tracing::info!("CSV processing complete!");
        }
        Err(e) => {
            tracing::error!(
                "CSV processing failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
