use clap::Parser;
use userid_etl::utils::{logger, validation::Validate};
use userid_etl::{ConfigProvider, EtlEngine, HttpResolver, ResolvePipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-resolve")]
#[command(about = "Resolve Mattermost user IDs in a CSV file using a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "userid-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the full-name setting from config
    #[arg(long)]
    full_name: Option<bool>,

    /// Show what would be processed without contacting Mattermost
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let verbose = args.verbose || config.verbose();
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(full_name) = args.full_name {
        config.table.full_name = Some(full_name);
        tracing::info!("Full name mode overridden to: {}", full_name);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let endpoint = match config.endpoint() {
        Ok(endpoint) => endpoint,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    display_config_summary(&config, &args);

    if args.dry_run {
        match endpoint.base_url() {
            Ok(url) => println!("  Lookup URL: {}api/v4/users/<user_id>", url),
            Err(e) => {
                eprintln!("{}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
        }
        println!("Dry run complete. No requests were made and no output was written.");
        return;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let pipeline = ResolvePipeline::new(HttpResolver::new(endpoint), config.run_settings());
    let mut engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "Wrote {} records to {}",
                summary.rows_written,
                summary.output
            );
        }
        Err(e) => {
            tracing::error!(
                "Run failed: {} (Category: {:?}, Severity: {:?})",
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("Configuration Summary:");
    println!(
        "  Directory: {}://{}:{}",
        config.directory.scheme, config.directory.host, config.directory.port
    );
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Column: {}", config.column());
    println!(
        "  Display: {}",
        if config.full_name() {
            "full name"
        } else {
            "username"
        }
    );

    if args.dry_run {
        println!("  DRY RUN MODE ENABLED");
    }

    println!();
}
