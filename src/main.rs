use clap::{Arg, Command};
use tracing::info;

use volition::audit::AuditLog;
use volition::config::Config;
use volition::history::HistoryBrowser;
use volition::mediator::MediationController;
use volition::monitor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("fiat")
        .about("AI-powered command mediator - say what you want, review what runs")
        .long_about(
            "fiat turns a natural language description into a shell command, asks before \
             running it, and keeps an append-only log of every suggestion for later replay",
        )
        .arg(
            Arg::new("query")
                .help("Natural language description of the task")
                .num_args(1..),
        )
        .arg(
            Arg::new("dry-run")
                .short('d')
                .long("dry-run")
                .help("Preview the suggested command without executing it")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("monitor")
                .short('m')
                .long("monitor")
                .help("Print host diagnostics first")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("set-api-key")
                .long("set-api-key")
                .help("Set the Anthropic API key")
                .value_name("API_KEY")
                .num_args(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Show configuration information")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("history").about("List logged suggestions and optionally replay one"),
        )
        .args_conflicts_with_subcommands(true)
        .get_matches();

    // Handle configuration commands
    if let Some(api_key) = matches.get_one::<String>("set-api-key") {
        let mut config = Config::load()?;
        config.set_api_key(api_key.clone())?;
        println!("✅ API key saved successfully");
        return Ok(());
    }

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let config = Config::load()?;

    if matches.subcommand_matches("history").is_some() {
        let browser = HistoryBrowser::new(AuditLog::new(config.log_path()?));
        return browser.browse();
    }

    let query_args: Vec<String> = matches
        .get_many::<String>("query")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    if query_args.is_empty() {
        eprintln!("Usage: fiat [-m] [-d] \"your linux task description here\"");
        return Ok(());
    }

    if matches.get_flag("monitor") {
        monitor::print_report()?;
    }

    let query = query_args.join(" ");
    info!("Mediating query: {}", query);

    let controller = match MediationController::from_config(&config, matches.get_flag("dry-run")) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("❌ Error: {err:#}");
            return Ok(());
        }
    };

    controller.mediate(&query).await
}
