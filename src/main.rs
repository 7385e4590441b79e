mod echo;

use clap::{Parser, Subcommand};
use telegrab_channels::telegram::{Bot, BotState};
use telegrab_core::config::{self, Config};

#[derive(Parser)]
#[command(
    name = "telegrab",
    version,
    about = "Telegrab — long-polling Telegram bot client"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "telegrab.toml")]
    config: String,

    /// Bot token. Overrides the one in the config file.
    #[arg(short, long, env = "TELEGRAB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start polling with the echo handler.
    Start,
    /// Show resolved settings.
    Status,
}

fn init_logging(cfg: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.log_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => {
            let cfg = config::load_or_init(&cli.config, cli.token.as_deref())?;
            init_logging(&cfg);

            let bot = Bot::new(cfg, echo::EchoHandler);
            if bot.state() == BotState::FatalError {
                anyhow::bail!("bot failed to initialize, see the log above");
            }
            println!("Telegrab — polling as configured in {}", cli.config);
            bot.start().await;
        }
        Commands::Status => {
            let mut cfg = config::load(&cli.config)?;
            if let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) {
                cfg.token = token;
            }

            println!("Telegrab — Status\n");
            println!("Config: {}", cli.config);
            println!("Token: {}", cfg.redacted_token());
            println!("API: {}", cfg.api_url);
            println!(
                "Polling: limit {}, timeout {}s, interval {}s, retry {}s",
                cfg.polling.limit,
                cfg.polling.timeout,
                cfg.polling.interval,
                cfg.polling.retry_timeout
            );
            println!();

            let dir = cfg.download_path();
            println!(
                "  downloads: {} ({})",
                dir.display(),
                if dir.is_dir() {
                    "present"
                } else if dir.exists() {
                    "not a directory"
                } else {
                    "will be created"
                }
            );
            println!(
                "  settings: {}",
                match cfg.validate() {
                    Ok(()) => "valid".to_string(),
                    Err(e) => e.to_string(),
                }
            );
        }
    }

    Ok(())
}
