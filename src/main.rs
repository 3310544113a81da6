//! wishflick -- command-line client for the WishFlick API.
//!
//! Wires together:
//!   - Configuration loading
//!   - Token storage selection
//!   - The authenticated client
//!   - One command per invocation

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

use wishflick_client::api::{NotificationQuery, sort_newest_first, unread_count};
use wishflick_client::config::Config;
use wishflick_client::net::RequestDescriptor;
use wishflick_client::{Error, WishflickClient};

// ---------------------------------------------------------------------------
// CLI argument parsing (minimal, no clap dependency)
// ---------------------------------------------------------------------------

enum Command {
    Login { email: String, password: Option<String> },
    Guest,
    Logout,
    Status,
    Get { path: String },
    Notifications { unread: bool, limit: Option<u32> },
    Wishes,
}

struct CliArgs {
    config_path: PathBuf,
    command: Command,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut config_path = PathBuf::from("wishflick.toml");
    let mut positional = Vec::new();
    let mut unread = false;
    let mut limit = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let Some(path) = args.next() else {
                    bail!("--config requires a path argument");
                };
                config_path = PathBuf::from(path);
            }
            "--unread" => unread = true,
            "--limit" => {
                let Some(n) = args.next() else {
                    bail!("--limit requires a number");
                };
                limit = Some(n.parse().with_context(|| format!("invalid --limit '{n}'"))?);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("wishflick {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                bail!("Unknown argument: {other}\nRun with --help for usage information.");
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("login") => {
            let Some(email) = positional.next() else {
                bail!("login requires an email");
            };
            Command::Login {
                email,
                password: positional.next(),
            }
        }
        Some("guest") => Command::Guest,
        Some("logout") => Command::Logout,
        Some("status") | None => Command::Status,
        Some("get") => {
            let Some(path) = positional.next() else {
                bail!("get requires a path, e.g. /wishes/");
            };
            Command::Get { path }
        }
        Some("notifications") => Command::Notifications { unread, limit },
        Some("wishes") => Command::Wishes,
        Some(other) => bail!("Unknown command: {other}\nRun with --help for usage information."),
    };

    Ok(CliArgs {
        config_path,
        command,
    })
}

fn print_usage() {
    println!(
        "\
wishflick {version} -- WishFlick API client

USAGE:
    wishflick [OPTIONS] <COMMAND>

COMMANDS:
    login <EMAIL> [PASSWORD]   Log in and store the token pair
    guest                      Start a guest session
    logout                     Forget stored tokens
    status                     Show session state [default]
    get <PATH>                 Authenticated GET, prints the response body
    notifications              List notifications, newest first
    wishes                     List your wishes

OPTIONS:
    -c, --config <PATH>    Path to configuration file [default: wishflick.toml]
        --unread           notifications: only unread ones
        --limit <N>        notifications: at most N
    -h, --help             Print this help message
    -V, --version          Print version information

ENVIRONMENT:
    RUST_LOG               Override log level (e.g. RUST_LOG=debug)
    WISHFLICK_CONFIG       Alternative to --config flag
    WISHFLICK_PASSWORD     Password for `login` when not given as an argument
    WISHFLICK_API_URL      Override api.base_url
",
        version = env!("CARGO_PKG_VERSION")
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?
        .block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let cli = parse_args()?;

    // Allow WISHFLICK_CONFIG env var as alternative to --config flag
    let config_path = std::env::var("WISHFLICK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or(cli.config_path);

    let config = Config::load(&config_path)?;
    init_tracing(&config);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "Starting wishflick"
    );

    let client = WishflickClient::from_config(&config)?;

    if let Err(e) = run(&client, &config, cli.command).await {
        if e.downcast_ref::<Error>().is_some_and(Error::requires_reauth) {
            bail!("{e}\nSession expired. Run `wishflick login <email>` again.");
        }
        return Err(e);
    }
    Ok(())
}

async fn run(client: &WishflickClient, config: &Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => std::env::var("WISHFLICK_PASSWORD")
                    .context("no password given (pass it as an argument or set WISHFLICK_PASSWORD)")?,
            };
            client.auth().login(&email, &password).await?;
            println!("Logged in as {email}");
        }
        Command::Guest => {
            client.auth().guest_login().await?;
            println!("Guest session started");
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("Logged out");
        }
        Command::Status => {
            let storage = client.session().storage();
            let creds = client.session().credentials().await?.unwrap_or_default();
            let state = match (&creds.access_token, creds.can_refresh()) {
                (None, _) => "logged out",
                (Some(_), true) => "logged in",
                (Some(_), false) => "guest (no refresh token)",
            };
            println!("API:      {}", config.api.base_url);
            println!("Storage:  {} ({})", storage.name(), config.storage.path.display());
            println!("Session:  {state}");
        }
        Command::Get { path } => {
            let response = client.request(RequestDescriptor::get(path)).await?;
            let status = response.status();
            let body = match response.json::<serde_json::Value>() {
                Ok(value) if std::io::stdout().is_terminal() => serde_json::to_string_pretty(&value)?,
                _ => response.text(),
            };
            println!("{body}");
            if !status.is_success() {
                bail!("request failed with status {status}");
            }
        }
        Command::Notifications { unread, limit } => {
            let query = NotificationQuery {
                read_filter: unread.then_some(false),
                limit,
            };
            let mut list = client.notifications().list(query).await?;
            sort_newest_first(&mut list);
            for n in &list {
                let mark = if n.is_read { ' ' } else { '*' };
                println!(
                    "{mark} #{:<6} {}  [{}] {}",
                    n.id,
                    n.created_at.format("%Y-%m-%d %H:%M"),
                    n.kind,
                    n.message
                );
            }
            println!("{} notification(s), {} unread", list.len(), unread_count(&list));
        }
        Command::Wishes => {
            for wish in client.wishes().mine().await? {
                println!(
                    "#{:<6} {:<30} {:>10.2} / {:<10.2} ({:.0}%){}",
                    wish.id,
                    wish.title,
                    wish.raised,
                    wish.goal,
                    wish.progress() * 100.0,
                    if wish.is_public { "" } else { "  private" }
                );
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tracing / logging initialization
// ---------------------------------------------------------------------------

fn init_tracing(config: &Config) {
    // RUST_LOG env var takes precedence over config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!("wishflick={level},wishflick_client={level},warn"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
