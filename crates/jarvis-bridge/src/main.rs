use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{LevelFilter, debug, info, warn};
use tokio::net::TcpListener;

use jarvis_bridge::api::{self, AppState, BridgeSettings};
use jarvis_bridge::client::BridgeClient;
use jarvis_bridge::config::{self, APP_NAME, AppConfig};
use jarvis_bridge::host::{DryRunHost, HostControl, SystemHost};
use jarvis_bridge::net;

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn async_serve(ctx: RuntimeContext, cmd: ServeCommand) -> Result<()> {
    handle_serve(&ctx, cmd).await
}

#[tokio::main]
async fn async_notify(ctx: RuntimeContext, cmd: NotifyCommand) -> Result<()> {
    handle_notify(&ctx, cmd).await
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging();
    debug!("config file: {}", ctx.config_path.display());

    match cli.command {
        Command::Serve(cmd) => async_serve(ctx, cmd),
        Command::Notify(cmd) => async_notify(ctx, cmd),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Completions { shell } => handle_completions(shell),
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Jarvis bridge - control this machine from your phone.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Reduce output to only errors
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Enable debug logging (equivalent to -vv)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable trace logging (overrides other levels)
    #[arg(long, global = true)]
    trace: bool,
    /// Output machine readable JSON (logs and command output)
    #[arg(long, global = true)]
    json: bool,
    /// Disable ANSI colors in output
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    /// Control color output (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    /// Log host actions instead of executing them
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    /// Assume "yes" for interactive prompts
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP bridge
    Serve(ServeCommand),
    /// Send a notification to the phone through a running bridge
    Notify(NotifyCommand),
    /// Create the config directory and default config file
    Init(InitCommand),
    /// Inspect and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Args)]
struct ServeCommand {
    /// Host address to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, Args)]
struct NotifyCommand {
    /// Notification body
    #[arg(value_name = "BODY", default_value = "")]
    body: String,
    /// Notification title (the bridge default is used when omitted)
    #[arg(short, long)]
    title: Option<String>,
    /// Bridge base URL (defaults to the configured local bridge)
    #[arg(long, env = "JARVIS_BRIDGE_URL")]
    url: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    /// Recreate configuration even if it already exists
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
    /// Regenerate the default configuration file
    Reset,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    config_path: PathBuf,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let config_path = config::resolve_path(common.config.as_deref())?;
        if !config_path.exists() && !common.dry_run {
            config::write_default(&config_path)?;
        }
        let config = config::load(&config_path)?;
        Ok(Self {
            common,
            config_path,
            config,
        })
    }

    fn init_logging(&self) {
        use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

        let level = match self.effective_log_level() {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        };

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jarvis_bridge={level},tower_http={level}"))
        });

        if self.common.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .ok();
        } else {
            let force_color = matches!(self.common.color, ColorOption::Always)
                || env::var_os("FORCE_COLOR").is_some();
            let disable_color = self.common.no_color
                || matches!(self.common.color, ColorOption::Never)
                || env::var_os("NO_COLOR").is_some()
                || (!force_color && !io::stderr().is_terminal());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(!disable_color))
                .try_init()
                .ok();
        }

        // Fallback for `log` users when a tracing subscriber was already set.
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        builder.filter_level(self.effective_log_level());
        builder.try_init().ok();
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.quiet {
            return LevelFilter::Error;
        }
        if self.common.trace {
            return LevelFilter::Trace;
        }
        if self.common.debug {
            return LevelFilter::Debug;
        }
        match self.common.verbose {
            0 => self
                .config
                .logging
                .level
                .parse()
                .unwrap_or(LevelFilter::Info),
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

async fn handle_serve(ctx: &RuntimeContext, cmd: ServeCommand) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    let host: Arc<dyn HostControl> = if ctx.common.dry_run {
        Arc::new(DryRunHost::new())
    } else {
        Arc::new(SystemHost::detect(config.power.delay_secs))
    };
    info!("Host control: {}", host.name());

    let state = AppState::new(host, BridgeSettings::from_config(&config));
    let app = api::create_router(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    let advertised = net::advertised_host(config.server.advertise_host.as_deref());
    info!("Listening on http://{}", addr);
    info!(
        "Mobile control: {}",
        net::mobile_url(&advertised, config.server.port)
    );

    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    warn!("failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("Shutdown signal received, stopping bridge");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("running server")?;

    Ok(())
}

async fn handle_notify(ctx: &RuntimeContext, cmd: NotifyCommand) -> Result<()> {
    let url = cmd.url.unwrap_or_else(|| ctx.config.local_base_url());
    let client = BridgeClient::new(url)?;

    if ctx.common.dry_run {
        info!(
            "dry-run: would notify {} (title: {:?}, body: {:?})",
            client.base_url(),
            cmd.title,
            cmd.body
        );
        return Ok(());
    }

    client
        .send_notification(cmd.title.as_deref(), &cmd.body)
        .await
        .with_context(|| format!("sending notification to {}", client.base_url()))?;

    if ctx.common.json {
        println!(r#"{{"success": true}}"#);
    } else if !ctx.common.quiet {
        println!("Notification queued on {}", client.base_url());
    }
    Ok(())
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    // RuntimeContext::new already wrote a fresh file if none existed.
    let exists = ctx.config_path.exists();
    if exists && !(cmd.force || ctx.common.assume_yes) {
        println!("Config at {}", ctx.config_path.display());
        return Ok(());
    }

    if ctx.common.dry_run {
        info!(
            "dry-run: would write default config to {}",
            ctx.config_path.display()
        );
        return Ok(());
    }

    config::write_default(&ctx.config_path)?;
    println!("Wrote {}", ctx.config_path.display());
    Ok(())
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if ctx.common.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ctx.config)
                        .context("serializing config to JSON")?
                );
            } else {
                print!(
                    "{}",
                    serde_yaml::to_string(&ctx.config).context("serializing config to YAML")?
                );
            }
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
        ConfigCommand::Reset => {
            if ctx.common.dry_run {
                info!(
                    "dry-run: would reset config at {}",
                    ctx.config_path.display()
                );
                return Ok(());
            }
            if !ctx.common.assume_yes && io::stdin().is_terminal() {
                print!("Overwrite {}? [y/N] ", ctx.config_path.display());
                io::stdout().flush().ok();
                let mut answer = String::new();
                io::stdin()
                    .read_line(&mut answer)
                    .context("reading confirmation")?;
                if !matches!(answer.trim(), "y" | "Y" | "yes") {
                    return Err(anyhow!("aborted"));
                }
            }
            config::write_default(&ctx.config_path)
        }
    }
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_force_is_distinct_from_yes() {
        let cli = Cli::try_parse_from(["jarvis-bridge", "init", "--force"]).unwrap();
        assert!(!cli.common.assume_yes);
        match cli.command {
            Command::Init(cmd) => assert!(cmd.force),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["jarvis-bridge", "--yes", "init"]).unwrap();
        assert!(cli.common.assume_yes);
    }

    #[test]
    fn test_serve_overrides_parse() {
        let cli = Cli::try_parse_from(["jarvis-bridge", "serve", "--host", "::1", "-p", "5050"])
            .unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.host.as_deref(), Some("::1"));
                assert_eq!(cmd.port, Some(5050));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
