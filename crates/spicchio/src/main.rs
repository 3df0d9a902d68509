use clap::{Parser, Subcommand};
use spicchio::config;
use spicchio::events::AppEvent;
use spicchio::icons::IconCache;
use spicchio::launcher::{Launcher, LauncherOptions};
use spicchio::protocol;
use spicchio::settings::JsonFileStore;
use spicchio::sys::runtime::{Clock, Services};
use spicchio::view;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "spicchio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of the one in the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the launcher (the default)
    Run,
    /// Send one command to the running launcher and print its reply
    Send {
        #[arg(
            required = true,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        words: Vec<String>,
    },
    /// Write the default config file unless one exists
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::get_config_path()?,
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config_path),
        Commands::Send { words } => send_command(&config_path, &words),
        Commands::Init => {
            if config::write_default_config(&config_path)? {
                println!("Wrote {}", config_path.display());
            } else {
                println!("{} already exists", config_path.display());
            }
            Ok(())
        }
    }
}

fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = config::load_or_default(config_path);
    let settings = JsonFileStore::open(config.settings_path()?)?;
    log::info!("Settings in {}", settings.path().display());

    let clock = Clock::new();
    let (tx, rx) = async_channel::bounded(64);
    let mut services = Services::start(&config, config_path.to_path_buf(), tx, clock)?;

    let mut launcher = Launcher::new(
        LauncherOptions::from_config(&config),
        Box::new(config.catalog()),
        Box::new(settings),
        Arc::new(IconCache::new()),
    );
    log::info!(
        "Started in {} mode with {} apps",
        launcher.mode(),
        config.apps.len()
    );

    while let Ok(event) = rx.recv_blocking() {
        match event {
            AppEvent::ConfigReload => {
                log::info!("Reloading {}", config_path.display());
                let config = config::load_or_default(config_path);
                services.reconfigure(&config);
                launcher.reconfigure(
                    LauncherOptions::from_config(&config),
                    Box::new(config.catalog()),
                );
            }
            AppEvent::Frame(reply) => match view::frame_json(&launcher) {
                Ok(json) => {
                    let _ = reply.send_blocking(json);
                }
                Err(e) => log::error!("Failed to render frame: {}", e),
            },
            event => {
                for effect in launcher.handle(event, clock.now_ms()) {
                    services.dispatch(effect);
                }
            }
        }
    }
    Ok(())
}

fn send_command(config_path: &Path, words: &[String]) -> anyhow::Result<()> {
    let line = shell_words::join(words);
    // catch typos before bothering the daemon
    protocol::parse(&line)?;

    let socket = config::load_or_default(config_path).server.socket;
    let mut stream = UnixStream::connect(&socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to spicchio at {}: {}. Is it running?",
            socket.display(),
            e
        )
    })?;
    writeln!(stream, "{}", line)?;

    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    let reply = reply.trim_end();
    if let Some(message) = reply.strip_prefix("error: ") {
        anyhow::bail!("{}", message);
    }
    println!("{}", reply);
    Ok(())
}
