mod host;
mod messages;

use glint_core::{ActorId, RewardService, RewardStore, WorldResolver};
use glint_data::{default_data_dir, load_config, load_permission_provider, JsonFilePersistence};
use host::{ConsolePermissions, Host, CONSOLE};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "GLINT_CONFIG";

#[derive(Debug, Clone)]
struct CliOptions {
    config: PathBuf,
    quiet: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut config = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let mut quiet = false;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--config" | "-c" => {
                if let Some(value) = args.get(idx + 1) {
                    config = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--quiet" | "-q" => quiet = true,
            _ => {}
        }
        idx += 1;
    }
    CliOptions {
        config: config.unwrap_or_else(|| default_data_dir().join("config.json")),
        quiet,
    }
}

fn write_reply(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for text in lines {
        writeln!(out, "{text}")?;
    }
    out.flush()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let config = match load_config(&options.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err:#}");
            std::process::exit(1);
        }
    };

    let worlds: Arc<dyn WorldResolver> = Arc::new(config.static_worlds());
    let operators = config
        .operator_ids()
        .chain(std::iter::once(ActorId::new(CONSOLE)));
    let permissions = ConsolePermissions(load_permission_provider(
        &config.storage.permissions_path(),
        operators,
    ));
    let persistence = JsonFilePersistence::from_storage(&config.storage);
    info!(
        target: "glint::cli",
        rewards = %persistence.rewards_path().display(),
        "opening reward store"
    );
    let store = RewardStore::open(persistence, Some(Arc::clone(&worlds)));
    let service = RewardService::new(store, Box::new(permissions), config.service.clone());
    let mut host = Host::new(service, worlds);

    if !options.quiet {
        println!("glint: {} reward(s) loaded, type 'help' for commands", host.service().store().count());
    }
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("input error: {err}");
                break;
            }
        };
        let reply = host.execute(&line, Instant::now());
        if let Err(err) = write_reply(&mut stdout, &reply.lines) {
            eprintln!("output error: {err}");
            break;
        }
        if reply.quit {
            break;
        }
    }
}
