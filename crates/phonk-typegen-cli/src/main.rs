use anyhow::Context;
use clap::{ArgAction, Parser};
use phonk_typegen::TypegenConfig;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Generate TypeScript declarations for the PHONK scripting API.
#[derive(Debug, Parser)]
#[command(name = "phonk-typegen", version, about)]
struct Cli {
    /// Root of the PHONK checkout
    path: PathBuf,

    /// Extra config file, layered over the global and checkout config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Runner source file, relative to the checkout root
    #[arg(long, value_name = "FILE")]
    runner: Option<PathBuf>,

    /// API source directory, relative to the checkout root
    #[arg(long, value_name = "DIR")]
    api_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn config(&self) -> anyhow::Result<TypegenConfig> {
        let mut config = TypegenConfig::load(&self.path);
        if let Some(path) = &self.config {
            config = config.merge(TypegenConfig::load_file(path)?);
        }
        if let Some(runner) = &self.runner {
            config.runner.path = Some(runner.clone());
        }
        if let Some(dir) = &self.api_dir {
            config.api.dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Reset SIGPIPE to default behavior so piping to `head` etc. doesn't panic.
#[cfg(unix)]
fn reset_sigpipe() {
    // SAFETY: only changes the signal disposition back to the POSIX default.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.config()?;
    debug!(?config, "resolved config");
    let generation = phonk_typegen::generate(&cli.path, &config)
        .with_context(|| format!("generating declarations for {}", cli.path.display()))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(generation.output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    reset_sigpipe();

    let cli = Cli::parse();
    init_tracing(cli.log_level());

    if let Err(e) = run(&cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
