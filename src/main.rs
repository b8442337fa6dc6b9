use clap::Parser;
use std::process::ExitCode;
use tx_annotate::args::{Args, Command};
use tx_annotate::{commands, Config, Mode, Result};
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for running the program without a server. When TX_ANNOTATE_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.action_base())
            .await?
            .print(),

        Command::Render => {
            let config = Config::load(home).await?;
            let out = commands::render(&config).await?;
            out.print();
            if let Some(html) = out.structure() {
                println!("{html}");
            }
        }

        Command::Show(show_args) => {
            let config = Config::load(home).await?;
            commands::show(&config, show_args.id()).await?.print()
        }

        Command::Filter(filter_args) => {
            let config = Config::load(home).await?;
            commands::filter(&config, filter_args).await?.print()
        }

        Command::Annotate(annotate_args) => {
            let config = Config::load(home).await?;
            commands::annotate(&config, mode, annotate_args)
                .await?
                .print()
        }

        Command::Summary => {
            let config = Config::load(home).await?;
            commands::summary(&config).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
