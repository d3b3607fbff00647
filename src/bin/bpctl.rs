//! bpctl binary entry point
//!
//! Loads the client config and dispatches to a one-shot command or the panel.

use clap::Parser;
use color_eyre::eyre::Result;
use bpctl::{
    cli::{Args, Command, ConfigCommand},
    commands,
    config::Config,
    logging,
    model::ControlOp,
};

/// Client config with the `--url` override applied
fn load_config(url: Option<&str>) -> Result<Config> {
    let config = Config::load()?;
    match url {
        Some(url) => config.with_base_url(url),
        None => Ok(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Validate reports on the file itself; everything else needs a usable config first
    if let Some(Command::Validate) = args.command {
        logging::init_cli("warn");
        let config = Config::load()?;
        config.print_summary();
        return Ok(());
    }

    let config = load_config(args.url.as_deref())?;

    if let Some(Command::Tui) = args.command {
        #[cfg(feature = "tui")]
        {
            let _log_guard = logging::init_tui(&config.settings.log_level)?;
            return bpctl::tui::run(config).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            eprintln!("TUI feature not enabled");
            eprintln!("Rebuild with: cargo build --features tui");
            std::process::exit(1);
        }
    }

    logging::init_cli(&config.settings.log_level);

    match args.command {
        None => commands::status(&config, false).await,
        Some(Command::Status { json }) => commands::status(&config, json).await,
        Some(Command::Start) => commands::control(&config, ControlOp::Start).await,
        Some(Command::Stop) => commands::control(&config, ControlOp::Stop).await,
        Some(Command::Reload) => commands::control(&config, ControlOp::Reload).await,
        Some(Command::Config(ConfigCommand::Show)) => commands::config_show(&config).await,
        Some(Command::Config(ConfigCommand::Save { file, no_reload })) => {
            commands::config_save(&config, &file, !no_reload).await
        }
        Some(Command::Logs { follow }) => commands::logs(&config, follow).await,
        Some(Command::Validate | Command::Tui) => Ok(()),
    }
}
