use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use dice_poker_client::client::api::LegacyApiClient;
use dice_poker_client::client::config::Config;
use dice_poker_client::client::logging::init_logging;
use dice_poker_client::client::terminal::Command as TableCommand;
use dice_poker_client::client::{App, RoomSocketClient};
use dice_poker_client::core::constants::DICE_COUNT;
use dice_poker_client::core::format::format_dice;
use dice_poker_client::core::io_traits::SystemClock;

#[derive(Parser, Debug)]
#[command(
    name = "dice-poker",
    about = "Play two-player Dice Poker rooms from the terminal",
    version
)]
struct Cli {
    #[arg(
        long,
        short = 'c',
        value_name = "PATH",
        help = "Config file (defaults to dice_poker.toml next to the binary)"
    )]
    config: Option<PathBuf>,

    #[arg(long, short = 'n', help = "Player name, overrides [player] name")]
    name: Option<String>,

    #[arg(
        long = "socket-url",
        value_name = "URL",
        env = Config::ENV_SOCKET_URL,
        help = "Game server URL, overrides [server] socket_url"
    )]
    socket_url: Option<String>,

    #[arg(
        long = "api-url",
        value_name = "URL",
        env = Config::ENV_API_BASE_URL,
        help = "Legacy REST base URL, overrides [server] api_base_url"
    )]
    api_base_url: Option<String>,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
struct LoggingArgs {
    #[arg(
        long = "log-console",
        action = clap::ArgAction::SetTrue,
        help = "Mirror logs to stderr"
    )]
    console: bool,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help = "Write logs to the specified file"
    )]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room and wait for an opponent
    Create,
    /// Join an existing room by code
    Join {
        #[arg(value_name = "CODE")]
        code: String,
    },
    /// Exercise the legacy single-table REST endpoints
    Legacy {
        #[command(subcommand)]
        action: LegacyAction,
    },
}

#[derive(Subcommand, Debug)]
enum LegacyAction {
    /// Roll all five dice
    Roll,
    /// Print the name of the current hand
    Evaluate,
    /// Advance to the next turn
    NextTurn,
    /// Start a new game
    NewGame,
}

fn run_legacy(config: &Config, action: LegacyAction) -> Result<(), String> {
    let api = LegacyApiClient::new(&config.server.api_base_url).map_err(|e| e.to_string())?;
    match action {
        LegacyAction::Roll => {
            let dice = api.roll([true; DICE_COUNT]).map_err(|e| e.to_string())?;
            println!("{}", format_dice(&dice));
        }
        LegacyAction::Evaluate => println!("{}", api.evaluate().map_err(|e| e.to_string())?),
        LegacyAction::NextTurn => println!("{}", api.next_turn().map_err(|e| e.to_string())?),
        LegacyAction::NewGame => println!("{}", api.new_game().map_err(|e| e.to_string())?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply_overrides(cli.socket_url.as_deref(), cli.api_base_url.as_deref());

    let log_file = cli.logging.file.clone().or_else(|| config.log_file_path());
    init_logging(
        cli.logging.console || config.logging.console,
        log_file,
        &config.logging.level,
    );
    info!(
        socket_url = %config.server.socket_url,
        config = %config_path.display(),
        "[APP] Starting"
    );

    let name = cli.name.clone().unwrap_or_else(|| config.player.name.clone());

    let initial = match cli.command {
        Some(Command::Legacy { action }) => {
            return match run_legacy(&config, action) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "[API] Request failed");
                    eprintln!("{}", e);
                    ExitCode::FAILURE
                }
            };
        }
        Some(Command::Create) => Some(TableCommand::Create { name: None }),
        Some(Command::Join { code }) => Some(TableCommand::Join { code, name: None }),
        None => None,
    };

    let socket = RoomSocketClient::new(&config.server.socket_url);
    let mut app = App::new(socket, SystemClock, name);
    if let Some(command) = initial {
        app.handle_command(command);
    }

    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "[APP] Terminal error");
            ExitCode::FAILURE
        }
    }
}
