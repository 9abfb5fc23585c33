//! A terminal client for two-player online dice games.
//!
//! The client registers or authenticates against the game server's HTTP
//! API, creates or joins a game, and plays it over the game's WebSocket.

use anyhow::{Context, Result};
use dice_duel::{Route, Sequencer, Session, Username};
use pico_args::Arguments;
use std::path::PathBuf;
use std::time::Instant;

use dd_client::{
    api_client::{ApiClient, Credentials},
    config::{ClientConfig, ConfigOverrides},
    logging::{self, LogTarget},
    tui_app::{TuiApp, results_message},
    websocket_client::WebSocketClient,
};

const HELP: &str = "\
Play a two-player dice game

USAGE:
  dd_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://localhost:8000]
  --username NAME       Username to play as  [default: OS user]
  --password PASS       Password for HTTP Basic auth
  --game CODE           Join an existing game instead of creating one
  --animation-ms MS     Minimum roll animation time  [default: 2000]
  --log-file PATH       Log file used in TUI mode  [default: dd_client.log]

FLAGS:
  --register            Create the account before playing
  --tui                 Use TUI (Terminal UI) mode
  -h, --help            Print help information

ENVIRONMENT:
  DICE_SERVER_URL, DICE_USERNAME, DICE_PASSWORD, DICE_GAME,
  DICE_ANIMATION_MS, DICE_LOG_FILE, RUST_LOG
";

struct Args {
    overrides: ConfigOverrides,
    register: bool,
}

fn parse_args() -> Result<Args> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = ConfigOverrides {
        server_url: pargs.opt_value_from_str("--server")?,
        username: pargs.opt_value_from_str("--username")?,
        password: pargs.opt_value_from_str("--password")?,
        game_id: pargs.opt_value_from_str("--game")?,
        animation_ms: pargs.opt_value_from_str("--animation-ms")?,
        log_file: pargs.opt_value_from_os_str("--log-file", |s| {
            Ok::<_, std::convert::Infallible>(PathBuf::from(s))
        })?,
        use_tui: pargs.contains("--tui"),
    };
    let register = pargs.contains("--register");

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}. Use --help for usage");
    }

    Ok(Args {
        overrides,
        register,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = ClientConfig::from_env(args.overrides).context("Invalid configuration")?;

    let target = if config.use_tui {
        LogTarget::File(config.log_file.clone())
    } else {
        LogTarget::Stderr
    };
    logging::init(&target)?;

    run(config, args.register).await
}

async fn run(config: ClientConfig, register: bool) -> Result<()> {
    let credentials = config
        .password
        .as_ref()
        .map(|password| Credentials::new(config.username.clone(), password.clone()));

    let mut api_client = ApiClient::new(config.server_url.clone());
    if register {
        let password = config
            .password
            .as_deref()
            .context("--register needs a password")?;
        println!("Registering {}...", config.username);
        let user = api_client
            .register(&config.username, password)
            .await
            .context("Failed to register")?;
        tracing::info!(user_id = user.id, "Registered {}", user.username);
        println!("Registered successfully!");
    }
    if let Some(credentials) = credentials.clone() {
        api_client = api_client.with_credentials(credentials);
    }

    let game_id = match &config.game_id {
        Some(game_id) => game_id.clone(),
        None => {
            let start = Instant::now();
            let game = api_client
                .create_game()
                .await
                .context("Failed to create a game")?;
            logging::log_request(
                "create_game",
                u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            );
            println!("Created game {}. Share this code with your opponent.", game.id);
            game.id
        }
    };

    let session = Session::new(
        Username::new(&config.username),
        &game_id,
        api_client.websocket_url(&game_id),
    )?;
    let sequencer = Sequencer::new(config.animation);

    let route = if config.use_tui {
        let terminal = ratatui::init();
        let result = TuiApp::new(session.clone(), credentials, sequencer)
            .run(terminal)
            .await;
        ratatui::restore();
        result?
    } else {
        WebSocketClient::new(session.clone(), credentials, sequencer)
            .connect_and_play()
            .await?
    };

    match route {
        Some(Route::Results(outcome)) => {
            println!("\n{}", results_message(session.local_player(), &outcome));
            match api_client.get_game(&game_id).await {
                Ok(game) => println!(
                    "Final scores: {} - {}",
                    game.player1_score, game.player2_score
                ),
                Err(e) => tracing::warn!("Couldn't fetch final scores: {e:#}"),
            }
        }
        Some(Route::Home) => println!("\nReturned to the home screen."),
        None => println!("\nLeft the game."),
    }
    Ok(())
}
