use avalon_backend::config::Settings;
use avalon_backend::errors::ErrorCode;
use avalon_backend::infra::state::build_state;
use avalon_backend::protocol::{CommandRequest, ErrorResponse, Reply};
use avalon_backend::telemetry;
use avalon_backend::{AppError, CommandDispatcher};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use ulid::Ulid;

/// Reads one JSON command per line on stdin and writes one JSON reply per
/// line on stdout. Logs go to stderr or `LOG_FILE`.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = telemetry::init_tracing(&settings) {
        eprintln!("❌ Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let app_state = match build_state().with_settings(settings).build().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build engine state: {e}");
            std::process::exit(1);
        }
    };

    let dispatcher = CommandDispatcher::new(app_state);
    info!("avalon engine ready; reading commands from stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<CommandRequest>(&line) {
            Ok(request) => dispatcher.handle_request(&request).await,
            Err(e) => {
                warn!(error = %e, "undecodable command line");
                let err = AppError::invalid(
                    ErrorCode::InvalidCommand,
                    format!("malformed command line: {e}"),
                );
                Reply::new(
                    String::new(),
                    Err(ErrorResponse::from_app_error(&err, Ulid::new().to_string())),
                )
            }
        };

        let mut out = serde_json::to_vec(&reply).map_err(std::io::Error::other)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    info!("stdin closed; shutting down");
    Ok(())
}
