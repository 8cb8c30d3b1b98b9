// HTTP Server Task - setStatus Endpoint für die lokale Variante
use alloc::string::String;
use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::response::{Response, StatusCode};
use picoserve::routing::{parse_path_segment, post};
use sergeant_core::{COMMAND_ACCEPTED, command_return_code, parse_set_status};

use crate::PendingStatus;
use crate::config::*;

/// Antwort-Bodies, nur zwei mögliche Werte
const RESPONSE_ACCEPTED: &str = r#"{"name":"setStatus","return_value":1}"#;
const RESPONSE_REJECTED: &str = r#"{"name":"setStatus","return_value":-1}"#;

/// HTTP Server Task - läuft parallel zum Status Task
///
/// Stellt `POST /setStatus/<green|red|blue>` bereit. Gültige Kommandos
/// werden über das `PendingStatus` Signal an den Status Task übergeben
/// und dort im nächsten Durchlauf übernommen (letzter Schreiber gewinnt).
///
/// # Parameter
/// - `task_id`: Index im Task-Pool (mehrere parallele Verbindungen)
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `pending`: Übergabe an den Status Task
// pool_size muss mit HTTP_TASK_POOL_SIZE übereinstimmen
#[embassy_executor::task(pool_size = 2)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    pending: &'static PendingStatus,
) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new().route(
        ("/setStatus", parse_path_segment::<String>()),
        post(move |argument: String| async move {
            let result = parse_set_status(&argument);
            match result {
                Ok(lamp) => {
                    info!("HTTP: setStatus accepted: {}", lamp);
                    pending.signal(lamp);
                }
                Err(e) => warn!("HTTP: setStatus rejected: {}", e),
            }

            let body = if command_return_code(&result) == COMMAND_ACCEPTED {
                RESPONSE_ACCEPTED
            } else {
                RESPONSE_REJECTED
            };
            Response::new(StatusCode::OK, body).with_header("Content-Type", "application/json")
        }),
    );

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    // task_id ermöglicht mehrere concurrent Server-Instanzen
    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}
