use std::net::SocketAddr;
use std::rc::Rc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, warn};

use crate::connection::Connection;

/// Serve one WebSocket client until it closes.
///
/// Each text frame is one request; the reply goes back as one text frame on the
/// same socket. Queries run synchronously, so the worker's other clients wait
/// while one is answered.
pub(crate) async fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    connection: Rc<Connection>,
    route: Rc<str>,
    worker: usize,
) {
    let _ = stream.set_nodelay(true);

    let check_route = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        if req.uri().path() == &*route {
            Ok(resp)
        } else {
            let mut rejection = ErrorResponse::new(Some(format!("no such route: {}", req.uri().path())));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        }
    };

    let mut ws = match accept_hdr_async(stream, check_route).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!(worker, %peer, error = %err, "WebSocket handshake failed");
            return;
        }
    };
    debug!(worker, %peer, "client connected");

    while let Some(message) = ws.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    let reply = connection.replies().not_json().to_owned();
                    if ws.send(Message::text(reply)).await.is_err() {
                        break;
                    }
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                warn!(worker, %peer, error = %err, "WebSocket read failed");
                break;
            }
        };

        let reply = connection.query(&text);
        if let Err(err) = ws.send(Message::text(reply)).await {
            warn!(worker, %peer, error = %err, "WebSocket send failed");
            break;
        }
    }
    debug!(worker, %peer, "client disconnected");
}
