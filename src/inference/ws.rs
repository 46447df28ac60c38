//! `/ws/process-image`: one prompt, one image, streamed results.
//!
//! The client sends `{"prompt": "<keyword>"}` as text, then the gzip-compressed
//! image as a binary frame. Each partial result goes back as
//! `{"user": .., "result": ..}`, then the socket is closed.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRef, Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{prepare, DEFAULT_KEYWORD};
use crate::{auth::JwtKeys, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Control {
    #[serde(default)]
    prompt: Option<String>,
}

pub async fn process_image_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> Response {
    let keys = JwtKeys::from_ref(&state);
    let claims = match q.token.as_deref().map(|t| keys.verify_access(t)) {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => {
            warn!(error = %e, "websocket token rejected");
            return AppError::Unauthorized("Invalid or expired token".into()).into_response();
        }
        None => return AppError::Unauthorized("Missing token".into()).into_response(),
    };
    let user_id = claims.sub;
    info!(user_id = %user_id, "image socket connected");
    ws.on_upgrade(move |socket: WebSocket| async move {
        let (sink, stream) = socket.split();
        serve(&state, user_id, stream, sink).await;
    })
}

fn text(v: serde_json::Value) -> Message {
    Message::Text(v.to_string())
}

/// Runs one session until the result is delivered, an error is reported, or
/// the client goes away.
pub(crate) async fn serve<I, O>(st: &AppState, user_id: Uuid, mut incoming: I, mut outgoing: O)
where
    I: Stream<Item = Result<Message, axum::Error>> + Unpin,
    O: Sink<Message> + Unpin,
{
    let mut keyword: Option<String> = None;
    while let Some(msg) = incoming.next().await {
        match msg {
            Ok(Message::Text(t)) => match serde_json::from_str::<Control>(&t) {
                Ok(c) => {
                    debug!(user_id = %user_id, prompt = ?c.prompt, "control message");
                    keyword = c.prompt;
                }
                Err(e) => warn!(user_id = %user_id, error = %e, "ignoring malformed control message"),
            },
            Ok(Message::Binary(data)) => {
                let kw = keyword.as_deref().unwrap_or(DEFAULT_KEYWORD);
                if let Err(e) = stream_result(st, user_id, kw, &data, &mut outgoing).await {
                    warn!(user_id = %user_id, error = %e, "image processing failed");
                    let _ = outgoing.send(text(json!({ "error": e.to_string() }))).await;
                }
                break;
            }
            Ok(Message::Close(_)) => {
                debug!(user_id = %user_id, "client closed");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "socket receive failed");
                return;
            }
        }
    }
    let _ = outgoing.send(Message::Close(None)).await;
    info!(user_id = %user_id, "image socket closed");
}

async fn stream_result<O>(
    st: &AppState,
    user_id: Uuid,
    keyword: &str,
    compressed: &[u8],
    outgoing: &mut O,
) -> Result<(), AppError>
where
    O: Sink<Message> + Unpin,
{
    let req = prepare(keyword, compressed)?;
    let mut parts = st.generator.generate_stream(req).await?;
    while let Some(part) = parts.next().await {
        let part = part?;
        let frame = text(json!({ "user": user_id.to_string(), "result": part }));
        if outgoing.send(frame).await.is_err() {
            debug!(user_id = %user_id, "client left mid-stream");
            break;
        }
    }
    Ok(())
}
