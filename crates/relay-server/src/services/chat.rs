//! Chat relay service.

use std::time::Instant;

use relay_core::RelayError;
use tracing::info;

use crate::ServerState;

const PREVIEW_CHARS: usize = 50;

/// Forwards `message` to the configured backend and returns the trimmed reply.
pub async fn reply(state: &ServerState, message: &str) -> Result<String, RelayError> {
    info!(
        "Chat request (model: {}): {}",
        state.config.model,
        preview(message)
    );

    let start = Instant::now();
    let response = state.backend.generate(message).await?;

    info!(
        "Chat reply in {}ms ({} chars)",
        start.elapsed().as_millis(),
        response.len()
    );
    Ok(response)
}

/// First [`PREVIEW_CHARS`] characters of `message`, with `...` if anything was cut.
fn preview(message: &str) -> String {
    match message.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &message[..end]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_logged_whole() {
        assert_eq!(preview("hello"), "hello");
        assert_eq!(preview(&"a".repeat(50)), "a".repeat(50));
    }

    #[test]
    fn long_message_is_cut_at_fifty_chars() {
        let message = "b".repeat(80);
        assert_eq!(preview(&message), format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn multibyte_message_is_cut_on_char_boundary() {
        let message = "é".repeat(80);
        assert_eq!(preview(&message), format!("{}...", "é".repeat(50)));
    }
}
