//! Line-oriented shell over one session.

use pcommon::SessionId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::Assistant;

pub const PROMPT: &str = "You: ";
const EXIT_WORDS: &[&str] = &["exit", "quit"];

/// Reads lines until EOF or `exit`/`quit`, printing `Assistant: {reply}` for
/// each non-blank line. Returns the number of turns run.
pub async fn run<R, W>(
    assistant: &Assistant,
    session_id: SessionId,
    input: R,
    mut output: W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut turns = 0;

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&line.to_ascii_lowercase().as_str()) {
            break;
        }

        let reply = match assistant.chat(session_id.clone(), line).await {
            Ok(reply) => reply,
            Err(error) => error.display_reply(),
        };
        output
            .write_all(format!("Assistant: {reply}\n\n").as_bytes())
            .await?;
        turns += 1;
    }

    output.flush().await?;
    Ok(turns)
}
