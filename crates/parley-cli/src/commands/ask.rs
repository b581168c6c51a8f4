//! One-shot question: stream the reply straight to stdout.

use anyhow::{Context, Result};
use futures::StreamExt;
use parley_config::ParleyConfig;
use parley_core::{ChatTransport, EventStreamDecoder, HttpTransport, StreamItem, Turn};
use std::io::Write;

pub async fn execute(config: ParleyConfig, question: String) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Question is empty");
    }

    let transport = HttpTransport::new(config.client.endpoint);
    let mut stdout = std::io::stdout();
    stream_reply(&transport, &question, &mut stdout).await?;
    writeln!(stdout)?;
    Ok(())
}

/// Send `question` as a single user turn and write each text delta to `out`
/// as it arrives. Returns the full reply.
pub async fn stream_reply<T, W>(transport: &T, question: &str, out: &mut W) -> Result<String>
where
    T: ChatTransport + ?Sized,
    W: Write,
{
    let history = [Turn::user(question)];
    let mut body = transport
        .send(&history)
        .await
        .context("Chat request failed")?;

    let mut decoder = EventStreamDecoder::new();
    let mut reply = String::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Reply stream interrupted")?;
        if write_items(decoder.feed(&chunk), &mut reply, out)? {
            return Ok(reply);
        }
    }
    write_items(decoder.finish(), &mut reply, out)?;
    Ok(reply)
}

/// Returns true once `[DONE]` has been seen.
fn write_items<W: Write>(items: Vec<StreamItem>, reply: &mut String, out: &mut W) -> Result<bool> {
    for item in items {
        match item {
            StreamItem::Text(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
                reply.push_str(&text);
            }
            StreamItem::Done => return Ok(true),
        }
    }
    Ok(false)
}
