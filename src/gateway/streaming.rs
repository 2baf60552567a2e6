// Streamed-response relay
// Upstream byte chunks in, decoded text fragments out, in arrival order

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::error;

/// Incremental UTF-8 decoder. Multi-byte sequences that span chunk
/// boundaries are carried between calls; invalid sequences decode to
/// U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning every character completed so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.carry);
        buf.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        // Invalid sequence: substitute and keep going
                        Some(skip) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[skip..];
                        }
                        // Incomplete trailing sequence: carry it to the next chunk
                        None => {
                            self.carry = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream. An incomplete trailing sequence decodes
    /// to U+FFFD.
    pub fn finish(self) -> String {
        String::from_utf8_lossy(&self.carry).into_owned()
    }
}

/// Forward an upstream body to the caller chunk by chunk, repairing
/// UTF-8 at chunk boundaries. Nothing is parsed or re-framed; the wire
/// framing (e.g. server-sent events) passes through verbatim. Dropping
/// the returned stream (caller gone) drops the upstream source, which
/// releases its connection.
pub fn relay_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, String>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    async_stream::stream! {
        futures::pin_mut!(upstream);
        let mut decoder = Utf8Decoder::new();

        while let Some(item) = upstream.next().await {
            match item {
                Ok(chunk) => {
                    let fragment = decoder.decode(&chunk);
                    if !fragment.is_empty() {
                        yield Ok(Bytes::from(fragment));
                    }
                }
                Err(err) => {
                    error!("Upstream stream error: {}", err);
                    yield Err(format!("Stream error: {}", err));
                    return;
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            yield Ok(Bytes::from(tail));
        }
    }
}
