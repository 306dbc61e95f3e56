//! Streamed response decoding.
//!
//! The upstream service answers with a line-delimited body. Content lines are
//! wrapped as `0:"<text>"`, and a line containing `"stop"` ends the answer.
//! The body is split into lines as bytes arrive, each wrapper is stripped, and
//! the fragments are concatenated into the final answer.

use std::fmt::Display;
use std::io::Write;

use futures_util::stream::{self, Stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::constants::STOP_SENTINEL;
use crate::errors::ChatError;

/// Full-line match of the `0:"..."` wrapper. Anything after the closing quote
/// makes the match fail and the line is kept as is.
static WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^0:"(.*)"$"#).expect("wrapper pattern is valid"));

/// Returns the wrapped body of a content line, or the line unchanged when it
/// does not have the exact wrapper shape.
pub fn strip_wrapper(line: &str) -> &str {
    WRAPPER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map_or(line, |body| body.as_str())
}

/// Accumulates decoded fragments until the stop sentinel.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    accumulated: String,
    fragments: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line. Returns the fragment that was appended, or `None` when
    /// the line is the stop sentinel and decoding must end.
    pub fn push_line<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        if line.contains(STOP_SENTINEL) {
            return None;
        }
        let fragment = strip_wrapper(line);
        self.accumulated.push_str(fragment);
        self.fragments += 1;
        Some(fragment)
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Final answer with surrounding whitespace removed.
    pub fn finish(self) -> String {
        self.accumulated.trim().to_string()
    }
}

/// Decodes a stream of lines into the final answer.
///
/// Each fragment is written to `echo` (and flushed) as soon as it is decoded.
/// Lines after the stop sentinel are never pulled from `lines`. The first
/// error ends decoding and nothing accumulated so far is returned.
pub async fn decode_stream<S, W>(lines: S, mut echo: Option<&mut W>) -> Result<String, ChatError>
where
    S: Stream<Item = Result<String, ChatError>>,
    W: Write + ?Sized,
{
    futures_util::pin_mut!(lines);
    let mut decoder = StreamDecoder::new();

    while let Some(line) = lines.next().await {
        let line = line?;
        let Some(fragment) = decoder.push_line(&line) else {
            debug!("Stop sentinel received after {} fragments", decoder.fragments());
            break;
        };
        if let Some(sink) = echo.as_deref_mut() {
            sink.write_all(fragment.as_bytes())
                .and_then(|_| sink.flush())
                .map_err(ChatError::response)?;
        }
    }

    debug!("Decoded {} fragments", decoder.fragments());
    Ok(decoder.finish())
}

/// Splits a byte stream into text lines.
///
/// Lines end at `\n` with an optional preceding `\r`. A final line without a
/// terminator is still yielded. A read error on the byte stream is a transport
/// failure ([`ChatError::Request`] without status) and ends the stream;
/// invalid UTF-8 is a [`ChatError::Response`].
pub fn lines_from_bytes<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, ChatError>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    stream::unfold(
        (bytes, LineBuffer::default(), false),
        |(mut bytes, mut buffer, mut exhausted)| async move {
            loop {
                if let Some(line) = buffer.next_line() {
                    return Some((decode_line(line), (bytes, buffer, exhausted)));
                }

                if exhausted {
                    let line = buffer.take_rest()?;
                    return Some((decode_line(line), (bytes, buffer, exhausted)));
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => buffer.push(chunk.as_ref()),
                    Some(Err(e)) => {
                        buffer.clear();
                        exhausted = true;
                        return Some((Err(ChatError::transport(e)), (bytes, buffer, exhausted)));
                    }
                    None => exhausted = true,
                }
            }
        },
    )
}

/// Byte buffer that hands out complete lines.
///
/// `start` is where the next line begins and `scanned` is how far the buffer
/// has been searched for `\n`. Each byte is searched once, and a pending
/// partial line is moved to the front at most once.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: Vec<u8>,
    start: usize,
    scanned: usize,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Next `\n`-terminated line, without the terminator.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        match self.buf[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset;
                let line = self.buf[self.start..end].to_vec();
                self.start = end + 1;
                self.scanned = self.start;
                Some(line)
            }
            None => {
                self.scanned = self.buf.len();
                None
            }
        }
    }

    /// Unterminated remainder at end of body, if any.
    fn take_rest(&mut self) -> Option<Vec<u8>> {
        if self.start >= self.buf.len() {
            return None;
        }
        let rest = self.buf[self.start..].to_vec();
        self.clear();
        Some(rest)
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
        self.scanned = 0;
    }
}

fn decode_line(mut line: Vec<u8>) -> Result<String, ChatError> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line)
        .map_err(|e| ChatError::response(format!("invalid UTF-8 in response line: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok_lines(lines: &[&str]) -> Vec<Result<String, ChatError>> {
        lines.iter().map(|l| Ok(l.to_string())).collect()
    }

    async fn decode(lines: &[&str]) -> String {
        decode_stream(stream::iter(ok_lines(lines)), None::<&mut Vec<u8>>)
            .await
            .unwrap()
    }

    async fn collect_lines(chunks: Vec<&'static [u8]>) -> Vec<Result<String, ChatError>> {
        let bytes = stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
        lines_from_bytes(bytes).collect().await
    }

    #[test]
    fn strips_simple_wrapper() {
        assert_eq!(strip_wrapper(r#"0:"Hello ""#), "Hello ");
        assert_eq!(strip_wrapper(r#"0:"""#), "");
    }

    #[test]
    fn trailing_content_is_passed_through() {
        assert_eq!(strip_wrapper(r#"0:"Hi" extra"#), r#"0:"Hi" extra"#);
    }

    #[test]
    fn escaped_text_is_not_unescaped() {
        assert_eq!(strip_wrapper(r#"0:"line\nnext""#), r#"line\nnext"#);
        assert_eq!(strip_wrapper(r#"0:"say \"hi\"""#), r#"say \"hi\""#);
    }

    #[test]
    fn other_prefixes_are_not_stripped() {
        assert_eq!(strip_wrapper(r#"1:"meta""#), r#"1:"meta""#);
        assert_eq!(strip_wrapper("plain text"), "plain text");
    }

    #[test]
    fn decoder_stops_on_sentinel() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.push_line(r#"0:"a""#), Some("a"));
        assert_eq!(decoder.push_line(r#"e:{"finishReason":"stop"}"#), None);
        assert_eq!(decoder.fragments(), 1);
        assert_eq!(decoder.finish(), "a");
    }

    #[tokio::test]
    async fn decodes_well_formed_stream() {
        let answer = decode(&[r#"0:"Hello ""#, r#"0:"world""#, r#""stop""#]).await;
        assert_eq!(answer, "Hello world");
    }

    #[tokio::test]
    async fn result_is_trimmed() {
        let answer = decode(&[r#"0:"  padded ""#, r#"0:" ""#]).await;
        assert_eq!(answer, "padded");
    }

    #[tokio::test]
    async fn lines_after_sentinel_are_not_pulled() {
        let pulled = AtomicUsize::new(0);
        let lines = stream::iter(ok_lines(&[r#"0:"one""#, r#""stop""#, r#"0:"two""#, r#"0:"three""#]))
            .inspect(|_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            });

        let answer = decode_stream(lines, None::<&mut Vec<u8>>).await.unwrap();
        assert_eq!(answer, "one");
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_line_is_appended_raw() {
        let answer = decode(&[r#"0:"Hi" extra"#, r#""stop""#]).await;
        assert_eq!(answer, r#"0:"Hi" extra"#);
    }

    #[tokio::test]
    async fn echo_receives_fragments_in_order() {
        let mut sink: Vec<u8> = Vec::new();
        let lines = stream::iter(ok_lines(&[r#"0:"Hel""#, r#"0:"lo ""#, r#"0:"there""#, r#""stop""#]));

        let answer = decode_stream(lines, Some(&mut sink)).await.unwrap();
        assert_eq!(answer, "Hello there");
        assert_eq!(String::from_utf8(sink).unwrap(), "Hello there");
    }

    #[tokio::test]
    async fn error_discards_accumulated_output() {
        let lines = stream::iter(vec![
            Ok(r#"0:"partial""#.to_string()),
            Err(ChatError::response("boom")),
            Ok(r#"0:"never""#.to_string()),
        ]);

        let err = decode_stream(lines, None::<&mut Vec<u8>>).await.unwrap_err();
        assert!(err.is_response());
    }

    #[tokio::test]
    async fn splits_lines_across_chunk_boundaries() {
        let lines = collect_lines(vec![&b"0:\"Hel"[..], &b"lo\"\r\n0:"[..], &b"\"world\"\n\"stop\""[..]]).await;
        let lines: Vec<String> = lines.into_iter().map(Result::unwrap).collect();
        assert_eq!(lines, vec![r#"0:"Hello""#, r#"0:"world""#, r#""stop""#]);
    }

    #[tokio::test]
    async fn keeps_empty_lines() {
        let lines = collect_lines(vec![&b"a\n\nb\n"[..]]).await;
        let lines: Vec<String> = lines.into_iter().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_response_error() {
        let lines = collect_lines(vec![&b"0:\"\xff\xfe\"\n"[..]]).await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].as_ref().unwrap_err().is_response());
    }

    #[tokio::test]
    async fn read_error_ends_the_stream() {
        let bytes = stream::iter(vec![
            Ok(b"0:\"a\"\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(b"0:\"b\"\n".to_vec()),
        ]);
        let lines: Vec<_> = lines_from_bytes(bytes).collect().await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].as_deref().unwrap(), r#"0:"a""#);
        let err = lines[1].as_ref().unwrap_err();
        assert!(err.is_request());
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("reset"));
    }

    #[tokio::test]
    async fn long_line_fed_bytewise_is_reassembled() {
        let line = format!("0:\"{}\"", "x".repeat(4096));
        let mut body = line.clone().into_bytes();
        body.extend_from_slice(b"\n\"stop\"\n");
        let bytes = stream::iter(body.into_iter().map(|b| Ok::<_, std::io::Error>(vec![b])));

        let lines: Vec<String> = lines_from_bytes(bytes)
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(lines, vec![line, r#""stop""#.to_string()]);
    }

    #[test]
    fn line_buffer_scans_each_byte_once() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"ab");
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.scanned, 2);

        buffer.push(b"c\nde");
        assert_eq!(buffer.next_line(), Some(b"abc".to_vec()));
        assert_eq!(buffer.next_line(), None);
        assert_eq!((buffer.start, buffer.scanned), (4, 6));

        buffer.push(b"f\n");
        assert_eq!(buffer.start, 0);
        assert_eq!(buffer.next_line(), Some(b"def".to_vec()));
        assert_eq!(buffer.take_rest(), None);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn echo_failure_is_a_response_error() {
        let lines = stream::iter(ok_lines(&[r#"0:"Hello""#, r#""stop""#]));
        let mut sink = BrokenPipe;

        let result = decode_stream(lines, Some(&mut sink)).await;
        let err = result.expect_err("echo write fails");
        assert!(err.is_response());
        assert!(err.to_string().contains("closed"));
    }
}
