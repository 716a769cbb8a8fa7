use serde_json::Value;

/// Incremental parser for the blank-line-delimited event-stream framing.
///
/// Frames may arrive split at arbitrary byte boundaries; the parser buffers
/// across `feed` calls so a frame straddling a chunk boundary reassembles
/// identically to one delivered whole.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: Vec<u8>,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete JSON records.
    ///
    /// The buffer stays raw bytes until a frame boundary is found; a
    /// multi-byte character split across chunks is never decoded half-way.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Value> {
        self.buffer.extend_from_slice(bytes);
        let mut records = Vec::new();

        while let Some(split) = find_frame_boundary(&self.buffer) {
            let frame = String::from_utf8_lossy(&self.buffer[..split]).into_owned();
            self.buffer.drain(0..split + 2);

            if let Some(record) = decode_frame(&frame) {
                records.push(record);
            }
        }

        records
    }

    /// Drain any non-blank trailing buffer as a final frame at stream end.
    pub fn finish(&mut self) -> Option<Value> {
        let bytes = std::mem::take(&mut self.buffer);
        let frame = String::from_utf8_lossy(&bytes);
        if frame.trim().is_empty() {
            return None;
        }
        decode_frame(&frame)
    }

    /// Parse a complete event-stream payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<Value> {
        let mut parser = Self::default();
        let mut records = parser.feed(input.as_bytes());
        records.extend(parser.finish());
        records
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn find_frame_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

fn decode_frame(frame: &str) -> Option<Value> {
    let payload = extract_data_payload(frame)?;

    match serde_json::from_str::<Value>(&payload) {
        Ok(record) => Some(record),
        Err(error) => {
            // One malformed frame is dropped; decoding continues.
            tracing::warn!(%error, "dropping undecodable event-stream frame");
            None
        }
    }
}

/// Join the payload of every significant line in a frame.
///
/// Only lines whose trimmed form starts with `data:` carry payload; multiple
/// data lines are newline-joined before JSON decoding.
fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .map(str::trim_start)
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}
