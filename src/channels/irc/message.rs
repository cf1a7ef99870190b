/// Bytes reserved for the `:nick!user@host ` prefix the server prepends
/// when relaying our PRIVMSG.
pub(super) const SENDER_PREFIX_RESERVE: usize = 64;

/// Break outgoing text into IRC-safe payloads.
///
/// CR, LF and NUL all end an IRC line on some servers, so each of them
/// starts a new payload. Every non-empty line becomes its own payload, and
/// lines longer than `max_bytes` are cut on UTF-8 boundaries. A character
/// wider than `max_bytes` is sent whole.
pub(super) fn split_message(message: &str, max_bytes: usize) -> Vec<String> {
    let max_bytes = max_bytes.max(1);
    message
        .split(['\r', '\n', '\0'])
        .filter(|line| !line.is_empty())
        .flat_map(|line| chunk_line(line, max_bytes))
        .collect()
}

fn chunk_line(line: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut start = 0;

    while line.len() - start > max_bytes {
        let mut end = start + max_bytes;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            end = line[start..]
                .char_indices()
                .nth(1)
                .map_or(line.len(), |(i, _)| start + i);
        }
        chunks.push(line[start..end].to_string());
        start = end;
    }
    chunks.push(line[start..].to_string());
    chunks
}

/// CTCP requests (`\x01ACTION ...\x01`, `\x01VERSION\x01`) are not chat text.
pub(super) fn is_ctcp(text: &str) -> bool {
    text.starts_with('\u{1}')
}
