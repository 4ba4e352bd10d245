//! Message chunking
//!
//! Splits long replies into pieces that fit a single Telegram message,
//! breaking on the last newline inside the limit when there is one.
//! Lengths are counted in chars so multibyte text is never cut mid-character.

/// Telegram's maximum text length per message
pub const TELEGRAM_MAX_LENGTH: usize = 4096;

/// Split `text` into chunks of at most `max_len` chars.
///
/// Text that already fits comes back unchanged as a single chunk. Otherwise
/// each cut happens at the last newline at or before `max_len` (the newline
/// itself is dropped), or exactly at `max_len` when no usable newline exists.
/// Leading whitespace of each following chunk is stripped.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);

    if text.chars().nth(max_len).is_none() {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while let Some((limit, limit_char)) = remaining.char_indices().nth(max_len) {
        let window = &remaining[..limit + limit_char.len_utf8()];
        let split_at = match window.rfind('\n') {
            Some(idx) if idx > 0 => idx,
            _ => limit,
        };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_CHUNK: usize = TELEGRAM_MAX_LENGTH;

    fn assert_within(chunks: &[String], max_len: usize) {
        for chunk in chunks {
            assert!(
                chunk.chars().count() <= max_len,
                "chunk of {} chars exceeds {}",
                chunk.chars().count(),
                max_len
            );
        }
    }

    #[test]
    fn test_short_message_single_chunk() {
        let msg = "Hello, world!";
        assert_eq!(split_message(msg, MAX_CHUNK), vec![msg.to_string()]);
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(split_message("", MAX_CHUNK), vec![String::new()]);
    }

    #[test]
    fn test_exact_boundary_message() {
        let msg = "a".repeat(MAX_CHUNK);
        let chunks = split_message(&msg, MAX_CHUNK);
        assert_eq!(chunks, vec![msg]);
    }

    #[test]
    fn test_hard_cut_without_newlines() {
        let msg = "a".repeat(MAX_CHUNK + 100);
        let chunks = split_message(&msg, MAX_CHUNK);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), MAX_CHUNK);
        assert_eq!(chunks[1].len(), 100);
    }

    #[test]
    fn test_prefers_last_newline() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_newline_exactly_at_limit() {
        let text = "abcde\nfgh";
        let chunks = split_message(text, 5);
        assert_eq!(chunks, vec!["abcde", "fgh"]);
    }

    #[test]
    fn test_leading_newline_is_not_a_break() {
        let text = "\nabcdefghij";
        let chunks = split_message(text, 4);
        assert_eq!(chunks, vec!["\nabc", "defg", "hij"]);
    }

    #[test]
    fn test_strips_leading_whitespace_of_next_chunk() {
        let text = "first line\n   second line";
        let chunks = split_message(text, 12);
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn test_trailing_whitespace_chunk_is_omitted() {
        let text = format!("{}\n     ", "a".repeat(8));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["a".repeat(8)]);
    }

    #[test]
    fn test_utf8_multibyte_not_broken() {
        let base = "a".repeat(MAX_CHUNK - 2);
        let msg = format!("{}日本語", base);
        let chunks = split_message(&msg, MAX_CHUNK);

        assert_within(&chunks, MAX_CHUNK);
        assert_eq!(chunks.concat(), msg);
    }

    #[test]
    fn test_emoji_boundary() {
        let base = "a".repeat(MAX_CHUNK - 3);
        let msg = format!("{}🚀🎉🚀🎉", base);
        let chunks = split_message(&msg, MAX_CHUNK);

        assert_within(&chunks, MAX_CHUNK);
        assert_eq!(chunks.concat(), msg);
    }

    #[test]
    fn test_max_len_one_terminates() {
        let chunks = split_message("ab\ncd", 1);
        assert_eq!(chunks, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_zero_max_len_is_treated_as_one() {
        let chunks = split_message("xyz", 0);
        assert_eq!(chunks, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_every_chunk_within_limit() {
        let mut text = String::new();
        for i in 0..2000 {
            text.push_str(&"word ".repeat(i % 37));
            text.push('\n');
            if i % 11 == 0 {
                text.push_str("   \n\n");
            }
        }

        for max_len in [1, 7, 64, 500, MAX_CHUNK] {
            let chunks = split_message(&text, max_len);
            assert!(!chunks.is_empty());
            assert_within(&chunks, max_len);
        }
    }

    #[test]
    fn test_content_is_preserved_modulo_whitespace() {
        let text = (0..500)
            .map(|i| format!("line {} of the answer", i))
            .collect::<Vec<_>>()
            .join("\n");

        let chunks = split_message(&text, 300);
        let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
        assert_eq!(strip(&chunks.concat()), strip(&text));
        for chunk in &chunks {
            assert!(!chunk.starts_with('\n'));
        }
    }
}
