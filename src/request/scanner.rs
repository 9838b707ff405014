use std::borrow::Cow;

#[derive(Clone, Copy)]
enum State {
    Normal,
    Quoted,
    LineComment,
    BlockComment,
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'/')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Remove `//` and `/* */` comments that sit outside JSON string literals.
///
/// Block comments collapse to a single space so neighbouring tokens stay apart;
/// line comments keep their terminating newline. Returns a borrowed `Cow` when
/// the input has no comments.
#[must_use]
pub(crate) fn strip_comments(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out: Option<Vec<u8>> = None;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => {
                if is_line_comment_start(bytes, idx) {
                    out.get_or_insert_with(|| bytes[..idx].to_vec());
                    state = State::LineComment;
                    idx += 2;
                    continue;
                }
                if is_block_comment_start(bytes, idx) {
                    out.get_or_insert_with(|| bytes[..idx].to_vec());
                    state = State::BlockComment;
                    idx += 2;
                    continue;
                }
                if b == b'"' {
                    state = State::Quoted;
                }
            }
            State::Quoted => {
                if b == b'\\' {
                    // keep the escape and the escaped byte together
                    if let Some(buf) = out.as_mut() {
                        buf.extend_from_slice(&bytes[idx..(idx + 2).min(bytes.len())]);
                    }
                    idx += 2;
                    continue;
                }
                if b == b'"' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                } else {
                    idx += 1;
                    continue;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    if let Some(buf) = out.as_mut() {
                        buf.push(b' ');
                    }
                    state = State::Normal;
                    idx += 2;
                } else {
                    idx += 1;
                }
                continue;
            }
        }

        if let Some(buf) = out.as_mut() {
            buf.push(b);
        }
        idx += 1;
    }

    match out {
        // Only whole comment runs delimited by ASCII bytes were removed.
        Some(buf) => String::from_utf8(buf).map_or(Cow::Borrowed(text), Cow::Owned),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_json_borrowed() {
        let text = r#"{"request": "GetItemsInFridge"}"#;
        assert!(matches!(strip_comments(text), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_line_and_block_comments() {
        let text = "{\"request\": /* verb */ \"GetItemsInFridge\" // trailing\n}";
        assert_eq!(
            strip_comments(text),
            "{\"request\":   \"GetItemsInFridge\" \n}"
        );
    }

    #[test]
    fn skips_comment_markers_inside_strings() {
        let text = r#"{"name": "a // b /* c */", "unit": "\"//\""}"#;
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        let text = "{\"name\": \"Müsli\" /* grünes */}";
        assert_eq!(strip_comments(text), "{\"name\": \"Müsli\"  }");
    }
}
