//! Shared text primitives: alphanumeric-run tokenization and heuristic
//! sentence segmentation. The source documents are technical text dense
//! with embedded numbers and mixed scripts, so segmentation stays
//! deliberately crude.

/// Sentence-terminal markers. Tuned for the source document's conventions;
/// not expected to generalize.
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。'];

/// Closing brackets accepted immediately before a sentence terminator.
const CLOSING_BRACKETS: &[char] = &[')', ']', '）', '」', '』'];

/// A token with its byte range in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Extracts maximal runs of letters (any script) and digits; every other
/// character is a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Tokenizer variant for the numeric checker: a decimal point between two
/// digits stays inside the token, so `0.5` survives as one token while
/// sentence-final periods still separate. Returns byte spans so callers can
/// locate neighboring tokens around a pattern match.
pub fn tokenize_decimal_spans(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut current: Option<Token> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        let joins = ch.is_alphanumeric()
            || (ch == '.'
                && current
                    .as_ref()
                    .is_some_and(|tok| tok.text.ends_with(|c: char| c.is_ascii_digit()))
                && iter.peek().is_some_and(|&(_, next)| next.is_ascii_digit()));

        if joins {
            let end = idx + ch.len_utf8();
            match current.as_mut() {
                Some(tok) => {
                    tok.text.push(ch);
                    tok.end = end;
                }
                None => {
                    current = Some(Token {
                        text: ch.to_string(),
                        start: idx,
                        end,
                    });
                }
            }
        } else if let Some(tok) = current.take() {
            tokens.push(tok);
        }
    }
    if let Some(tok) = current {
        tokens.push(tok);
    }

    tokens
}

/// Splits raw source text into trimmed candidate sentences.
///
/// Lines are split first (blank lines dropped); within a line, a terminator
/// ends a sentence only when it directly follows an alphanumeric character
/// or a closing bracket and is followed by whitespace or end-of-line. This
/// keeps decimal points, enumerated-clause numbering such as `3.1.2`, and
/// parenthetical abbreviations intact.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let chars: Vec<(usize, char)> = line.char_indices().collect();
        let mut start = 0_usize;

        for (pos, &(idx, ch)) in chars.iter().enumerate() {
            if !SENTENCE_TERMINATORS.contains(&ch) {
                continue;
            }

            let prev_ok = pos > 0 && {
                let prev = chars[pos - 1].1;
                prev.is_alphanumeric() || CLOSING_BRACKETS.contains(&prev)
            };
            let next_ok = chars
                .get(pos + 1)
                .is_none_or(|&(_, next)| next.is_whitespace());

            if prev_ok && next_ok {
                let end = idx + ch.len_utf8();
                let piece = line[start..end].trim();
                if !piece.is_empty() {
                    sentences.push(piece.to_string());
                }
                start = end;
            }
        }

        let tail = line[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
    }

    sentences
}
