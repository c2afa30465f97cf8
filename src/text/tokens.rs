/// One indivisible unit of caption text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Run of non-space, non-pictogram characters.
    Word(&'a str),
    /// Run of whitespace.
    Space,
    /// Pictogram cluster (emoji with its modifiers, ZWJ sequence, keycap or flag).
    Pictogram(&'a str),
}

const ZWJ: char = '\u{200D}';
const KEYCAP: char = '\u{20E3}';

/// Split `text` into words, spaces and pictogram clusters.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_whitespace() {
            flush_word(text, &mut word_start, i, &mut out);
            if out.last() != Some(&Token::Space) {
                out.push(Token::Space);
            }
            i += ch.len_utf8();
            continue;
        }

        if let Some(len) = pictogram_len(rest) {
            flush_word(text, &mut word_start, i, &mut out);
            out.push(Token::Pictogram(&rest[..len]));
            i += len;
            continue;
        }

        word_start.get_or_insert(i);
        i += ch.len_utf8();
    }
    flush_word(text, &mut word_start, text.len(), &mut out);
    out
}

fn flush_word<'a>(text: &'a str, start: &mut Option<usize>, end: usize, out: &mut Vec<Token<'a>>) {
    if let Some(s) = start.take() {
        out.push(Token::Word(&text[s..end]));
    }
}

/// Byte length of the pictogram cluster at the start of `s`, if one starts there.
pub fn pictogram_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices().peekable();
    let (_, first) = chars.next()?;

    if is_regional_indicator(first) {
        let len = match chars.peek() {
            Some(&(j, c)) if is_regional_indicator(c) => j + c.len_utf8(),
            _ => first.len_utf8(),
        };
        return Some(len);
    }

    if matches!(first, '0'..='9' | '#' | '*') {
        let mut end = first.len_utf8();
        let mut it = s[end..].chars();
        let mut next = it.next();
        if next == Some('\u{FE0F}') {
            end += 3;
            next = it.next();
        }
        return (next == Some(KEYCAP)).then_some(end + KEYCAP.len_utf8());
    }

    if !is_pictographic(first) {
        return None;
    }

    let mut end = first.len_utf8();
    while let Some(&(j, c)) = chars.peek() {
        if is_modifier(c) {
            end = j + c.len_utf8();
            chars.next();
        } else if c == ZWJ {
            chars.next();
            match chars.peek() {
                Some(&(k, next)) if is_pictographic(next) => {
                    end = k + next.len_utf8();
                    chars.next();
                }
                _ => break,
            }
        } else {
            break;
        }
    }
    Some(end)
}

/// Emoji presentation ranges.
pub fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1F1E5
            | 0x1F200..=0x1F2FF
            | 0x1F300..=0x1F5FF
            | 0x1F600..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F700..=0x1F7FF
            | 0x1F900..=0x1F9FF
            | 0x1FA70..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2B05..=0x2B55
            | 0x2190..=0x21FF
            | 0x231A..=0x23FF
            | 0x3030
            | 0x303D
            | 0x3297
            | 0x3299
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(u32::from(c), 0x1F1E6..=0x1F1FF)
}

fn is_modifier(c: char) -> bool {
    matches!(
        u32::from(c),
        0xFE0E | 0xFE0F | 0x1F3FB..=0x1F3FF | 0x20E3 | 0xE0020..=0xE007F
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/tokens.rs"]
mod tests;
