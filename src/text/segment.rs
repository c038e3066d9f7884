//! Splitting overlay text into plain and emoji runs.

/// A maximal run of one kind of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRun {
    /// Text drawn with the slide font.
    Plain(String),
    /// One or more emoji clusters drawn with the emoji font.
    Emoji(String),
}

impl TextRun {
    /// Run contents.
    pub fn as_str(&self) -> &str {
        match self {
            TextRun::Plain(s) | TextRun::Emoji(s) => s,
        }
    }
}

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';

/// Code points that start an emoji cluster.
pub fn is_emoji_base(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF   // pictographs, emoticons, transport, flags, extended-A
        | 0x2600..=0x27BF   // misc symbols, dingbats
        | 0x2B00..=0x2BFF   // stars, arrows
        | 0x2300..=0x23FF   // watch, hourglass, media controls
        | 0x24C2
        | 0x3030
        | 0x303D
        | 0x3297
        | 0x3299
    )
}

/// Code points that never stand alone and extend the preceding emoji.
fn is_emoji_modifier(c: char) -> bool {
    matches!(
        u32::from(c),
        0xFE0E..=0xFE0F     // variation selectors
        | 0x1F3FB..=0x1F3FF // skin tones
        | 0x20E3            // combining keycap
        | 0xE0020..=0xE007F // tag sequences
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(u32::from(c), 0x1F1E6..=0x1F1FF)
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// Length in bytes of the emoji cluster starting at `s[0]`, or `None` when `s` does not start
/// with one.
fn emoji_cluster_len(s: &str) -> Option<usize> {
    let mut it = s.char_indices().peekable();
    let (_, first) = it.next()?;

    if is_keycap_base(first) {
        // `1️⃣` and `1⃣`
        let mut len = first.len_utf8();
        let rest = &s[len..];
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(VS16), Some(KEYCAP)) => len += VS16.len_utf8() + KEYCAP.len_utf8(),
            (Some(KEYCAP), _) => len += KEYCAP.len_utf8(),
            _ => return None,
        }
        return Some(len);
    }

    if !is_emoji_base(first) {
        return None;
    }

    let mut end = first.len_utf8();
    if is_regional_indicator(first) {
        if let Some(&(i, c)) = it.peek()
            && is_regional_indicator(c)
        {
            end = i + c.len_utf8();
        }
        return Some(end);
    }

    while let Some(&(i, c)) = it.peek() {
        if is_emoji_modifier(c) {
            end = i + c.len_utf8();
            it.next();
        } else if c == ZWJ {
            it.next();
            match it.peek() {
                Some(&(j, next)) if is_emoji_base(next) => {
                    end = j + next.len_utf8();
                    it.next();
                }
                _ => break,
            }
        } else {
            break;
        }
    }
    Some(end)
}

/// Split `text` into emoji clusters, in order.
///
/// Non-emoji characters inside `text` are ignored.
pub fn emoji_clusters(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        match emoji_cluster_len(rest) {
            Some(n) => {
                out.push(&rest[..n]);
                i += n;
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    out
}

/// Scan `text` left to right and group it into plain and emoji runs.
///
/// Stray modifiers and joiners outside an emoji cluster are dropped so they never reach the
/// plain-text font as `.notdef` boxes.
pub fn segment_runs(text: &str) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if let Some(n) = emoji_cluster_len(rest) {
            match runs.last_mut() {
                Some(TextRun::Emoji(s)) => s.push_str(&rest[..n]),
                _ => runs.push(TextRun::Emoji(rest[..n].to_string())),
            }
            i += n;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        i += c.len_utf8();
        if is_emoji_modifier(c) || c == ZWJ {
            continue;
        }
        match runs.last_mut() {
            Some(TextRun::Plain(s)) => s.push(c),
            _ => runs.push(TextRun::Plain(c.to_string())),
        }
    }
    runs
}

#[cfg(test)]
#[path = "../../tests/unit/text/segment.rs"]
mod tests;
