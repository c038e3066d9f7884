//! Display line breaking.
//!
//! Long captions read better when broken at natural points before they are width-wrapped.

/// Captions shorter than this (in characters) are left alone.
const MIN_BREAK_CHARS: usize = 30;

const SENTENCE_BREAKS: [&str; 3] = [". ", "! ", "? "];
const CLAUSE_BREAKS: [&str; 4] = [": ", "; ", ", ", " - "];
const CONJUNCTIONS: [&str; 6] = ["but", "and", "or", "because", "when", "if"];

/// Insert line breaks at natural points.
///
/// Order of preference: after every sentence end; after the first clause separator; before the
/// first conjunction; between the two halves of a caption with more than five words.
pub fn format_text_for_display(text: &str) -> String {
    if text.chars().count() < MIN_BREAK_CHARS {
        return text.to_string();
    }

    if SENTENCE_BREAKS.iter().any(|sep| text.contains(sep)) {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some((idx, sep)) = SENTENCE_BREAKS
            .iter()
            .filter_map(|sep| rest.find(sep).map(|i| (i, *sep)))
            .min_by_key(|(i, _)| *i)
        {
            out.push_str(&rest[..idx + sep.trim_end().len()]);
            out.push('\n');
            rest = &rest[idx + sep.len()..];
        }
        out.push_str(rest);
        return out;
    }

    let clause = CLAUSE_BREAKS
        .iter()
        .filter_map(|sep| text.find(sep).map(|i| (i, *sep)))
        .min_by_key(|(i, _)| *i);
    if let Some((idx, sep)) = clause {
        let head = &text[..idx];
        let tail = &text[idx + sep.len()..];
        return format!("{head}{}\n{tail}", sep.trim_end());
    }

    let conj = CONJUNCTIONS
        .iter()
        .filter_map(|w| text.find(&format!(" {w} ")))
        .min();
    if let Some(idx) = conj {
        return format!("{}\n{}", &text[..idx], &text[idx + 1..]);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 5 {
        let mid = words.len() / 2;
        return format!("{}\n{}", words[..mid].join(" "), words[mid..].join(" "));
    }

    text.to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
