use itertools::Itertools;
use unicode_normalization::UnicodeNormalization;

const SITE_SEPARATORS: &[&str] = &[" - ", "_", "|", " – ", " — "];
/// Longest tail still treated as a site name.
const MAX_SITE_SUFFIX_CHARS: usize = 16;

/// Drop a trailing site name such as `标题_新浪新闻` or `Headline - Example`.
/// Only the segment after the last separator is considered, and only if it is
/// short enough to be a site name.
pub fn strip_site_suffix(title: &str) -> &str {
    let title = title.trim();
    let Some((cut, sep_len)) = SITE_SEPARATORS
        .iter()
        .filter_map(|sep| title.rfind(sep).map(|i| (i, sep.len())))
        .max_by_key(|(i, _)| *i)
    else {
        return title;
    };
    let head = title[..cut].trim();
    let tail = title[cut + sep_len..].trim();
    if head.is_empty() || tail.is_empty() || tail.chars().count() > MAX_SITE_SUFFIX_CHARS {
        title
    } else {
        head
    }
}

/// Key used to decide whether two titles are the same story: site suffix
/// removed, NFC, lowercase, alphanumerics only.
pub fn normalized_title(title: &str) -> String {
    strip_site_suffix(title)
        .nfc()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF)
}

/// Lexical units of a title: each CJK character on its own, other runs of
/// alphanumerics as lowercase words.
pub fn tokens(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut word = String::new();
    for c in s.nfc().flat_map(char::to_lowercase) {
        if is_cjk(c) {
            if !word.is_empty() {
                out.push(std::mem::take(&mut word));
            }
            out.push(c.to_string());
        } else if c.is_alphanumeric() {
            word.push(c);
        } else if !word.is_empty() {
            out.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        out.push(word);
    }
    out
}

/// Distinct tokens over total tokens across all titles, in [0, 1]. Zero when
/// there is nothing to measure.
pub fn lexical_diversity<S: AsRef<str>>(titles: &[S]) -> f64 {
    let all: Vec<String> = titles.iter().flat_map(|t| tokens(t.as_ref())).collect();
    if all.is_empty() {
        return 0.0;
    }
    let distinct = all.iter().unique().count();
    distinct as f64 / all.len() as f64
}
