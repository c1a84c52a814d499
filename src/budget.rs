use crate::models::BackgroundSnippet;

pub const MAX_PROMPT_TITLES: usize = 5;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_LABEL_CHARS: usize = 64;

pub fn approx_tokens(s: &str) -> usize {
    // heuristic ~4 chars/token
    (s.chars().count() + 3) / 4
}

pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.trim().chars().take(max_chars).collect()
}

/// Snippet titles for the prompt: at most [`MAX_PROMPT_TITLES`], each capped,
/// and the whole block kept under `max_tokens`.
pub fn prompt_titles(snippets: &[BackgroundSnippet], max_tokens: usize) -> Vec<String> {
    let mut used = 0usize;
    let mut out = Vec::new();
    for s in snippets.iter().take(MAX_PROMPT_TITLES) {
        let title = truncate_chars(&s.title, MAX_TITLE_CHARS);
        if title.is_empty() {
            continue;
        }
        let cost = approx_tokens(&title);
        if used + cost > max_tokens {
            break;
        }
        used += cost;
        out.push(title);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snip(title: &str, position: usize) -> BackgroundSnippet {
        BackgroundSnippet {
            title: title.to_string(),
            source_hint: "unknown".to_string(),
            position,
        }
    }

    #[test]
    fn takes_at_most_five_titles() {
        let snippets: Vec<_> = (1..=8).map(|i| snip(&format!("title {i}"), i)).collect();
        assert_eq!(prompt_titles(&snippets, 10_000).len(), 5);
    }

    #[test]
    fn respects_token_budget() {
        let snippets = vec![snip(&"x".repeat(40), 1), snip(&"y".repeat(40), 2)];
        // each costs 10 tokens
        assert_eq!(prompt_titles(&snippets, 15).len(), 1);
        assert!(prompt_titles(&snippets, 5).is_empty());
    }

    #[test]
    fn caps_long_titles() {
        let snippets = vec![snip(&"长".repeat(300), 1)];
        assert_eq!(prompt_titles(&snippets, 10_000)[0].chars().count(), MAX_TITLE_CHARS);
    }
}
