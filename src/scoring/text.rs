//! Shared text helpers: tokenization and set-overlap similarity.

use std::collections::HashSet;

/// Lower-cased tokens. Splits on whitespace and most punctuation but keeps
/// `-`, `+`, `#` and inner dots so names like `c++`, `c#` or `node.js` survive.
pub fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| {
        c.is_whitespace()
            || matches!(
                c,
                ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '/'
                    | '|' | '<' | '>' | '*' | '='
            )
    })
    .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '\'' | '`')))
    .filter(|t| !t.is_empty())
    .map(str::to_lowercase)
}

pub fn token_set(s: &str) -> HashSet<String> {
    tokenize(s).collect()
}

/// Jaccard index of the lower-cased token sets; 0.0 when both are empty.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let sa = token_set(a);
    let sb = token_set(b);
    let union = sa.union(&sb).count();
    if union == 0 {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count();
    inter as f32 / union as f32
}
