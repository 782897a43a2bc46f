//! Glob patterns for key enumeration
//!
//! The Redis-style subset understood by `DocumentStore::keys`.

/// Characters with special meaning in a key pattern
const META: [char; 5] = ['*', '?', '[', ']', '\\'];

/// Escape `literal` so it matches only itself inside a pattern
pub fn glob_escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Match `key` against `pattern`
///
/// `*` matches any run of characters (including none), `?` exactly one,
/// `\x` the literal `x`. A trailing lone backslash matches a backslash.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let (mut p, mut k) = (0, 0);
    // Position after the last `*` and the key position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        match pattern.get(p) {
            Some('*') => {
                p += 1;
                backtrack = Some((p, k));
                continue;
            }
            Some('?') => {
                p += 1;
                k += 1;
                continue;
            }
            Some(&c) => {
                let (literal, width) = if c == '\\' && p + 1 < pattern.len() {
                    (pattern[p + 1], 2)
                } else {
                    (c, 1)
                };
                if literal == key[k] {
                    p += width;
                    k += 1;
                    continue;
                }
            }
            None => {}
        }

        // Mismatch: let the last star swallow one more character
        match backtrack {
            Some((star_p, star_k)) => {
                p = star_p;
                k = star_k + 1;
                backtrack = Some((star_p, star_k + 1));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
