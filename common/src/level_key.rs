// common/src/level_key.rs
//! Level key derivation.
//!
//! A level key is `{owner}-{name}` with both parts reduced to
//! `[A-Za-z0-9_-]`. The key is the only record of ownership: the owner is the
//! part before the first `-`.
use crate::utils::now_epoch_millis;

/// Longest owner name a session may store
pub const MAX_USERNAME_LEN: usize = 48;

pub const OWNER_FALLBACK: &str = "user";
pub const LEVEL_FALLBACK: &str = "level";

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Trim, then replace every character outside `[A-Za-z0-9_-]` with `_`.
/// An empty result becomes `fallback`.
pub fn sanitize_part(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if is_key_char(c) { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Account usernames drop disallowed characters instead of replacing them,
/// and are capped at [`MAX_USERNAME_LEN`].
pub fn sanitize_username(raw: &str) -> String {
    raw.chars()
        .filter(|c| is_key_char(*c))
        .take(MAX_USERNAME_LEN)
        .collect()
}

/// `{owner}-{name}`, with `user` and `level` standing in for empty parts
pub fn build_key(owner: &str, name: &str) -> String {
    format!(
        "{}-{}",
        sanitize_part(owner, OWNER_FALLBACK),
        sanitize_part(name, LEVEL_FALLBACK)
    )
}

/// Key for a level with no owner context. Without a usable raw id a
/// timestamped key is synthesized.
pub fn build_raw_key(raw_id: Option<&str>) -> String {
    match raw_id.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => sanitize_part(raw, LEVEL_FALLBACK),
        None => format!("level_{}", now_epoch_millis()),
    }
}

/// Owner encoded in a key, if the key has one
pub fn owner_of(key: &str) -> Option<&str> {
    key.split_once('-').map(|(owner, _)| owner).filter(|o| !o.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_part_replaces_and_falls_back() {
        assert_eq!(sanitize_part("My Level", LEVEL_FALLBACK), "My_Level");
        assert_eq!(sanitize_part("  héllo/wörld ", LEVEL_FALLBACK), "h_llo_w_rld");
        assert_eq!(sanitize_part("   ", LEVEL_FALLBACK), "level");
        assert_eq!(sanitize_part("", ""), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = ["My Level", "  a b  ", "Alice!", "ünïcødé", "--__--", "", "x/y\\z", "tab\there"];
        for input in inputs {
            let once = sanitize_part(input, LEVEL_FALLBACK);
            assert_eq!(sanitize_part(&once, LEVEL_FALLBACK), once, "input {:?}", input);

            let name = sanitize_username(input);
            assert_eq!(sanitize_username(&name), name, "input {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_username_strips_and_caps() {
        assert_eq!(sanitize_username("Alice!"), "Alice");
        assert_eq!(sanitize_username("a b c"), "abc");
        assert_eq!(sanitize_username(&"x".repeat(60)).len(), MAX_USERNAME_LEN);
        assert_eq!(sanitize_username("!!!"), "");
    }

    #[test]
    fn test_build_key() {
        assert_eq!(build_key("Alice", "My Level"), "Alice-My_Level");
        assert_eq!(build_key("", ""), "user-level");
        assert_eq!(build_key("Alice", "My Level"), build_key("Alice", "My Level"));
    }

    #[test]
    fn test_build_raw_key() {
        assert_eq!(build_raw_key(Some(" castle 2 ")), "castle_2");
        let synthesized = build_raw_key(Some("  "));
        assert!(synthesized.starts_with("level_"));
        assert!(synthesized["level_".len()..].parse::<i64>().is_ok());
        assert!(build_raw_key(None).starts_with("level_"));
    }

    #[test]
    fn test_owner_of() {
        assert_eq!(owner_of("Alice-My_Level"), Some("Alice"));
        assert_eq!(owner_of("Alice-a-b"), Some("Alice"));
        assert_eq!(owner_of("level_123"), None);
    }
}
