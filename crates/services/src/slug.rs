//! URL slug derivation. Slugs are assigned once at creation and immutable
//! thereafter; global uniqueness is the gateway's constraint, collisions
//! are retried by the caller with a fresh nonce.

use chrono::Utc;
use uuid::Uuid;

/// Maximum length of the title-derived stem.
const STEM_MAX: usize = 100;

/// Derive a slug: lowercased title with non-alphanumeric runs collapsed to
/// a single `-`, capped at 100 chars, plus a base36 timestamp suffix.
pub fn generate(title: &str) -> String {
    format!("{}-{}", stem(title), base36(Utc::now().timestamp_millis()))
}

/// Collision fallback: same stem, random nonce instead of the timestamp.
pub fn generate_with_nonce(title: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{}-{}", stem(title), &nonce[..8])
}

fn stem(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_dash = true; // suppress a leading dash
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
        if out.len() >= STEM_MAX {
            break;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("post");
    }
    out
}

fn base36(mut n: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n <= 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).expect("base36 digits are ascii")
}
