//! Helpers for keeping log lines single-line and free of personal details.

/// Longest preview emitted for free text such as narratives or reward strings.
pub const MAX_PREVIEW_CHARS: usize = 120;

/// Escape newlines, tabs and other control characters and cut the result at
/// [`MAX_PREVIEW_CHARS`] characters with a trailing `…`.
pub fn escape_log(s: &str) -> String {
    escape_log_max(s, MAX_PREVIEW_CHARS)
}

pub fn escape_log_max(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Keep the first character of the local part and the domain: `l***@teyvat.io`.
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
