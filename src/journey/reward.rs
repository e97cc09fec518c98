/// Reward string parsing.
///
/// Admin-authored rewards look like `"Primogems x60"` or `"Mora x20,000"`. Anything
/// that does not carry an `x<number>` marker is not a reward the engine can apply and
/// is skipped by callers.

/// Structured form of a reward string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReward {
    pub name: String,
    pub quantity: u64,
}

/// Parse a reward string into a name and quantity.
///
/// The last `x` immediately followed by a digit run (commas allowed as thousands
/// separators) is the quantity marker; the trimmed text before it is the name. Returns
/// `None` when there is no marker, the name is empty, or the quantity overflows `u64`.
pub fn parse_reward(input: &str) -> Option<ParsedReward> {
    let (marker, end) = last_quantity_marker(input)?;

    let name = input[..marker].trim();
    if name.is_empty() {
        return None;
    }

    let digits: String = input[marker + 1..end]
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let quantity = digits.parse::<u64>().ok()?;

    Some(ParsedReward {
        name: name.to_string(),
        quantity,
    })
}

/// Byte range of the last `x<digits>` marker: (index of `x`, end of the digit run).
fn last_quantity_marker(input: &str) -> Option<(usize, usize)> {
    // 'x', digits and ',' are ASCII, so every index found here is a char boundary
    let bytes = input.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'x' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
            let mut end = i + 1;
            while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b',') {
                end += 1;
            }
            found = Some((i, end));
            i = end;
        } else {
            i += 1;
        }
    }
    found
}

/// Format a quantity with comma thousands separators, the way reward strings are authored.
pub fn format_quantity(quantity: u64) -> String {
    let digits = quantity.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
