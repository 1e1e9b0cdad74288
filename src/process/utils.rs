/// Strip currency, thousands separators, percent signs and the `Cr.` unit, then trim.
pub fn clean_value(raw: &str) -> String {
    raw.replace('₹', "")
        .replace("Cr.", "")
        .replace(',', "")
        .replace('%', "")
        .trim()
        .to_string()
}

/// Collapse whitespace runs (including non-breaking spaces) into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Numeric coercion used by the row matcher: `None` for anything that is not a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = clean_value(raw);
    if cleaned.is_empty() {
        return None;
    }
    // the site renders negatives with a unicode minus in a few places
    let cleaned = cleaned.replace('\u{2212}', "-");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimal places; non-finite values become missing.
pub fn round2(v: f64) -> Option<f64> {
    if v.is_finite() {
        Some((v * 100.0).round() / 100.0)
    } else {
        None
    }
}
