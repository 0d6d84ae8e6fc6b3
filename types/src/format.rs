//! Display helpers shared by the views.

/// Format an amount as Indian rupees: `₹12,34,567.00`.
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2 + 4);
    out.push('₹');
    if len <= 3 {
        out.push_str(&digits);
    } else {
        // Lakh grouping: the last three digits, then pairs.
        let (head, tail) = digits.split_at(len - 3);
        let lead = head.len() % 2;
        for (idx, ch) in head.chars().enumerate() {
            if idx > 0 && (idx + 2 - lead) % 2 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out.push(',');
        out.push_str(tail);
    }
    out.push_str(".00");
    out
}

/// Hide the middle of a mobile number, keeping the first two characters and
/// everything from the ninth on.
pub fn mask_mobile(mobile: &str) -> String {
    const MASK: &str = "******";
    if mobile.is_empty() {
        return MASK.to_string();
    }
    let head: String = mobile.chars().take(2).collect();
    let tail: String = mobile.chars().skip(8).collect();
    format!("{head}{MASK}{tail}")
}

/// Countdown as `m:ss`.
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
