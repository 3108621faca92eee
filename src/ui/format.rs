//! Display formatting for metric cards.

/// Group the digits of a non-negative integer with commas: `1234567` → `1,234,567`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whole-dollar currency: `152345.6` → `$152,346`.
pub fn currency(amount: f64) -> String {
    let rounded = amount.round();
    if rounded < 0.0 {
        format!("-${}", thousands((-rounded) as u64))
    } else {
        format!("${}", thousands(rounded as u64))
    }
}

pub fn count(n: usize) -> String {
    thousands(n as u64)
}
