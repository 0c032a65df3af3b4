/// Size formatting utilities: human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.

/// Unit labels, smallest first. Binary multiples, short common labels.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count into a human-readable string with appropriate unit.
///
/// Bytes are printed as integers, KB and MB with one decimal, GB and above
/// with two.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit >= 3 {
        format!("{value:.2} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Format a count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
