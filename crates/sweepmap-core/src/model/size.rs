/// Size formatting and parsing: human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point is only used at the
/// display boundary and when parsing fractional user input ("1.5GB").

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Format a byte count with binary units labelled KB/MB/GB/TB.
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", b / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", b / MB as f64)
    } else if bytes < TB {
        format!("{:.2} GB", b / GB as f64)
    } else {
        format!("{:.2} TB", b / TB as f64)
    }
}

/// Format a count with thousand separators.
pub fn format_count(count: u64) -> String {
    let s = count.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Parse "512", "4KB", "1.5 GB", "10m" into bytes (binary units).
///
/// Returns `None` for empty, negative, non-finite, or unknown-unit input.
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        "t" | "tb" | "tib" => TB,
        _ => return None,
    };
    Some((value * multiplier as f64).round() as u64)
}
