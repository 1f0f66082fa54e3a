const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a size reported in kilobytes, e.g. `2048` -> `"2.0 MB"`.
pub fn human_size_from_kb(kb: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let bytes = kb as f64 * 1024.0;
    if bytes <= 0.0 {
        return "0 B".to_string();
    }

    let mut value = bytes;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let unit = UNITS[exponent];

    if exponent <= 1 {
        format!("{value:.0} {unit}")
    } else {
        format!("{value:.1} {unit}")
    }
}
