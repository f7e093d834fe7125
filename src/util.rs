// Format a byte count with binary units, two decimals: 1536 -> "1.50 KB"
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} PB", value)
}

// "12 %" style label for gauges; "--" when there is no sample yet
pub fn format_percent(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.0} %", v),
        None => "-- %".to_string(),
    }
}
