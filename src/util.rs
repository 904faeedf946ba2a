use eframe::egui::Color32;

/// Parses `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(hex: &str) -> Option<Color32> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(digits.get(at..at + 2)?, 16).ok();

    match digits.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

/// Shortens `label` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }
    let mut out = label
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

pub fn format_percent(value: f32) -> String {
    format!("{:.0}%", value.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            parse_hex_color("#8B5CF6"),
            Some(Color32::from_rgb(0x8b, 0x5c, 0xf6))
        );
        assert_eq!(
            parse_hex_color("#00000080"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 0x80))
        );
        assert_eq!(parse_hex_color("8B5CF6"), None);
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate_label("ownership", 20), "ownership");
        assert_eq!(truncate_label("borrow checker", 7), "borrow…");
    }

    #[test]
    fn formats_percent() {
        assert_eq!(format_percent(42.4), "42%");
        assert_eq!(format_percent(140.0), "100%");
    }
}
