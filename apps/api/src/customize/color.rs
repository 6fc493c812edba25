use std::sync::LazyLock;

use regex::Regex;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$")
        .expect("BUG: invalid hex color regex")
});

static COLOR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").expect("BUG: invalid color name regex")
});

/// Parses `#RRGGBB` / `RRGGBB` (any case) into an RGB triple.
pub fn parse_hex(value: &str) -> Option<(u8, u8, u8)> {
    let caps = HEX_COLOR.captures(value.trim())?;
    let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok();
    Some((channel(1)?, channel(2)?, channel(3)?))
}

/// Color names usable as xcolor identifiers.
pub fn is_valid_color_name(name: &str) -> bool {
    COLOR_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_prefix_insensitive() {
        assert_eq!(parse_hex("#A1B2C3"), Some((161, 178, 195)));
        assert_eq!(parse_hex("a1b2c3"), parse_hex("#A1B2C3"));
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["red", "#12G456", "#1234", "", "#1234567", "##123456"] {
            assert_eq!(parse_hex(bad), None, "{bad}");
        }
    }

    #[test]
    fn test_color_names() {
        assert!(is_valid_color_name("accent"));
        assert!(is_valid_color_name("brand-blue2"));
        assert!(!is_valid_color_name("2tone"));
        assert!(!is_valid_color_name("my color"));
        assert!(!is_valid_color_name("a}b"));
    }
}
