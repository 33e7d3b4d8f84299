/// Parse a boolean flag from an optional string value
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => {
            let t = v.trim().to_lowercase();
            if t.is_empty() {
                default
            } else {
                matches!(t.as_str(), "1" | "true" | "yes" | "on")
            }
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_truthy() {
        for v in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_flag(Some(v), false), "{v}");
        }
    }

    #[test]
    fn test_parse_flag_falsy() {
        for v in ["0", "false", "no", "off", "maybe"] {
            assert!(!parse_flag(Some(v), true), "{v}");
        }
    }

    #[test]
    fn test_parse_flag_blank_uses_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(None, false));
        assert!(parse_flag(Some("  "), true));
        assert!(!parse_flag(Some(""), false));
    }
}
