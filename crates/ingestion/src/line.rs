//! Line classification.

/// Line opening a nested block
pub const OPEN_MARKER: &str = "{";
/// Line closing a nested block
pub const CLOSE_MARKER: &str = "}";

/// One complete input line, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Open,
    Close,
    /// Anything else, including the empty line, taken verbatim
    Command(String),
}

impl Line {
    pub fn classify(line: String) -> Self {
        match line.as_str() {
            OPEN_MARKER => Self::Open,
            CLOSE_MARKER => Self::Close,
            _ => Self::Command(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_must_match_exactly() {
        assert_eq!(Line::classify("{".into()), Line::Open);
        assert_eq!(Line::classify("}".into()), Line::Close);
        assert_eq!(Line::classify(" {".into()), Line::Command(" {".into()));
        assert_eq!(Line::classify("{}".into()), Line::Command("{}".into()));
        assert_eq!(Line::classify("}\r".into()), Line::Command("}\r".into()));
    }

    #[test]
    fn test_empty_line_is_command() {
        assert_eq!(Line::classify(String::new()), Line::Command(String::new()));
    }
}
