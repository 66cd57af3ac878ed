use serde::Serialize;
use std::fmt::Display;

/// Scalar stored in a grid cell.
///
/// The grid keeps values opaque: text is only interpreted by the extractors,
/// and numbers or booleans are coerced to text where a pattern needs it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Strings, including date-like strings produced by the spreadsheet reader
    Text(String),
    /// Integer or floating point numbers
    Number(f64),
    /// Boolean values
    Bool(bool),
}

impl CellValue {
    /// Returns the text of string cells; numbers and booleans yield `None`.
    ///
    /// Label matching only ever looks at string cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Coerces the value to trimmed text.
    pub fn to_trimmed(&self) -> String {
        match self {
            Self::Text(value) => value.trim().to_owned(),
            _ => self.to_string(),
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => write!(f, "{}", value),
            // 800.0 renders as "800", so numeric times like 0800 stay usable
            Self::Number(value) => write!(f, "{}", value),
            Self::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(CellValue::from(800.0).to_string(), "800");
        assert_eq!(CellValue::from(2130_i64).to_string(), "2130");
        assert_eq!(CellValue::from(-12.5).to_string(), "-12.5");
    }

    #[test]
    fn only_text_cells_expose_text() {
        assert_eq!(CellValue::from(" Event ").as_text(), Some(" Event "));
        assert_eq!(CellValue::from(" Event ").to_trimmed(), "Event");
        assert_eq!(CellValue::from(1.0).as_text(), None);
        assert_eq!(CellValue::from(true).to_trimmed(), "true");
    }
}
