use crate::extract::lexicon::CategoryKeywords;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Semantic category of a timesheet event.
///
/// Variants are declared in classification priority order, which is also the
/// order used when reporting counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Transfer,
    Loading,
    Discharge,
    ArrivalDeparture,
    Sampling,
    Inspection,
    TankOperations,
    Cleaning,
    Certification,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Transfer,
        Self::Loading,
        Self::Discharge,
        Self::ArrivalDeparture,
        Self::Sampling,
        Self::Inspection,
        Self::TankOperations,
        Self::Cleaning,
        Self::Certification,
        Self::Other,
    ];

    /// Label from the published category vocabulary.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Transfer => "Alije/Transferencia",
            Self::Loading => "Carga",
            Self::Discharge => "Descarga",
            Self::ArrivalDeparture => "Llegada/Salida",
            Self::Sampling => "Muestreo",
            Self::Inspection => "Inspección",
            Self::TankOperations => "Operaciones de Tanque",
            Self::Cleaning => "Limpieza",
            Self::Certification => "Certificación",
            Self::Other => "Otros",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Maps free text to the first category, in table order, with a keyword
/// contained in the lowercased text. Unmatched text is [`Category::Other`].
pub fn classify(text: &str, table: &[CategoryKeywords]) -> Category {
    let text = text.to_lowercase();
    table
        .iter()
        .find(|row| {
            row.keywords
                .iter()
                .flat_map(|(_, keywords)| keywords.iter())
                .any(|keyword| text.contains(keyword))
        })
        .map(|row| row.category)
        .unwrap_or(Category::Other)
}

/// Normalizes a compact time to `HH:MM`.
///
/// Text containing a colon is returned unchanged; digit strings of length 1-2
/// are hours, 3 is `H MM` and 4 is `HH MM`. Anything else is returned as is.
/// Hour and minute ranges are not validated.
pub fn format_time(time: &str) -> String {
    let time = time.trim();
    if time.contains(':') || time.is_empty() || !time.chars().all(|c| c.is_ascii_digit()) {
        return time.to_owned();
    }
    match time.len() {
        1 | 2 => format!("{time:0>2}:00"),
        3 => format!("0{}:{}", &time[..1], &time[1..]),
        4 => format!("{}:{}", &time[..2], &time[2..]),
        _ => time.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::lexicon::CATEGORY_KEYWORDS;

    #[test]
    fn compact_times_are_normalized() {
        assert_eq!(format_time("2130"), "21:30");
        assert_eq!(format_time("730"), "07:30");
        assert_eq!(format_time("7"), "07:00");
        assert_eq!(format_time("12"), "12:00");
        assert_eq!(format_time("09:15"), "09:15");
    }

    #[test]
    fn odd_times_pass_through() {
        assert_eq!(format_time("12345"), "12345");
        assert_eq!(format_time("noon"), "noon");
        assert_eq!(format_time("9960"), "99:60");
        assert_eq!(format_time(""), "");
    }

    #[test]
    fn first_matching_category_wins() {
        assert_eq!(
            classify("Barge alongside tank 3", CATEGORY_KEYWORDS),
            Category::Transfer
        );
        assert_eq!(classify("Tank gauging", CATEGORY_KEYWORDS), Category::TankOperations);
        assert_eq!(classify("Loading commenced", CATEGORY_KEYWORDS), Category::Loading);
        assert_eq!(classify("Sampling completed", CATEGORY_KEYWORDS), Category::Sampling);
    }

    #[test]
    fn spanish_keywords_and_fallback() {
        assert_eq!(classify("Discharge commenced", CATEGORY_KEYWORDS), Category::Discharge);
        // "descarga" contains "carga", so priority order decides
        assert_eq!(classify("Inicio descarga", CATEGORY_KEYWORDS), Category::Loading);
        assert_eq!(classify("Práctico a bordo", CATEGORY_KEYWORDS), Category::ArrivalDeparture);
        assert_eq!(classify("Coffee break", CATEGORY_KEYWORDS), Category::Other);
        assert_eq!(classify("", CATEGORY_KEYWORDS), Category::Other);
    }

    #[test]
    fn categories_serialize_as_labels() {
        assert_eq!(
            serde_json::to_string(&Category::TankOperations).unwrap(),
            "\"Operaciones de Tanque\""
        );
        assert_eq!(Category::Other.to_string(), "Otros");
    }
}
