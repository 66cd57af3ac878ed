//! Label phrases and keyword tables, kept as data.
//!
//! Every table is tagged by [`Variant`] so a new language is an added row, not
//! a new branch in the extractors. A [`Lexicon`] bundles the tables and is
//! passed by reference into each component.

use crate::extract::classify::Category;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::LazyLock;

/// Language convention of a label or keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    English,
    Spanish,
}

/// Column role a timesheet label announces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelRole {
    Event,
    Date,
    Time,
}

/// Header row layout of one timesheet family.
///
/// Phrases are compared against trimmed, lowercased cell text.
#[derive(Debug)]
pub struct SectionPattern {
    pub variant: Variant,
    pub event: &'static [&'static str],
    pub date: &'static [&'static str],
    pub time: &'static [&'static str],
    /// Column the date label must sit in, if the layout pins it
    pub date_column: Option<&'static str>,
}

impl SectionPattern {
    /// Role announced by a normalized label, if any.
    pub fn role_of(&self, normalized: &str) -> Option<LabelRole> {
        if self.event.iter().any(|phrase| *phrase == normalized) {
            Some(LabelRole::Event)
        } else if self.date.iter().any(|phrase| *phrase == normalized) {
            Some(LabelRole::Date)
        } else if self.time.iter().any(|phrase| *phrase == normalized) {
            Some(LabelRole::Time)
        } else {
            None
        }
    }
}

/// Keywords for one category, per language.
#[derive(Debug)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: &'static [(Variant, &'static [&'static str])],
}

/// A labeled field: output key plus the labels that announce it.
#[derive(Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub labels: &'static [&'static str],
    /// Numeric fields keep the first number found in their value
    pub numeric: bool,
}

/// A marked condition (weather or sea state) and the words that name it.
#[derive(Debug)]
pub struct ConditionTerm {
    /// Lowercase English name recorded in the output
    pub canonical: &'static str,
    pub keywords: &'static [&'static str],
}

/// A sentence located by a case-insensitive pattern over a sheet's text.
#[derive(Debug)]
pub struct TextPattern {
    pub key: &'static str,
    pub pattern: &'static str,
}

pub const SECTION_PATTERNS: &[SectionPattern] = &[
    // Event | Date | Time, columns anywhere on the row
    SectionPattern {
        variant: Variant::English,
        event: &["event"],
        date: &["date"],
        time: &["time"],
        date_column: None,
    },
    // DATE | HRS | EVENT with the date pinned to column A
    SectionPattern {
        variant: Variant::Spanish,
        event: &["event", "evento", "eventos"],
        date: &["date", "fecha"],
        time: &["hrs", "time", "hora", "horas"],
        date_column: Some("A"),
    },
];

/// Evaluated top to bottom; the first category with a matching keyword wins.
pub const CATEGORY_KEYWORDS: &[CategoryKeywords] = &[
    CategoryKeywords {
        category: Category::Transfer,
        keywords: &[
            (Variant::English, &[
                "barges", "barge", "cast off", "approach", "line on board", "all fast",
                "hoses connected", "alongside", "mooring", "unmoor", "berth", "departure",
                "first line", "last line", "ship to ship", "transfer",
            ]),
            (Variant::Spanish, &[
                "barcazas", "barcaza", "atraque", "desatraque", "amarre", "desamarre",
                "aproximación", "acercamiento", "transferencia", "alije", "mangueras conectadas",
                "primera línea", "última línea", "buque a buque",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::Loading,
        keywords: &[
            (Variant::English, &[
                "loading", "load", "cargo loading", "start loading", "finish loading",
                "loading completed", "loading operation",
            ]),
            (Variant::Spanish, &[
                "carga", "cargar", "cargando", "inicio carga", "fin carga",
                "carga completada", "operación de carga", "embarque",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::Discharge,
        keywords: &[
            (Variant::English, &[
                "discharge", "unload", "unloading", "cargo discharge", "discharge completed",
            ]),
            (Variant::Spanish, &[
                "descarga", "descargar", "descargando", "descarga completada", "desembarque",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::ArrivalDeparture,
        keywords: &[
            (Variant::English, &[
                "arrival", "arrive", "departure", "depart", "eta", "etd", "pilot on board",
                "pilot off", "tug", "tugboat", "escort", "anchor",
            ]),
            (Variant::Spanish, &[
                "llegada", "llegar", "salida", "salir", "práctico a bordo", "práctico fuera",
                "remolcador", "escolta", "ancla", "fondeo",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::Sampling,
        keywords: &[
            (Variant::English, &[
                "sample", "sampling", "samples taken", "sample collection", "laboratory sample",
            ]),
            (Variant::Spanish, &[
                "muestra", "muestras", "muestreo", "toma de muestras", "recolección muestras",
                "muestra laboratorio",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::Inspection,
        keywords: &[
            (Variant::English, &[
                "inspection", "inspections", "survey", "check", "verification", "examine",
                "tank inspection", "cargo inspection", "safety inspection",
            ]),
            (Variant::Spanish, &[
                "inspección", "inspecciones", "verificación", "revisión", "chequeo",
                "inspección tanques", "inspección carga", "inspección seguridad", "verificar",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::TankOperations,
        keywords: &[
            (Variant::English, &[
                "tank", "tanks", "cargo tank", "pump", "pumping", "valve", "pipeline",
                "manifold", "cargo system", "tank cleaning", "tank preparation",
            ]),
            (Variant::Spanish, &[
                "tanque", "tanques", "tanque carga", "bomba", "bombeo", "válvula",
                "tubería", "colector", "sistema carga", "limpieza tanque", "preparación tanque",
            ]),
        ],
    },
    CategoryKeywords {
        category: Category::Cleaning,
        keywords: &[
            (Variant::English, &["cleaning", "wash", "clean", "tank cleaning", "cargo cleaning"]),
            (Variant::Spanish, &["limpieza", "lavado", "limpiar", "limpieza tanque", "limpieza carga"]),
        ],
    },
    CategoryKeywords {
        category: Category::Certification,
        keywords: &[
            (Variant::English, &["certificate", "certification", "cert", "document", "documentation"]),
            (Variant::Spanish, &["certificado", "certificación", "documento", "documentación"]),
        ],
    },
];

pub const COVER_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "file_number", labels: &["File N°", "File No", "Expediente N°"], numeric: false },
    FieldSpec { key: "terminal", labels: &["Terminal"], numeric: false },
    FieldSpec { key: "inspector", labels: &["Inspector", "Surveyor", "Inspector asignado"], numeric: false },
    FieldSpec { key: "revised_by", labels: &["Revised by", "Revisado por"], numeric: false },
    FieldSpec { key: "approved_by", labels: &["Approved by", "Aprobado por"], numeric: false },
    FieldSpec {
        key: "operation_date",
        labels: &["Date of Operation completed", "Fecha de operación"],
        numeric: false,
    },
    FieldSpec {
        key: "report_date",
        labels: &["Date of Report Issuing", "Fecha de emisión"],
        numeric: false,
    },
    FieldSpec { key: "note", labels: &["NOTE", "Nota"], numeric: false },
];

pub const TIMESHEET_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "vessel", labels: &["Vessel", "Buque"], numeric: false },
    FieldSpec { key: "terminal", labels: &["Terminal"], numeric: false },
    FieldSpec { key: "location", labels: &["Location", "Ubicación"], numeric: false },
    FieldSpec { key: "product", labels: &["Product", "Producto"], numeric: false },
    FieldSpec { key: "date", labels: &["Date", "Fecha"], numeric: false },
    FieldSpec { key: "file_no", labels: &["File N°", "File No", "File N"], numeric: false },
];

pub const PUMPING_FIELDS: &[FieldSpec] = &[
    FieldSpec { key: "pumping_time", labels: &["Pumping Time", "Tiempo de Bombeo"], numeric: true },
    FieldSpec { key: "pumping_rate", labels: &["Pumping Rate", "Rata de Bombeo"], numeric: true },
    FieldSpec { key: "last_cargo", labels: &["Last Cargo", "Último Cargamento"], numeric: false },
    FieldSpec { key: "second_last", labels: &["Second Last", "Penúltimo"], numeric: false },
    FieldSpec { key: "third_last", labels: &["Third Last", "Antepenúltimo"], numeric: false },
    FieldSpec {
        key: "vessel_experience_factor",
        labels: &["Vessel Experience Factor", "VEF"],
        numeric: false,
    },
];

pub const WEATHER_TERMS: &[ConditionTerm] = &[
    ConditionTerm { canonical: "rain", keywords: &["Rain", "Lluvia"] },
    ConditionTerm { canonical: "cloudy", keywords: &["Cloudy", "Nublado"] },
    ConditionTerm { canonical: "clear", keywords: &["Clear", "Despejado"] },
];

pub const SEA_TERMS: &[ConditionTerm] = &[
    ConditionTerm { canonical: "rough", keywords: &["Rough", "Agitado"] },
    ConditionTerm { canonical: "choppy", keywords: &["Choppy", "Picado"] },
    ConditionTerm { canonical: "calm", keywords: &["Calm", "Calma"] },
];

pub const VESSEL_INFO_PATTERNS: &[TextPattern] = &[
    TextPattern {
        key: "any_information_submitted",
        pattern: r"Any information as submitted above resulting from information obtained from Vessel.*?records[,\s]*cannot be guaranteed as accurate",
    },
    TextPattern {
        key: "measurement_standards",
        pattern: r"API MPMS.*?Manual of Petroleum Measurement Standards.*?Chapter.*?Guidelines",
    },
    TextPattern {
        key: "standard_procedure",
        pattern: r"PR-INS-\d+.*?Standard Procedure for Surveyors",
    },
];

/// [`VESSEL_INFO_PATTERNS`] compiled once: case-insensitive, with `.`
/// matching line breaks between cells.
pub static VESSEL_INFO_REGEXES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    VESSEL_INFO_PATTERNS
        .iter()
        .map(|pattern| {
            let regex = RegexBuilder::new(pattern.pattern)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .expect("Hardcode regex pattern");
            (pattern.key, regex)
        })
        .collect()
});

/// All label phrases and keyword tables used by the extractors.
#[derive(Debug)]
pub struct Lexicon {
    pub sections: &'static [SectionPattern],
    pub categories: &'static [CategoryKeywords],
    pub cover_fields: &'static [FieldSpec],
    pub timesheet_fields: &'static [FieldSpec],
    pub pumping_fields: &'static [FieldSpec],
    pub weather_terms: &'static [ConditionTerm],
    pub sea_terms: &'static [ConditionTerm],
    /// `(field key, sentence pattern)` pairs
    pub vessel_info_patterns: &'static [(&'static str, Regex)],
    /// Substrings (lowercase) marking the special notes anchor
    pub special_notes_markers: &'static [&'static str],
    /// Substrings (lowercase) marking the general notes anchor
    pub general_notes_markers: &'static [&'static str],
    /// Substrings (lowercase) identifying the sheet that carries notes
    pub notes_sheet_markers: &'static [&'static str],
    /// Labels (lowercase, colon included) introducing a remark
    pub remark_labels: &'static [&'static str],
    /// Substrings (lowercase) scored when guessing the cover sheet by content
    pub cover_markers: &'static [&'static str],
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            sections: SECTION_PATTERNS,
            categories: CATEGORY_KEYWORDS,
            cover_fields: COVER_FIELDS,
            timesheet_fields: TIMESHEET_FIELDS,
            pumping_fields: PUMPING_FIELDS,
            weather_terms: WEATHER_TERMS,
            sea_terms: SEA_TERMS,
            vessel_info_patterns: VESSEL_INFO_REGEXES.as_slice(),
            special_notes_markers: &["special notes", "notas especiales"],
            general_notes_markers: &["general notes", "notas generales"],
            notes_sheet_markers: &[
                "special notes",
                "general notes",
                "pumping time",
                "weather conditions",
                "notas especiales",
                "notas generales",
                "tiempo de bombeo",
                "condiciones climáticas",
            ],
            remark_labels: &["remarks:", "observaciones:"],
            cover_markers: &["m/t", "barge", "bol", "ref.", "terminal", "inspector", "surveyor"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_roles_are_resolved_per_variant() {
        let english = &SECTION_PATTERNS[0];
        let spanish = &SECTION_PATTERNS[1];

        assert_eq!(english.role_of("event"), Some(LabelRole::Event));
        assert_eq!(english.role_of("hrs"), None);
        assert_eq!(spanish.role_of("hrs"), Some(LabelRole::Time));
        assert_eq!(spanish.role_of("fecha"), Some(LabelRole::Date));
    }

    #[test]
    fn category_table_covers_every_category_but_other() {
        let categories: Vec<Category> = CATEGORY_KEYWORDS.iter().map(|row| row.category).collect();

        assert_eq!(categories, &Category::ALL[..Category::ALL.len() - 1]);
        assert!(CATEGORY_KEYWORDS
            .iter()
            .all(|row| row.keywords.iter().all(|(_, words)| words.iter().all(|w| *w == w.to_lowercase()))));
    }

    #[test]
    fn vessel_sentences_span_lines() {
        let keys: Vec<&str> = VESSEL_INFO_REGEXES.iter().map(|(key, _)| *key).collect();
        let procedure = &VESSEL_INFO_REGEXES[2].1;

        assert_eq!(keys, ["any_information_submitted", "measurement_standards", "standard_procedure"]);
        assert!(procedure.is_match("pr-ins-012 rev 3\nstandard procedure for surveyors"));
    }
}
