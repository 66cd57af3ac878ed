use crate::extract::field::{FieldExtractor, FieldValues};
use crate::extract::lexicon::Lexicon;
use crate::spreadsheet::{CellGrid, CellValue, ExtractionCriteria, SheetGrid};
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TANKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)M/T\s*["']([^"']+)["']"#).expect("Hardcode regex pattern"));

static BARGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:Barge|Barcaza)\s*["']([^"']+)["']"#).expect("Hardcode regex pattern")
});

static VOYAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Voy\s*#?\s*(\d+)").expect("Hardcode regex pattern"));

static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+[,.]?\d*)\s*(CBM|MT|BBL|LT)\b").expect("Hardcode regex pattern")
});

static PRODUCT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(GAS OIL|GASOIL|DIESEL|FUEL OIL|CRUDE OIL|GASOLINE|JET FUEL)").expect("Hardcode regex pattern")
});

static BOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)BOL\s*(\d+)").expect("Hardcode regex pattern"));

// Company names are upper case, so this one is case-sensitive
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][A-Z\s&]+)\s*-\s*\(Ref\.\s*#\s*([^)]+)\)").expect("Hardcode regex pattern")
});

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Vessels {
    pub tanker: Vec<String>,
    pub barge: Vec<String>,
    pub voyage: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quantity {
    /// Amount as written, decimal separator included
    pub amount: String,
    pub unit: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Products {
    pub quantities: Vec<Quantity>,
    /// Upper-cased product names in first-seen order, without repeats
    pub products: Vec<String>,
    pub bol_numbers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommercialReference {
    pub company: String,
    pub reference: String,
}

/// Data from the report cover sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HeaderRecord {
    pub report_type: Option<String>,
    pub vessels: Vessels,
    pub products: Products,
    pub commercial_references: Vec<CommercialReference>,
    pub operational_data: FieldValues,
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|found| found.get(1))
        .map(|found| found.as_str().trim().to_owned())
        .collect()
}

/// Number of distinct cover markers present in a sheet's text.
fn cover_score(sheet: &SheetGrid, lexicon: &Lexicon) -> usize {
    let text = sheet.joined_text().to_lowercase();
    lexicon
        .cover_markers
        .iter()
        .filter(|marker| text.contains(*marker))
        .count()
}

/// Picks the cover sheet: the first sheet whose name matches a cover pattern,
/// else the sheet with the most cover markers if it reaches the minimum score.
pub fn select_cover_sheet<'g>(
    grid: &'g CellGrid,
    criteria: &ExtractionCriteria,
    lexicon: &Lexicon,
) -> Option<&'g SheetGrid> {
    if let Some(sheet) = grid.sheets().iter().find(|sheet| criteria.is_cover_sheet(sheet.name())) {
        return Some(sheet);
    }
    let mut best: Option<(&SheetGrid, usize)> = None;
    for sheet in grid.sheets() {
        let score = cover_score(sheet, lexicon);
        debug!("sheet '{}': cover score {score}", sheet.name());
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((sheet, score));
        }
    }
    best.filter(|(_, score)| *score >= criteria.cover_min_score)
        .map(|(sheet, _)| sheet)
}

/// Extracts vessels, products, references and operational fields from a cover sheet.
pub fn extract_header(sheet: &SheetGrid, criteria: &ExtractionCriteria, lexicon: &Lexicon) -> HeaderRecord {
    let text = sheet.joined_text();

    let vessels = Vessels {
        tanker: captures(&TANKER_PATTERN, &text),
        barge: captures(&BARGE_PATTERN, &text),
        voyage: captures(&VOYAGE_PATTERN, &text).into_iter().next(),
    };

    let mut products = Products {
        quantities: QUANTITY_PATTERN
            .captures_iter(&text)
            .map(|found| Quantity {
                amount: found[1].to_owned(),
                unit: found[2].to_uppercase(),
            })
            .collect(),
        bol_numbers: captures(&BOL_PATTERN, &text),
        ..Products::default()
    };
    for product in captures(&PRODUCT_PATTERN, &text) {
        let product = product.to_uppercase();
        if !products.products.contains(&product) {
            products.products.push(product);
        }
    }

    let commercial_references = REFERENCE_PATTERN
        .captures_iter(&text)
        .map(|found| CommercialReference {
            company: found[1].trim().to_owned(),
            reference: found[2].trim().to_owned(),
        })
        .collect();

    HeaderRecord {
        report_type: sheet
            .get(&criteria.report_type_cell)
            .map(CellValue::to_trimmed)
            .filter(|text| !text.is_empty()),
        vessels,
        products,
        commercial_references,
        operational_data: FieldExtractor::new(lexicon.cover_fields, lexicon).extract(sheet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover() -> SheetGrid {
        SheetGrid::new("Cubierta")
            .with_cell("A2", "QUANTITY AND QUALITY INSPECTION")
            .with_cell("A4", "M/T \"NORDIC STAR\" Voy # 231 / Barge 'SEA MULE'")
            .with_cell("A5", "12500,5 MT of GASOIL and 3000 BBL Gas Oil, BOL 4471")
            .with_cell("A6", "Also gasoil, BOL 4472")
            .with_cell("A8", "PETRO TRADING & CO - (Ref. # PT-889 )")
            .with_cell("A10", "Terminal: ACME Port")
            .with_cell("A11", "Inspector")
            .with_cell("B11", "J. Perez")
    }

    #[test]
    fn header_patterns() {
        let header = extract_header(&cover(), &ExtractionCriteria::default(), &Lexicon::default());

        assert_eq!(header.report_type.as_deref(), Some("QUANTITY AND QUALITY INSPECTION"));
        assert_eq!(header.vessels.tanker, ["NORDIC STAR"]);
        assert_eq!(header.vessels.barge, ["SEA MULE"]);
        assert_eq!(header.vessels.voyage.as_deref(), Some("231"));
        assert_eq!(header.products.products, ["GASOIL", "GAS OIL"]);
        assert_eq!(header.products.bol_numbers, ["4471", "4472"]);
        assert_eq!(
            header.products.quantities,
            [
                Quantity { amount: "12500,5".to_owned(), unit: "MT".to_owned() },
                Quantity { amount: "3000".to_owned(), unit: "BBL".to_owned() },
            ]
        );
        assert_eq!(
            header.commercial_references,
            [CommercialReference {
                company: "PETRO TRADING & CO".to_owned(),
                reference: "PT-889".to_owned(),
            }]
        );
    }

    #[test]
    fn operational_data_uses_both_strategies() {
        let header = extract_header(&cover(), &ExtractionCriteria::default(), &Lexicon::default());

        assert_eq!(header.operational_data["terminal"].as_deref(), Some("ACME Port"));
        assert_eq!(header.operational_data["inspector"].as_deref(), Some("J. Perez"));
        assert_eq!(header.operational_data["approved_by"], None);
    }

    #[test]
    fn empty_sheet_gives_empty_header() {
        let header = extract_header(&SheetGrid::new("Cover"), &ExtractionCriteria::default(), &Lexicon::default());

        assert_eq!(header.report_type, None);
        assert!(header.vessels.tanker.is_empty());
        assert_eq!(header.operational_data.len(), Lexicon::default().cover_fields.len());
    }

    #[test]
    fn cover_found_by_name_then_by_content() {
        let criteria = ExtractionCriteria::default();
        let lexicon = Lexicon::default();
        let named = CellGrid::new("doc")
            .with_sheet(SheetGrid::new("TIMESHEET"))
            .with_sheet(SheetGrid::new("Portada"));
        let by_content = CellGrid::new("doc")
            .with_sheet(SheetGrid::new("Sheet1").with_cell("A1", "Terminal: X"))
            .with_sheet(SheetGrid::new("Sheet2").with_cell("A1", "M/T 'A'").with_cell("A2", "Surveyor"));
        let weak = CellGrid::new("doc").with_sheet(SheetGrid::new("Sheet1").with_cell("A1", "Terminal"));

        assert_eq!(select_cover_sheet(&named, &criteria, &lexicon).map(SheetGrid::name), Some("Portada"));
        assert_eq!(select_cover_sheet(&by_content, &criteria, &lexicon).map(SheetGrid::name), Some("Sheet2"));
        assert_eq!(select_cover_sheet(&weak, &criteria, &lexicon), None);
    }
}
