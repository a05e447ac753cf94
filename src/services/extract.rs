// src/services/extract.rs

//! Offer extraction service.
//!
//! Turns the listing page markup into [`Offer`] records using the configured
//! table/row selectors and row layout.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ExtractConfig, Offer, RowLayout};
use crate::utils::normalize_whitespace;

/// Case-insensitive predicate over the offer status.
#[derive(Debug, Clone, Default)]
pub struct StatusFilter {
    accepted: Vec<String>,
}

impl StatusFilter {
    /// Filter that keeps every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter that keeps rows whose status matches one of `accepted`.
    pub fn new<I, S>(accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accepted: accepted
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Check a status against the filter.
    pub fn accepts(&self, status: &str) -> bool {
        if self.accepted.is_empty() {
            return true;
        }
        let status = status.trim().to_lowercase();
        self.accepted.iter().any(|a| *a == status)
    }
}

/// Extracts offers from the listing table.
pub struct OfferExtractor {
    table_sel: Selector,
    row_sel: Selector,
    layout: RowLayout,
    filter: StatusFilter,
}

impl OfferExtractor {
    /// Create an extractor from configuration.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            table_sel: Self::parse_selector(&config.table_selector)?,
            row_sel: Self::parse_selector(&config.row_selector)?,
            layout: config.layout,
            filter: StatusFilter::new(&config.accepted_statuses),
        })
    }

    /// Replace the status filter.
    pub fn with_filter(mut self, filter: StatusFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Parse markup and extract offers in document order.
    pub fn extract(&self, html: &str) -> Result<Vec<Offer>> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    /// Extract offers from an already parsed document.
    ///
    /// Fails on the first row with fewer than [`Offer::FIELD_COUNT`] fields.
    /// Repeated codes keep their first occurrence.
    pub fn extract_document(&self, document: &Html) -> Result<Vec<Offer>> {
        let table = document
            .select(&self.table_sel)
            .next()
            .ok_or_else(|| AppError::document("no offers table found in page"))?;

        let mut seen = HashSet::new();
        let mut offers = Vec::new();
        let mut row_count = 0;

        for (index, row) in table.select(&self.row_sel).enumerate() {
            row_count += 1;
            let fields = self.row_fields(&row);
            let offer = Offer::from_fields(&fields).ok_or_else(|| {
                AppError::parse(
                    index + 1,
                    format!(
                        "expected {} fields, found {}",
                        Offer::FIELD_COUNT,
                        fields.len()
                    ),
                    row.text().collect::<String>().trim(),
                )
            })?;

            if !self.filter.accepts(&offer.status) {
                log::debug!("Skipping offer {} with status '{}'", offer.code, offer.status);
                continue;
            }
            if !seen.insert(offer.code.clone()) {
                log::warn!("Duplicate offer code {} at row {}, keeping first", offer.code, index + 1);
                continue;
            }
            offers.push(offer);
        }

        log::debug!("Extracted {} offers from {} rows", offers.len(), row_count);
        Ok(offers)
    }

    fn row_fields(&self, row: &ElementRef) -> Vec<String> {
        match self.layout {
            RowLayout::Cells => row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
                .collect(),
            RowLayout::Lines => {
                let text: String = row.text().collect();
                text.trim()
                    .split('\n')
                    .map(|part| part.trim().to_string())
                    .collect()
            }
        }
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
<table class="listado">
  <thead>
    <tr><th>Código</th><th>Título</th><th>Responsable</th><th>Inicio</th><th>Fin</th><th>Estado</th></tr>
  </thead>
  <tbody>
    <tr>
      <td>2024-001</td>
      <td>Técnico de   laboratorio</td>
      <td>Dpto. Física</td>
      <td>01/03/2024</td>
      <td>15/03/2024</td>
      <td>Abierta</td>
    </tr>
    <tr>
      <td>2024-002</td>
      <td>Investigador <b>postdoctoral</b></td>
      <td>Dpto. Informática</td>
      <td>02/03/2024</td>
      <td>20/03/2024</td>
      <td>Cerrada</td>
    </tr>
    <tr>
      <td>2024-003</td>
      <td>Gestor de proyectos</td>
      <td>Servicio de Investigación</td>
      <td>05/03/2024</td>
      <td>25/03/2024</td>
      <td>ABIERTA</td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

    fn extractor() -> OfferExtractor {
        OfferExtractor::new(&ExtractConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_all_rows_in_order() {
        let offers = extractor().extract(LISTING).unwrap();
        assert_eq!(offers.len(), 3);
        let codes: Vec<_> = offers.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["2024-001", "2024-002", "2024-003"]);
        assert_eq!(offers[0].title, "Técnico de laboratorio");
        assert_eq!(offers[1].title, "Investigador postdoctoral");
        assert_eq!(offers[1].owner, "Dpto. Informática");
        assert_eq!(offers[2].end_date, "25/03/2024");
    }

    #[test]
    fn test_header_row_is_not_an_offer() {
        let offers = extractor().extract(LISTING).unwrap();
        assert!(offers.iter().all(|o| o.code != "Código"));
    }

    #[test]
    fn test_status_filter_is_case_insensitive() {
        let extractor = extractor().with_filter(StatusFilter::new(["abierta"]));
        let offers = extractor.extract(LISTING).unwrap();
        assert_eq!(offers.len(), 2);
        assert!(offers.iter().all(|o| o.status.eq_ignore_ascii_case("abierta")));
    }

    #[test]
    fn test_filter_from_config() {
        let config = ExtractConfig {
            accepted_statuses: vec!["Cerrada".to_string()],
            ..ExtractConfig::default()
        };
        let offers = OfferExtractor::new(&config).unwrap().extract(LISTING).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].code, "2024-002");
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let html = r#"<table><tbody>
            <tr><td>1</td><td>A</td><td>B</td><td>x</td><td>y</td><td>Abierta</td></tr>
            <tr><td>2</td><td>Only title</td></tr>
        </tbody></table>"#;
        let err = extractor().extract(html).unwrap_err();
        match err {
            AppError::Parse { row, message, content } => {
                assert_eq!(row, 2);
                assert!(message.contains("found 2"));
                assert!(content.contains("Only title"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_fails_even_if_filtered_out() {
        let html = r#"<table><tbody><tr><td>2</td><td>Cerrada</td></tr></tbody></table>"#;
        let extractor = extractor().with_filter(StatusFilter::new(["Abierta"]));
        assert!(extractor.extract(html).is_err());
    }

    #[test]
    fn test_missing_table_is_document_error() {
        let err = extractor().extract("<html><body><p>Mantenimiento</p></body></html>").unwrap_err();
        assert!(matches!(err, AppError::Document(_)));
    }

    #[test]
    fn test_empty_table_yields_no_offers() {
        let offers = extractor()
            .extract("<table><tbody></tbody></table>")
            .unwrap();
        assert!(offers.is_empty());
    }

    #[test]
    fn test_duplicate_codes_keep_first() {
        let html = r#"<table><tbody>
            <tr><td>7</td><td>First</td><td>o</td><td>s</td><td>e</td><td>Abierta</td></tr>
            <tr><td>7</td><td>Second</td><td>o</td><td>s</td><td>e</td><td>Abierta</td></tr>
        </tbody></table>"#;
        let offers = extractor().extract(html).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].title, "First");
    }

    #[test]
    fn test_lines_layout_splits_row_text() {
        let html = "<table><tbody><tr><td>9</td>\n<td>Becario</td>\n<td>Biblioteca</td>\n<td>01/04/2024</td>\n<td>10/04/2024</td>\n<td>Abierta</td></tr></tbody></table>";
        let config = ExtractConfig {
            layout: RowLayout::Lines,
            ..ExtractConfig::default()
        };
        let offers = OfferExtractor::new(&config).unwrap().extract(html).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].code, "9");
        assert_eq!(offers[0].owner, "Biblioteca");
        assert_eq!(offers[0].status, "Abierta");
    }

    #[test]
    fn test_invalid_selector() {
        let config = ExtractConfig {
            row_selector: "[[invalid".to_string(),
            ..ExtractConfig::default()
        };
        assert!(matches!(
            OfferExtractor::new(&config),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn test_status_filter_pass_through() {
        assert!(StatusFilter::all().accepts("Cerrada"));
        assert!(StatusFilter::new(["", "  "]).accepts("Cerrada"));
        assert!(StatusFilter::new([" Abierta "]).accepts("abierta"));
        assert!(!StatusFilter::new(["Abierta"]).accepts("Cerrada"));
    }
}
