//! Offer data structure.

use serde::{Deserialize, Serialize};

/// A job offer row from the listing table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    /// Stable identifier of the offer
    pub code: String,

    /// Offer title
    pub title: String,

    /// Person or unit responsible for the offer
    pub owner: String,

    /// First day applications are accepted
    pub start_date: String,

    /// Last day applications are accepted
    pub end_date: String,

    /// Publication status (e.g. "Abierta")
    pub status: String,
}

impl Offer {
    /// Column names in positional order. Also the snapshot header.
    pub const FIELDS: [&'static str; 6] =
        ["code", "title", "owner", "start_date", "end_date", "status"];

    /// Number of fields a row must provide.
    pub const FIELD_COUNT: usize = Self::FIELDS.len();

    /// Build an offer from positional fields.
    ///
    /// Returns `None` when fewer than [`Offer::FIELD_COUNT`] fields are given.
    /// Trailing extra fields are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() < Self::FIELD_COUNT {
            return None;
        }
        let f = |i: usize| fields[i].as_ref().to_string();
        Some(Self {
            code: f(0),
            title: f(1),
            owner: f(2),
            start_date: f(3),
            end_date: f(4),
            status: f(5),
        })
    }

    /// Field values in [`Offer::FIELDS`] order.
    pub fn values(&self) -> [&str; 6] {
        [
            self.code.as_str(),
            self.title.as_str(),
            self.owner.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.status.as_str(),
        ]
    }

    /// Format offer for display using a template.
    ///
    /// Supported placeholders:
    /// - `{code}`, `{title}`, `{owner}`
    /// - `{start_date}`, `{end_date}`, `{status}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{code}", &self.code)
            .replace("{title}", &self.title)
            .replace("{owner}", &self.owner)
            .replace("{start_date}", &self.start_date)
            .replace("{end_date}", &self.end_date)
            .replace("{status}", &self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_offer() -> Offer {
        Offer {
            code: "2024-0117".to_string(),
            title: "Técnico de laboratorio".to_string(),
            owner: "Dpto. Informática".to_string(),
            start_date: "01/03/2024".to_string(),
            end_date: "15/03/2024".to_string(),
            status: "Abierta".to_string(),
        }
    }

    #[test]
    fn test_format() {
        let offer = sample_offer();
        let result = offer.format("[{code}] {title} ({status})");
        assert_eq!(result, "[2024-0117] Técnico de laboratorio (Abierta)");
    }

    #[test]
    fn test_from_fields_requires_six() {
        assert!(Offer::from_fields(&["a", "b", "c", "d", "e"]).is_none());
        let offer = Offer::from_fields(&["a", "b", "c", "d", "e", "f", "extra"]).unwrap();
        assert_eq!(offer.code, "a");
        assert_eq!(offer.status, "f");
    }

    #[test]
    fn test_values_follow_field_order() {
        let offer = sample_offer();
        let values = offer.values();
        assert_eq!(values[0], offer.code);
        assert_eq!(values[5], offer.status);
        assert_eq!(Offer::FIELD_COUNT, 6);
    }
}
