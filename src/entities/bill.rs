//! Bill entity - One expense-report record as exchanged with the store.
//!
//! Bills travel as camelCase JSON. Records coming back from the store are read
//! leniently: unknown expense categories are preserved and a missing or
//! malformed `pct` falls back to [`DEFAULT_PCT`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Percentage applied when a bill carries no usable `pct`.
pub const DEFAULT_PCT: i64 = 20;

/// Expense bill as stored remotely
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Identifier assigned by the store on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owner of the bill (session email at creation time)
    pub email: String,
    /// Expense category
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    /// Free-text label
    pub name: String,
    /// Amount in whole currency units
    pub amount: i64,
    /// Canonical `YYYY-MM-DD` date
    pub date: String,
    #[serde(default)]
    pub vat: Option<String>,
    /// VAT percentage
    #[serde(default = "default_pct", deserialize_with = "lenient_pct")]
    pub pct: i64,
    #[serde(default)]
    pub commentary: Option<String>,
    /// Location of the uploaded receipt, set together with `file_name`
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub status: BillStatus,
}

const fn default_pct() -> i64 {
    DEFAULT_PCT
}

// Accepts numbers, numeric strings, null or garbage; anything unusable becomes the default.
fn lenient_pct<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let pct = match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => crate::core::form::parse_int(&s),
        _ => None,
    };
    Ok(pct.unwrap_or(DEFAULT_PCT))
}

/// Review status of a bill
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Waiting for review; every client-created bill starts here
    Pending,
    /// Approved by an administrator
    Accepted,
    /// Rejected by an administrator
    Refused,
}

/// Expense categories offered by the new-bill form.
///
/// The store speaks the French labels; English names are accepted when
/// parsing. Labels the client does not know survive as [`ExpenseType::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseType {
    Transport,
    Food,
    Accommodation,
    OnlineServices,
    ItAndElectronics,
    Equipment,
    OfficeSupplies,
    /// Category not known to this client
    Other(String),
}

impl ExpenseType {
    /// Every category the form can submit.
    pub const KNOWN: [Self; 7] = [
        Self::Transport,
        Self::Food,
        Self::Accommodation,
        Self::OnlineServices,
        Self::ItAndElectronics,
        Self::Equipment,
        Self::OfficeSupplies,
    ];

    /// Label used on the wire.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Transport => "Transports",
            Self::Food => "Restaurants et bars",
            Self::Accommodation => "Hôtel et logement",
            Self::OnlineServices => "Services en ligne",
            Self::ItAndElectronics => "IT et électronique",
            Self::Equipment => "Equipement et matériel",
            Self::OfficeSupplies => "Fournitures de bureau",
            Self::Other(label) => label,
        }
    }

    const fn english_alias(&self) -> Option<&'static str> {
        match self {
            Self::Transport => Some("Transport"),
            Self::Food => Some("Food"),
            Self::Accommodation => Some("Accommodation"),
            Self::OnlineServices => Some("Online services"),
            Self::ItAndElectronics => Some("IT and electronics"),
            Self::Equipment => Some("Equipment"),
            Self::OfficeSupplies => Some("Office supplies"),
            Self::Other(_) => None,
        }
    }

    fn lookup(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::KNOWN.into_iter().find(|known| {
            known.label().eq_ignore_ascii_case(label)
                || known
                    .english_alias()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(label))
        })
    }
}

impl FromStr for ExpenseType {
    type Err = crate::errors::ValidationError;

    /// Strict parse used for form input: only known categories are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| crate::errors::ValidationError::UnknownExpenseType {
            value: s.to_string(),
        })
    }
}

impl From<String> for ExpenseType {
    fn from(value: String) -> Self {
        Self::lookup(&value).unwrap_or(Self::Other(value))
    }
}

impl From<ExpenseType> for String {
    fn from(value: ExpenseType) -> Self {
        match value {
            ExpenseType::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_store_record() {
        let bill: Model = serde_json::from_value(json!({
            "id": "47qAXb6fIm2zOKkLzMro",
            "vat": "80",
            "fileUrl": "https://test.storage.tld/preview.jpg",
            "status": "pending",
            "type": "Hôtel et logement",
            "commentary": "séminaire billed",
            "name": "encore",
            "fileName": "preview.jpg",
            "date": "2004-04-04",
            "amount": 400,
            "commentAdmin": "ok",
            "email": "a@a",
            "pct": 20
        }))
        .unwrap();

        assert_eq!(bill.id.as_deref(), Some("47qAXb6fIm2zOKkLzMro"));
        assert_eq!(bill.expense_type, ExpenseType::Accommodation);
        assert_eq!(bill.status, BillStatus::Pending);
        assert_eq!(bill.amount, 400);
        assert_eq!(bill.file_name.as_deref(), Some("preview.jpg"));
    }

    #[test]
    fn test_pct_falls_back_to_default() {
        for pct in [json!(null), json!(""), json!("abc"), json!({})] {
            let bill: Model = serde_json::from_value(json!({
                "email": "a@a",
                "type": "Transports",
                "name": "taxi",
                "amount": 12,
                "date": "2021-01-01",
                "pct": pct,
                "status": "refused"
            }))
            .unwrap();
            assert_eq!(bill.pct, DEFAULT_PCT);
        }

        let missing: Model = serde_json::from_value(json!({
            "email": "a@a",
            "type": "Transports",
            "name": "taxi",
            "amount": 12,
            "date": "2021-01-01",
            "status": "accepted"
        }))
        .unwrap();
        assert_eq!(missing.pct, DEFAULT_PCT);

        let numeric_string: Model = serde_json::from_value(json!({
            "email": "a@a",
            "type": "Transports",
            "name": "taxi",
            "amount": 12,
            "date": "2021-01-01",
            "pct": "10",
            "status": "accepted"
        }))
        .unwrap();
        assert_eq!(numeric_string.pct, 10);
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let parsed = ExpenseType::from("Divers".to_string());
        assert_eq!(parsed, ExpenseType::Other("Divers".to_string()));
        assert_eq!(String::from(parsed), "Divers");
    }

    #[test]
    fn test_expense_type_accepts_english_aliases() {
        assert_eq!("Food".parse::<ExpenseType>().unwrap(), ExpenseType::Food);
        assert_eq!(
            "accommodation".parse::<ExpenseType>().unwrap(),
            ExpenseType::Accommodation
        );
        assert_eq!(
            "Transports".parse::<ExpenseType>().unwrap(),
            ExpenseType::Transport
        );
        assert!("Divers".parse::<ExpenseType>().is_err());
    }

    #[test]
    fn test_serializes_wire_labels() {
        let value = serde_json::to_value(ExpenseType::Food).unwrap();
        assert_eq!(value, json!("Restaurants et bars"));
        let status = serde_json::to_value(BillStatus::Refused).unwrap();
        assert_eq!(status, json!("refused"));
    }
}
