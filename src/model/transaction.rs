use crate::model::Amount;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Label used when no category information can be resolved for display.
pub(crate) const UNCATEGORISED: &str = "Uncategorised";

/// Whether a transaction adds to or subtracts from the balance.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionKind);
serde_plain::derive_fromstr_from_deserialize!(TransactionKind);

/// The category reference attached to a transaction.
///
/// The backend emits either a bare category id string or an embedded
/// `{id, name}` object depending on whether the query populated the relation.
/// Any other shape is dropped during deserialization and the transaction is
/// treated as uncategorised.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// A bare category identifier.
    Id(String),
    /// An embedded category object.
    Embedded(EmbeddedCategory),
}

/// The embedded form of a category reference.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CategoryRef {
    /// Builds a `CategoryRef` from a raw JSON value, accepting the two known
    /// payload shapes. The embedded form may carry its identifier under either
    /// `id` or `_id`; both normalize to `id` here so nothing downstream has to
    /// care.
    fn from_value(value: Value) -> Option<CategoryRef> {
        match value {
            Value::String(s) => Some(CategoryRef::Id(s)),
            Value::Object(map) => {
                let id = string_field(&map, "id").or_else(|| string_field(&map, "_id"));
                let name = string_field(&map, "name");
                Some(CategoryRef::Embedded(EmbeddedCategory { id, name }))
            }
            _ => None,
        }
    }

    /// The filter-comparable category identifier, if one can be resolved.
    pub fn id(&self) -> Option<&str> {
        match self {
            CategoryRef::Id(id) => non_empty(Some(id)),
            CategoryRef::Embedded(cat) => non_empty(cat.id.as_deref()),
        }
    }
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<CategoryRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(CategoryRef::from_value))
}

/// One recorded money movement. The id is assigned by the remote source and is
/// never generated client-side. The amount is a non-negative magnitude; the
/// display sign is derived from `kind`.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Calendar date in `YYYY-MM-DD` form, though the backend sometimes sends
    /// a full timestamp. Kept as delivered; see [`Transaction::parse_date`].
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// The filter-comparable category identifier, if one can be resolved.
    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().and_then(CategoryRef::id)
    }

    /// Parses the date field, accepting a plain date or an RFC 3339 timestamp.
    pub fn parse_date(&self) -> Option<NaiveDate> {
        let raw = self.date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    /// The display name for the category, resolved with the fallback chain
    /// embedded name, then the flat `categoryName` field, then a bare id
    /// string, then the title, then "Uncategorised".
    pub fn display_category(&self) -> String {
        let embedded_name = match &self.category {
            Some(CategoryRef::Embedded(cat)) => non_empty(cat.name.as_deref()),
            _ => None,
        };
        let bare_id = match &self.category {
            Some(CategoryRef::Id(id)) => non_empty(Some(id)),
            _ => None,
        };
        embedded_name
            .or(non_empty(self.category_name.as_deref()))
            .or(bare_id)
            .or(non_empty(self.title.as_deref()))
            .unwrap_or(UNCATEGORISED)
            .to_string()
    }

    /// Display label for a row: title, then category, per the list screens.
    pub fn display_title(&self) -> String {
        non_empty(self.title.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.display_category())
    }
}
