use crate::model::TransactionKind;
use serde::{Deserialize, Serialize};

/// The most categories a user may create per kind, mirroring the server rule.
pub const MAX_PER_KIND: usize = 10;

/// An income or expense bucket a transaction can belong to.
///
/// Depending on the endpoint, the backend reports the identifier under `id`
/// or `_id`. Both are accepted during deserialization and normalized into the
/// single `id` field, falling back to the name when neither is present, so
/// core logic never branches on field-name variants.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CategoryWire")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub is_default: bool,
}

impl Category {
    /// The default category cannot be deleted; everything else can.
    pub fn can_delete(&self) -> bool {
        !self.is_default
    }
}

/// The raw payload shape, before identifier normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(default)]
    is_default: bool,
}

impl From<CategoryWire> for Category {
    fn from(wire: CategoryWire) -> Self {
        let id = wire
            .id
            .filter(|s| !s.is_empty())
            .or(wire.mongo_id.filter(|s| !s.is_empty()))
            .unwrap_or_else(|| wire.name.clone());
        Category {
            id,
            name: wire.name,
            kind: wire.kind,
            is_default: wire.is_default,
        }
    }
}

/// Narrows a category list to one kind, preserving order.
pub fn categories_of_kind(
    categories: &[Category],
    kind: TransactionKind,
) -> impl Iterator<Item = &Category> {
    categories.iter().filter(move |c| c.kind == kind)
}

/// True when the per-kind cap has been reached and no more categories of this
/// kind may be created.
pub fn kind_is_full(categories: &[Category], kind: TransactionKind) -> bool {
    categories_of_kind(categories, kind).count() >= MAX_PER_KIND
}

/// The category the add-transaction flow preselects for a kind: the
/// default-flagged one, else the first of that kind, else none.
pub fn default_selection(categories: &[Category], kind: TransactionKind) -> Option<&Category> {
    let mut of_kind = categories_of_kind(categories, kind).peekable();
    let first = of_kind.peek().copied();
    of_kind.find(|c| c.is_default).or(first)
}
