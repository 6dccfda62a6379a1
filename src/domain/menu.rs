use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category label treated as "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// A sellable catalog entry.
///
/// Rows are owned by the remote `menu_items` table and are read-only here;
/// prices are denominated in the store currency.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Distinct category labels in first-seen order.
pub fn categories(items: &[MenuItem]) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item.category) {
            seen.push(item.category.clone());
        }
    }
    seen
}

/// Pure category filter; [`ALL_CATEGORIES`] is the identity.
pub fn filter_by_category<'a>(items: &'a [MenuItem], category: &str) -> Vec<&'a MenuItem> {
    items
        .iter()
        .filter(|item| category == ALL_CATEGORIES || item.category == category)
        .collect()
}
