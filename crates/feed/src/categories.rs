// ABOUTME: Flattens <itunes:category> nodes into a position-keyed label map.
// ABOUTME: A nested sub-category takes the slot after its parent; later siblings overwrite it.

use crate::document::CategoryNode;
use crate::models::Categories;

/// Flattens category nodes into `{position: label}`.
///
/// Node `i` writes position `i`, its sub-category writes `i + 1`. Writes happen
/// in document order, so a sibling at `i + 1` replaces an earlier sub-category.
pub fn normalize_categories(nodes: &[CategoryNode]) -> Categories {
    let mut out = Categories::new();
    for (index, node) in nodes.iter().enumerate() {
        if let Some(label) = &node.text {
            out.insert(index, label.clone());
        }
        if let Some(sub) = node.subcategory.as_ref().and_then(|s| s.text.as_ref()) {
            out.insert(index + 1, sub.clone());
        }
    }
    out
}
