// ABOUTME: Flattens <podcast:person> nodes into PersonCredit records.
// ABOUTME: Ids are 1-based list positions, recomputed on every call.

use crate::document::PersonNode;
use crate::models::PersonCredit;

pub fn normalize_persons(nodes: &[PersonNode]) -> Vec<PersonCredit> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| PersonCredit {
            id: index as u32 + 1,
            name: node.name.clone().unwrap_or_default(),
            role: node
                .role
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default(),
            group: node.group.clone().unwrap_or_default(),
            href: node.href.clone().unwrap_or_default(),
            img: node.img.clone().unwrap_or_default(),
        })
        .collect()
}
