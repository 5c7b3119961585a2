//! Community detection over the entity graph.
//!
//! Primary pass: HDBSCAN on composite features (entity embedding plus
//! document-membership signal). Noise points then attach to their
//! strongest-edged neighbor's community; whatever remains groups by
//! connected component. Every entity ends up in exactly one community, so
//! global mode's clusters always cover the entities local mode can reach.

use std::collections::HashMap;

use hdbscan::{Hdbscan, HdbscanHyperParams};
use lore_core::models::graph::{Community, GraphSnapshot};
use tracing::debug;

use crate::graph::EntityGraph;

/// Weight of the embedding signal in composite features.
const W_EMBEDDING: f32 = 0.7;
/// Weight of the document-membership signal.
const W_PROVENANCE: f32 = 0.3;

/// Entities named in a community summary headline.
const SUMMARY_HEADLINE_ENTITIES: usize = 5;
/// Description budget per community summary.
const SUMMARY_DESCRIPTION_LEN: usize = 600;

/// Detect communities over the snapshot's entities.
pub fn detect(snapshot: &GraphSnapshot, min_size: usize) -> Vec<Community> {
    let keys: Vec<String> = snapshot.entities.keys().cloned().collect();
    if keys.is_empty() {
        return Vec::new();
    }

    let graph = EntityGraph::build(snapshot);
    let assignments = if keys.len() < min_size.max(2) {
        // Too small to cluster: one community holds everything.
        vec![0i32; keys.len()]
    } else {
        cluster(snapshot, &keys, min_size)
    };

    let mut by_label: HashMap<i32, Vec<usize>> = HashMap::new();
    let mut unassigned: Vec<usize> = Vec::new();
    for (idx, &label) in assignments.iter().enumerate() {
        if label < 0 {
            unassigned.push(idx);
        } else {
            by_label.entry(label).or_default().push(idx);
        }
    }

    // Attach noise points to the community of their strongest neighbor.
    let key_label: HashMap<&str, i32> = assignments
        .iter()
        .enumerate()
        .filter(|(_, &l)| l >= 0)
        .map(|(i, &l)| (keys[i].as_str(), l))
        .collect();
    let mut leftover = Vec::new();
    for idx in unassigned {
        let attached = graph
            .strongest_neighbor(&keys[idx])
            .and_then(|n| key_label.get(n.as_str()).copied());
        match attached {
            Some(label) => by_label.entry(label).or_default().push(idx),
            None => leftover.push(idx),
        }
    }

    // Remaining entities group by connected component among themselves.
    let mut next_label = by_label.keys().copied().max().unwrap_or(-1) + 1;
    let mut seen: HashMap<usize, bool> = HashMap::new();
    for &idx in &leftover {
        if seen.contains_key(&idx) {
            continue;
        }
        let reachable = graph.neighborhood(&[keys[idx].clone()], keys.len());
        let members: Vec<usize> = leftover
            .iter()
            .copied()
            .filter(|&i| reachable.contains(&keys[i]) || i == idx)
            .collect();
        for &m in &members {
            seen.insert(m, true);
        }
        by_label.insert(next_label, members);
        next_label += 1;
    }

    let mut labels: Vec<i32> = by_label.keys().copied().collect();
    labels.sort();

    let mut communities = Vec::with_capacity(labels.len());
    for (community_id, label) in labels.into_iter().enumerate() {
        let mut members: Vec<String> = by_label[&label].iter().map(|&i| keys[i].clone()).collect();
        members.sort();
        members.dedup();
        let summary = summarize(snapshot, &members);
        communities.push(Community {
            id: community_id as u32,
            members,
            summary,
            embedding: Vec::new(),
        });
    }

    debug!(
        entities = keys.len(),
        communities = communities.len(),
        "community detection complete"
    );
    communities
}

/// HDBSCAN labels for each entity key; negative labels are noise.
fn cluster(snapshot: &GraphSnapshot, keys: &[String], min_size: usize) -> Vec<i32> {
    let features = composite_features(snapshot, keys);

    let hyper_params = HdbscanHyperParams::builder()
        .min_cluster_size(min_size.max(2))
        .min_samples(1)
        .build();
    let clusterer = Hdbscan::new(&features, hyper_params);
    match clusterer.cluster() {
        Ok(labels) => labels,
        Err(_) => {
            // Clustering failure degrades to all-noise; the structural
            // passes still produce full coverage.
            vec![-1; keys.len()]
        }
    }
}

/// Embedding signal concatenated with a per-document membership vector.
fn composite_features(snapshot: &GraphSnapshot, keys: &[String]) -> Vec<Vec<f32>> {
    let doc_index: HashMap<&str, usize> = snapshot
        .documents
        .iter()
        .enumerate()
        .map(|(i, d)| (d.id.as_str(), i))
        .collect();
    let doc_count = doc_index.len().max(1);

    keys.iter()
        .map(|key| {
            let entity = &snapshot.entities[key];
            let mut feature: Vec<f32> = entity
                .embedding
                .iter()
                .map(|v| v * W_EMBEDDING)
                .collect();

            let mut membership = vec![0.0f32; doc_count];
            for doc_id in &entity.provenance {
                if let Some(&i) = doc_index.get(doc_id.as_str()) {
                    membership[i] = W_PROVENANCE;
                }
            }
            feature.extend(membership);
            feature
        })
        .collect()
}

/// Thematic summary text for a community: headline entities, aggregated
/// descriptions, and the relationships that bind the members.
fn summarize(snapshot: &GraphSnapshot, members: &[String]) -> String {
    let mut ranked: Vec<&String> = members.iter().collect();
    ranked.sort_by_key(|k| {
        std::cmp::Reverse(snapshot.entities.get(*k).map(|e| e.mentions).unwrap_or(0))
    });

    let headline: Vec<String> = ranked
        .iter()
        .take(SUMMARY_HEADLINE_ENTITIES)
        .filter_map(|k| snapshot.entities.get(*k).map(|e| e.name.clone()))
        .collect();

    let mut description = String::new();
    for key in ranked.iter().take(SUMMARY_HEADLINE_ENTITIES) {
        if let Some(entity) = snapshot.entities.get(key.as_str()) {
            if description.len() >= SUMMARY_DESCRIPTION_LEN {
                break;
            }
            if !entity.description.is_empty() {
                if !description.is_empty() {
                    description.push(' ');
                }
                let budget = SUMMARY_DESCRIPTION_LEN - description.len();
                description.push_str(truncate(&entity.description, budget));
            }
        }
    }

    let internal_edges = snapshot
        .relationships
        .iter()
        .filter(|r| members.contains(&r.source) && members.contains(&r.target))
        .count();

    format!(
        "Theme around {}: {} ({} entities, {} internal relationships)",
        headline.join(", "),
        description,
        members.len(),
        internal_edges
    )
}

fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut cut = limit;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::graph::{EntityKind, GraphEntity, GraphRelationship};

    fn snapshot_with(entities: &[(&str, &[f32])], edges: &[(&str, &str)]) -> GraphSnapshot {
        let mut snapshot = GraphSnapshot::default();
        for (name, embedding) in entities {
            let key = name.to_lowercase();
            snapshot.entities.insert(
                key.clone(),
                GraphEntity {
                    key,
                    name: name.to_string(),
                    kind: EntityKind::Person,
                    description: format!("{name} description"),
                    provenance: vec!["doc-1".into()],
                    mentions: 1,
                    embedding: embedding.to_vec(),
                },
            );
        }
        for (a, b) in edges {
            snapshot.relationships.push(GraphRelationship {
                source: a.to_lowercase(),
                target: b.to_lowercase(),
                description: String::new(),
                provenance: vec!["doc-1".into()],
                weight: 1.0,
            });
        }
        snapshot
    }

    #[test]
    fn every_entity_lands_in_exactly_one_community() {
        let snapshot = snapshot_with(
            &[
                ("A", &[1.0, 0.0]),
                ("B", &[0.9, 0.1]),
                ("C", &[0.0, 1.0]),
                ("D", &[0.1, 0.9]),
                ("Lone", &[-1.0, -1.0]),
            ],
            &[("A", "B"), ("C", "D")],
        );
        let communities = detect(&snapshot, 2);

        let mut seen: Vec<&String> = communities.iter().flat_map(|c| &c.members).collect();
        seen.sort();
        assert_eq!(seen.len(), snapshot.entity_count(), "full coverage");
        seen.dedup();
        assert_eq!(seen.len(), snapshot.entity_count(), "no overlap");
    }

    #[test]
    fn tiny_graphs_form_one_community() {
        let snapshot = snapshot_with(&[("A", &[1.0, 0.0])], &[]);
        let communities = detect(&snapshot, 4);
        assert_eq!(communities.len(), 1);
        assert_eq!(communities[0].members, vec!["a"]);
    }

    #[test]
    fn empty_snapshot_has_no_communities() {
        assert!(detect(&GraphSnapshot::default(), 2).is_empty());
    }

    #[test]
    fn summaries_name_their_members() {
        let snapshot = snapshot_with(&[("Sarah", &[1.0, 0.0]), ("Jake", &[0.9, 0.1])], &[("Sarah", "Jake")]);
        let communities = detect(&snapshot, 2);
        let all: String = communities.iter().map(|c| c.summary.clone()).collect();
        assert!(all.contains("Sarah") || all.contains("Jake"));
    }
}
