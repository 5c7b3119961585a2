//! Graph assembly: merging extractions into a snapshot, and a petgraph
//! view for traversal.

use std::collections::HashMap;

use lore_core::models::graph::{
    normalize_name, GraphEntity, GraphRelationship, GraphSnapshot,
};
use lore_core::traits::Extraction;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// Cap on how much description text accumulates per entity.
const MAX_DESCRIPTION_LEN: usize = 1_500;

/// Merge one document's extraction into a snapshot under construction.
///
/// Entities are deduplicated by normalized name: a repeat mention unions
/// provenance and appends its description rather than overwriting. The
/// first-seen kind wins. Relationships dedup on the undirected endpoint
/// pair; repeats grow the weight.
pub fn merge_extraction(snapshot: &mut GraphSnapshot, doc_id: &str, extraction: &Extraction) {
    for extracted in &extraction.entities {
        let key = normalize_name(&extracted.name);
        if key.is_empty() {
            continue;
        }
        match snapshot.entities.get_mut(&key) {
            Some(existing) => {
                existing.mentions += 1;
                if !existing.provenance.iter().any(|p| p == doc_id) {
                    existing.provenance.push(doc_id.to_string());
                }
                append_description(&mut existing.description, &extracted.description);
            }
            None => {
                snapshot.entities.insert(
                    key.clone(),
                    GraphEntity {
                        key,
                        name: extracted.name.clone(),
                        kind: extracted.kind,
                        description: extracted.description.clone(),
                        provenance: vec![doc_id.to_string()],
                        mentions: 1,
                        embedding: Vec::new(),
                    },
                );
            }
        }
    }

    for relation in &extraction.relations {
        let source = normalize_name(&relation.source);
        let target = normalize_name(&relation.target);
        if source.is_empty() || target.is_empty() || source == target {
            continue;
        }
        // Only keep edges whose endpoints survived entity merging.
        if !snapshot.entities.contains_key(&source) || !snapshot.entities.contains_key(&target) {
            continue;
        }

        let key = if source <= target {
            (source.clone(), target.clone())
        } else {
            (target.clone(), source.clone())
        };
        if let Some(existing) = snapshot
            .relationships
            .iter_mut()
            .find(|r| r.key() == key)
        {
            existing.weight += 1.0;
            if !existing.provenance.iter().any(|p| p == doc_id) {
                existing.provenance.push(doc_id.to_string());
            }
            append_description(&mut existing.description, &relation.description);
        } else {
            snapshot.relationships.push(GraphRelationship {
                source,
                target,
                description: relation.description.clone(),
                provenance: vec![doc_id.to_string()],
                weight: 1.0,
            });
        }
    }
}

/// Append a description fragment unless it is already present or the
/// aggregate is full.
fn append_description(aggregate: &mut String, fragment: &str) {
    if fragment.is_empty()
        || aggregate.contains(fragment)
        || aggregate.len() >= MAX_DESCRIPTION_LEN
    {
        return;
    }
    if !aggregate.is_empty() {
        aggregate.push_str(" | ");
    }
    aggregate.push_str(fragment);
}

/// A petgraph view over a snapshot's entities and relationships, for
/// neighborhood expansion and community post-processing.
pub struct EntityGraph {
    graph: UnGraph<String, f32>,
    nodes: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    pub fn build(snapshot: &GraphSnapshot) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut nodes = HashMap::new();
        for key in snapshot.entities.keys() {
            let idx = graph.add_node(key.clone());
            nodes.insert(key.clone(), idx);
        }
        for relationship in &snapshot.relationships {
            if let (Some(&a), Some(&b)) = (
                nodes.get(&relationship.source),
                nodes.get(&relationship.target),
            ) {
                graph.add_edge(a, b, relationship.weight);
            }
        }
        Self { graph, nodes }
    }

    /// Entity keys within `hops` relationship steps of the seed set,
    /// including the seeds themselves.
    pub fn neighborhood(&self, seeds: &[String], hops: usize) -> Vec<String> {
        let mut visited: HashMap<NodeIndex, usize> = HashMap::new();
        let mut frontier: Vec<NodeIndex> = seeds
            .iter()
            .filter_map(|k| self.nodes.get(k).copied())
            .collect();
        for &n in &frontier {
            visited.insert(n, 0);
        }

        for depth in 1..=hops {
            let mut next = Vec::new();
            for &node in &frontier {
                for neighbor in self.graph.neighbors(node) {
                    if let std::collections::hash_map::Entry::Vacant(slot) =
                        visited.entry(neighbor)
                    {
                        slot.insert(depth);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }

        let mut keys: Vec<String> = visited
            .keys()
            .map(|&n| self.graph[n].clone())
            .collect();
        keys.sort();
        keys
    }

    /// The neighbor of `key` connected by the heaviest edge, if any.
    pub fn strongest_neighbor(&self, key: &str) -> Option<String> {
        let node = *self.nodes.get(key)?;
        self.graph
            .edges(node)
            .max_by(|a, b| {
                a.weight()
                    .partial_cmp(b.weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|edge| {
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                self.graph[other].clone()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::graph::EntityKind;
    use lore_core::traits::{ExtractedEntity, ExtractedRelation};

    fn entity(name: &str, description: &str) -> ExtractedEntity {
        ExtractedEntity {
            name: name.into(),
            kind: EntityKind::Person,
            description: description.into(),
        }
    }

    #[test]
    fn repeat_mentions_merge_not_duplicate() {
        let mut snapshot = GraphSnapshot::default();
        let extraction = Extraction {
            entities: vec![entity("Sarah", "enters the shop"), entity("sarah", "orders coffee")],
            relations: vec![],
        };
        merge_extraction(&mut snapshot, "doc-1", &extraction);

        assert_eq!(snapshot.entity_count(), 1);
        let sarah = &snapshot.entities["sarah"];
        assert_eq!(sarah.mentions, 2);
        assert!(sarah.description.contains("enters the shop"));
        assert!(sarah.description.contains("orders coffee"));
        assert_eq!(sarah.provenance, vec!["doc-1"]);
    }

    #[test]
    fn provenance_unions_across_documents() {
        let mut snapshot = GraphSnapshot::default();
        let extraction = Extraction {
            entities: vec![entity("Sarah", "a writer")],
            relations: vec![],
        };
        merge_extraction(&mut snapshot, "doc-1", &extraction);
        merge_extraction(&mut snapshot, "doc-2", &extraction);

        assert_eq!(snapshot.entities["sarah"].provenance, vec!["doc-1", "doc-2"]);
    }

    #[test]
    fn relationships_dedup_and_gain_weight() {
        let mut snapshot = GraphSnapshot::default();
        let extraction = Extraction {
            entities: vec![entity("Sarah", ""), entity("Jake", "")],
            relations: vec![ExtractedRelation {
                source: "Sarah".into(),
                target: "Jake".into(),
                description: "meet in the shop".into(),
            }],
        };
        merge_extraction(&mut snapshot, "doc-1", &extraction);

        let reversed = Extraction {
            entities: vec![entity("Sarah", ""), entity("Jake", "")],
            relations: vec![ExtractedRelation {
                source: "Jake".into(),
                target: "Sarah".into(),
                description: "argue about the ending".into(),
            }],
        };
        merge_extraction(&mut snapshot, "doc-2", &reversed);

        assert_eq!(snapshot.relationship_count(), 1);
        let edge = &snapshot.relationships[0];
        assert_eq!(edge.weight, 2.0);
        assert_eq!(edge.provenance.len(), 2);
    }

    #[test]
    fn dangling_relations_are_dropped() {
        let mut snapshot = GraphSnapshot::default();
        let extraction = Extraction {
            entities: vec![entity("Sarah", "")],
            relations: vec![ExtractedRelation {
                source: "Sarah".into(),
                target: "Nobody".into(),
                description: String::new(),
            }],
        };
        merge_extraction(&mut snapshot, "doc-1", &extraction);
        assert_eq!(snapshot.relationship_count(), 0);
    }

    #[test]
    fn neighborhood_expands_by_hops() {
        let mut snapshot = GraphSnapshot::default();
        let extraction = Extraction {
            entities: vec![entity("A", ""), entity("B", ""), entity("C", ""), entity("D", "")],
            relations: vec![
                ExtractedRelation { source: "A".into(), target: "B".into(), description: String::new() },
                ExtractedRelation { source: "B".into(), target: "C".into(), description: String::new() },
                ExtractedRelation { source: "C".into(), target: "D".into(), description: String::new() },
            ],
        };
        merge_extraction(&mut snapshot, "doc-1", &extraction);
        let graph = EntityGraph::build(&snapshot);

        assert_eq!(graph.neighborhood(&["a".into()], 1), vec!["a", "b"]);
        assert_eq!(graph.neighborhood(&["a".into()], 2), vec!["a", "b", "c"]);
    }
}
