use serde::{Deserialize, Deserializer, Serialize};

use super::point::Point;

/// Whether the integrator may move a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Free,
    /// Held at a fixed position; forces still act on its neighbours.
    Pinned(Point),
}

impl Anchor {
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

/// A node as owned by a running simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: String,
    pub group: i32,
    pub position: Point,
    pub velocity: Point,
    pub anchor: Anchor,
}

impl Node {
    pub(super) fn new(id: String, group: i32, position: Point) -> Self {
        Self {
            id,
            group,
            position,
            velocity: Point::ZERO,
            anchor: Anchor::Free,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A link between two nodes of the same simulation, resolved to node indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub(super) source_index: usize,
    pub(super) target_index: usize,
}

impl Link {
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }
}

fn default_group() -> i32 {
    1
}

/// Input record for one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default = "default_group")]
    pub group: i32,
    /// Caller-chosen start position; random placement is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, group: i32) -> Self {
        Self {
            id: id.into(),
            group,
            position: None,
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }
}

/// Input record for one link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    #[serde(deserialize_with = "deserialize_id")]
    pub source: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub target: String,
    pub value: f64,
}

impl LinkSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// Node ids arrive as strings or, from the correlation backend, as integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_become_strings() {
        let node: NodeSpec = serde_json::from_str(r#"{"id": 12, "group": 2}"#).expect("valid node");
        assert_eq!(node.id, "12");
        assert_eq!(node.group, 2);

        let link: LinkSpec =
            serde_json::from_str(r#"{"source": 3, "target": "GOOGL", "value": 0.8}"#)
                .expect("valid link");
        assert_eq!(link.source, "3");
        assert_eq!(link.target, "GOOGL");
    }

    #[test]
    fn group_defaults_to_one() {
        let node: NodeSpec = serde_json::from_str(r#"{"id": "AAPL"}"#).expect("valid node");
        assert_eq!(node.group, 1);
        assert_eq!(node.position, None);
    }

    #[test]
    fn anchor_serializes_with_kind_tag() {
        let pinned = serde_json::to_value(Anchor::Pinned(Point::new(1.0, 2.0))).expect("serializes");
        assert_eq!(pinned["kind"], "pinned");
        assert!(Anchor::Pinned(Point::ZERO).is_pinned());
        assert!(!Anchor::Free.is_pinned());
    }
}
