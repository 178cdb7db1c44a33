use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::{Dataset, GraphData};

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("dataset must be a JSON object"))?;

    if object.contains_key("nodes") {
        let graph = GraphData::deserialize(&parsed).context("invalid graph in dataset")?;
        return Ok(Dataset::Single(graph));
    }

    if let Some(detail) = object.get("detail").and_then(Value::as_str) {
        return Err(anyhow!("analysis backend reported an error: {detail}"));
    }

    let mut graphs = BTreeMap::new();
    for (symbol, value) in object {
        if value.get("nodes").is_none() {
            tracing::debug!(%symbol, "skipping dataset entry without nodes");
            continue;
        }

        let graph = GraphData::deserialize(value)
            .with_context(|| format!("invalid graph for symbol {symbol}"))?;
        graphs.insert(symbol.clone(), graph);
    }

    if graphs.is_empty() {
        Err(anyhow!("could not find any graph in dataset; expected a nodes list"))
    } else {
        Ok(Dataset::BySymbol(graphs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_graph() {
        let raw = r#"{
            "nodes": [{"id": "AAPL", "group": 1}, {"id": "GOOGL", "group": 2}],
            "links": [{"source": "AAPL", "target": "GOOGL", "value": 4}]
        }"#;
        let Dataset::Single(graph) = parse_dataset(raw).expect("valid dataset") else {
            panic!("expected a single graph");
        };
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].group, 2);
        assert_eq!(graph.links[0].value, 4.0);
    }

    #[test]
    fn parses_analysis_response_with_integer_ids() {
        let raw = r#"{
            "AAPL": {
                "nodes": [{"id": 0, "group": 1}, {"id": 3, "group": 1}],
                "links": [{"source": 0, "target": 3, "value": 0.82}],
                "prices": [1.0, 2.0],
                "section_start": 0
            },
            "GOOGL": {
                "nodes": [{"id": 1, "group": 1}],
                "links": []
            }
        }"#;
        let dataset = parse_dataset(raw).expect("valid dataset");
        assert_eq!(dataset.symbols(), vec!["AAPL", "GOOGL"]);
        let graph = dataset.graph(Some("AAPL")).expect("AAPL exists");
        assert_eq!(graph.nodes[1].id, "3");
        assert_eq!(graph.links[0].target, "3");
    }

    #[test]
    fn missing_links_default_to_empty() {
        let Dataset::Single(graph) =
            parse_dataset(r#"{"nodes": [{"id": "A"}]}"#).expect("valid dataset")
        else {
            panic!("expected a single graph");
        };
        assert!(graph.links.is_empty());
    }

    #[test]
    fn backend_error_is_surfaced() {
        let error = parse_dataset(r#"{"detail": "No valid data processed."}"#)
            .expect_err("error payload");
        assert!(error.to_string().contains("No valid data processed."));
    }

    #[test]
    fn rejects_non_graph_json() {
        assert!(parse_dataset("[1, 2, 3]").is_err());
        assert!(parse_dataset(r#"{"version": 2}"#).is_err());
        assert!(parse_dataset("not json").is_err());
    }
}
