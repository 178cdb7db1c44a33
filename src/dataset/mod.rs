//! Node and link lists the layout is initialised from.

mod load;
mod parse;

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::layout::{LinkSpec, NodeSpec};

pub use load::load_dataset;
pub use parse::parse_dataset;

/// One graph: the engine's input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// A parsed input file.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    /// `{"nodes": [...], "links": [...]}`
    Single(GraphData),
    /// Analysis response keyed by symbol, each entry carrying its own graph.
    BySymbol(BTreeMap<String, GraphData>),
}

impl Dataset {
    pub fn symbols(&self) -> Vec<&str> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::BySymbol(graphs) => graphs.keys().map(String::as_str).collect(),
        }
    }

    /// Picks the graph for `symbol`, or the first one when no symbol is given.
    pub fn graph(&self, symbol: Option<&str>) -> Result<&GraphData> {
        match (self, symbol) {
            (Self::Single(graph), None) => Ok(graph),
            (Self::Single(graph), Some(symbol)) => {
                tracing::warn!(symbol, "dataset has a single graph; ignoring symbol");
                Ok(graph)
            }
            (Self::BySymbol(graphs), None) => graphs
                .values()
                .next()
                .ok_or_else(|| anyhow!("dataset contains no graphs")),
            (Self::BySymbol(graphs), Some(symbol)) => {
                let wanted = symbol.trim().to_ascii_uppercase();
                graphs
                    .iter()
                    .find(|(key, _)| key.to_ascii_uppercase() == wanted)
                    .map(|(_, graph)| graph)
                    .ok_or_else(|| {
                        anyhow!(
                            "symbol {symbol} not found; available: {}",
                            self.symbols().join(", ")
                        )
                    })
            }
        }
    }
}
