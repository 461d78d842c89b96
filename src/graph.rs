//! Graph accumulation for the force-directed view
//!
//! A [`GraphAccumulator`] consumes coupling records one at a time and keeps a
//! running node table and link list for a single [`GroupBy`] mode. Once the
//! input is exhausted it is finalized into a [`Projection`], the
//! JSON-serializable shape handed to the renderer.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::naming::{DisplayNames, GroupBy, simple_class_name};
use crate::palette::{ColorScale, TARGET_NODE_COLOR};
use crate::record::CouplingRecord;
use crate::usage::convert_to_usage_count;

/// Relative size of an artifact (source) node
pub const SOURCE_NODE_VAL: f64 = 1.7;
/// Relative size of a target method node
pub const TARGET_NODE_VAL: f64 = 0.4;
/// Curvature of every link
pub const LINK_CURVATURE: f64 = 0.1;

/// Errors raised by misuse of an accumulator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Invalid state: cannot {operation} the {group_by} graph after it was finalized")]
    InvalidState {
        operation: &'static str,
        group_by: GroupBy,
    },
}

/// Options applied when a graph is finalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Keep only the first link for each (source, target) pair
    pub dedupe_links: bool,
}

/// Kind-specific node attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeKind {
    /// An analysed artifact making calls
    #[serde(rename_all = "camelCase")]
    Source {
        application_name: String,
        artifact: String,
        coupling_class: String,
    },
    /// A method being called
    #[serde(rename_all = "camelCase")]
    Target { coupling_class: String },
}

/// A finalized graph node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    /// `true` for target method nodes
    pub target: bool,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Alphabetical usage summary, e.g. `Cart#add (x2)`
    pub coupling_method_usages: Vec<String>,
    /// Neighbour node id to the methods on this node realising that link
    pub coupling_link_map: BTreeMap<String, Vec<String>>,
    pub color: String,
    pub val: f64,
}

impl Node {
    pub fn is_target(&self) -> bool {
        self.target
    }
}

/// A directed link from a source node to a target node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub curvature: f64,
}

impl Link {
    fn new(source: String, target: String) -> Self {
        Self {
            source,
            target,
            curvature: LINK_CURVATURE,
        }
    }
}

/// Read-only graph for one grouping mode
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub color_map: BTreeMap<String, String>,
}

impl Projection {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Whether an upsert created a node or merged into an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Merged,
}

/// Result of ingesting one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOutcome {
    pub source: Upsert,
    pub target: Upsert,
}

/// Node while records are still arriving; holds the raw usage list.
#[derive(Debug)]
struct PendingNode {
    id: String,
    kind: NodeKind,
    color: String,
    val: f64,
    coupling_methods: Vec<String>,
    coupling_link_map: BTreeMap<String, Vec<String>>,
}

impl PendingNode {
    fn new(
        id: String,
        kind: NodeKind,
        color: String,
        val: f64,
        neighbor: &str,
        usage: String,
    ) -> Self {
        let mut coupling_link_map = BTreeMap::new();
        coupling_link_map.insert(neighbor.to_string(), vec![usage.clone()]);
        Self {
            id,
            kind,
            color,
            val,
            coupling_methods: vec![usage],
            coupling_link_map,
        }
    }

    fn merge(&mut self, neighbor: &str, usage: String) {
        let methods = self
            .coupling_link_map
            .entry(neighbor.to_string())
            .or_default();
        if !methods.contains(&usage) {
            methods.push(usage.clone());
        }
        self.coupling_methods.push(usage);
    }

    fn finalize(self) -> Node {
        Node {
            name: self.id.clone(),
            id: self.id,
            target: matches!(self.kind, NodeKind::Target { .. }),
            kind: self.kind,
            coupling_method_usages: convert_to_usage_count(&self.coupling_methods),
            coupling_link_map: self.coupling_link_map,
            color: self.color,
            val: self.val,
        }
    }
}

/// Mutable graph for one grouping mode; nodes keep insertion order.
#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<PendingNode>,
    index: HashMap<String, usize>,
    links: Vec<Link>,
    colors: ColorScale,
}

impl GraphState {
    /// Merge into the node `id` if it exists, otherwise create it with `create`.
    fn upsert(
        &mut self,
        id: &str,
        neighbor: &str,
        usage: String,
        create: impl FnOnce(String) -> PendingNode,
    ) -> Upsert {
        if let Some(&idx) = self.index.get(id) {
            self.nodes[idx].merge(neighbor, usage);
            Upsert::Merged
        } else {
            self.index.insert(id.to_string(), self.nodes.len());
            self.nodes.push(create(usage));
            Upsert::Created
        }
    }

    fn into_projection(self, options: GraphOptions) -> Projection {
        let color_map = self.colors.to_color_map();
        let links = if options.dedupe_links {
            let mut seen = HashSet::new();
            self.links
                .into_iter()
                .filter(|l| seen.insert((l.source.clone(), l.target.clone())))
                .collect()
        } else {
            self.links
        };

        Projection {
            nodes: self.nodes.into_iter().map(PendingNode::finalize).collect(),
            links,
            color_map,
        }
    }
}

#[derive(Debug)]
enum AccumulatorState {
    Open(GraphState),
    Finalized,
}

/// Incrementally builds the graph for one grouping mode.
///
/// Open until [`finalize`](Self::finalize) is called; afterwards every call
/// fails with [`GraphError::InvalidState`].
#[derive(Debug)]
pub struct GraphAccumulator {
    group_by: GroupBy,
    options: GraphOptions,
    state: AccumulatorState,
}

impl GraphAccumulator {
    pub fn new(group_by: GroupBy) -> Self {
        Self::with_options(group_by, GraphOptions::default())
    }

    pub fn with_options(group_by: GroupBy, options: GraphOptions) -> Self {
        Self {
            group_by,
            options,
            state: AccumulatorState::Open(GraphState::default()),
        }
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, AccumulatorState::Finalized)
    }

    /// Fold one record into the graph.
    pub fn ingest(&mut self, record: &CouplingRecord) -> Result<IngestOutcome, GraphError> {
        let AccumulatorState::Open(state) = &mut self.state else {
            return Err(GraphError::InvalidState {
                operation: "ingest into",
                group_by: self.group_by,
            });
        };

        let names = DisplayNames::from_record(record);
        let source_id = self.group_by.source_node_id(record, &names);
        let target_id = self.group_by.target_node_id(record, &names);
        let app_color = state.colors.color_for(&record.application_name);

        let source = state.upsert(&source_id, &target_id, names.source_usage(), |usage| {
            PendingNode::new(
                source_id.clone(),
                NodeKind::Source {
                    application_name: record.application_name.clone(),
                    artifact: record.artifact_full_name(),
                    coupling_class: String::new(),
                },
                app_color.to_string(),
                SOURCE_NODE_VAL,
                &target_id,
                usage,
            )
        });

        let target = state.upsert(&target_id, &source_id, names.target_usage(), |usage| {
            let coupling_class = simple_class_name(Some(names.target_class.as_str()))
                .unwrap_or_default()
                .to_string();
            PendingNode::new(
                target_id.clone(),
                NodeKind::Target { coupling_class },
                TARGET_NODE_COLOR.to_string(),
                TARGET_NODE_VAL,
                &source_id,
                usage,
            )
        });

        state.links.push(Link::new(source_id, target_id));

        Ok(IngestOutcome { source, target })
    }

    /// Close the graph and hand back its projection.
    pub fn finalize(&mut self) -> Result<Projection, GraphError> {
        match std::mem::replace(&mut self.state, AccumulatorState::Finalized) {
            AccumulatorState::Open(state) => Ok(state.into_projection(self.options)),
            AccumulatorState::Finalized => Err(GraphError::InvalidState {
                operation: "finalize",
                group_by: self.group_by,
            }),
        }
    }
}
