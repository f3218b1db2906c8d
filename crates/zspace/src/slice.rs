use serde::{Deserialize, Serialize};

/// Resource budgets, immutable within a tick.
///
/// `nodes` is the hard cap on the sum of window sizes; `tokens` feeds the
/// backpressure classifier; `edges` is reserved; `time_ms` is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    /// Instantaneous token load budget
    pub tokens: u32,
    /// Hard cap on total window occupancy
    pub nodes: u32,
    /// Reserved, unused by this core
    pub edges: u32,
    /// Advisory wall-clock budget per tick
    pub time_ms: u32,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            tokens: 4096,
            nodes: 256,
            edges: 0,
            time_ms: 30,
        }
    }
}

impl Budgets {
    /// A budget is usable when it admits at least one node.
    pub fn is_valid(&self) -> bool {
        self.nodes > 0
    }
}

/// A scored candidate node.
///
/// `vec` is optional; when present, every node in the same slice must carry
/// the same dimensionality. `metadata` is opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZNode {
    /// Unique id within the slice
    pub id: String,
    /// Relevance score in [0, 1]
    pub score: f64,
    /// Optional embedding, taken as an opaque vector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vec: Option<Vec<f64>>,
    /// Opaque caller payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ZNode {
    /// Build a vector-less node from id and score.
    pub fn scored(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            vec: None,
            metadata: None,
        }
    }

    /// Build a node carrying an embedding.
    pub fn with_vec(id: impl Into<String>, score: f64, vec: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            score,
            vec: Some(vec),
            metadata: None,
        }
    }
}

/// A weighted relation between two nodes of the same slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZEdge {
    /// Source node id
    pub src: String,
    /// Destination node id
    pub dst: String,
    /// Relation weight in [0, 1]
    pub weight: f64,
    /// Optional relation tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
}

/// A candidate set for one fill cycle.
///
/// Node ids are unique within a slice; edges may only reference ids present
/// in the same slice. The slice is read-only toward the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZSlice {
    /// Scored candidates
    pub nodes: Vec<ZNode>,
    /// Relations between candidates
    #[serde(default)]
    pub edges: Vec<ZEdge>,
    /// Per-slice resource quotas
    pub quotas: Budgets,
    /// Slice seed, combined with the session seed per fill
    pub seed: String,
    /// Z-Space schema version tag
    pub zv: String,
}

impl ZSlice {
    /// Build an edge-less slice with default quotas.
    pub fn new(seed: impl Into<String>, zv: impl Into<String>, nodes: Vec<ZNode>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
            quotas: Budgets::default(),
            seed: seed.into(),
            zv: zv.into(),
        }
    }
}
