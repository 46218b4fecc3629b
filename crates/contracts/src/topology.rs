//! Skeleton topology: named keypoints and the edges drawn between them.

use serde::{Deserialize, Serialize};

/// Edge between two keypoints (start, end)
pub type Edge = (String, String);

/// Skeleton connection definition
///
/// Edges whose endpoints are missing from a sample are skipped at draw time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonTopology {
    /// Declared keypoint names (lower-case)
    pub keypoints: Vec<String>,

    /// Ordered edges
    pub edges: Vec<Edge>,
}

const SIDE_VIEW_KEYPOINTS: [&str; 9] = [
    "ear",
    "shoulder",
    "elbow",
    "wrist",
    "hip",
    "knee",
    "ankle",
    "heel",
    "foot_index",
];

const SIDE_VIEW_EDGES: [(&str, &str); 9] = [
    // Head / upper body
    ("ear", "shoulder"),
    ("shoulder", "elbow"),
    ("elbow", "wrist"),
    // Trunk
    ("shoulder", "hip"),
    // Legs
    ("hip", "knee"),
    ("knee", "ankle"),
    ("ankle", "heel"),
    ("heel", "foot_index"),
    ("ankle", "foot_index"),
];

impl Default for SkeletonTopology {
    /// Single-side (sagittal) body chain used for side-on rowing footage
    fn default() -> Self {
        Self {
            keypoints: SIDE_VIEW_KEYPOINTS.iter().map(|s| s.to_string()).collect(),
            edges: SIDE_VIEW_EDGES
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}

impl SkeletonTopology {
    pub fn new(keypoints: Vec<String>, edges: Vec<Edge>) -> Self {
        Self { keypoints, edges }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.keypoints.iter().any(|k| k == name)
    }

    /// Edges referencing an undeclared keypoint
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|(a, b)| !self.declares(a) || !self.declares(b))
    }
}
