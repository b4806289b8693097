// ============================================================
// Layer 3 — Answer Records
// ============================================================
// The unit exchanged with the evaluator: one ranked
// recommendation per playlist. The JSON shape is fixed:
//
//   { "id": 123, "songs": [ ... ], "tags": [ ... ] }
//
// Ground-truth files use the same shape (plus extra fields
// which are ignored on read).

use serde::{Deserialize, Serialize};

/// Stand-in tag list for regimes that never decode tags.
/// Ten distinct symbols so the evaluator accepts the list.
pub const TAG_PLACEHOLDER: [&str; 10] = ["_", "!", "@", "#", "$", "%", "&", "*", "(", ")"];

/// One playlist's ranked recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: u64,

    /// Recommended original song ids, best first
    #[serde(default)]
    pub songs: Vec<u64>,

    /// Recommended tags, best first
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AnswerRecord {
    pub fn new(id: u64, songs: Vec<u64>, tags: Vec<String>) -> Self {
        Self { id, songs, tags }
    }

    pub fn placeholder_tags() -> Vec<String> {
        TAG_PLACEHOLDER.iter().map(|s| s.to_string()).collect()
    }
}

/// Result of scoring a candidate answer file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalScore {
    pub song_ndcg: f64,
    pub tag_ndcg:  f64,
    /// Weighted blend: 0.85 * songs + 0.15 * tags
    pub score:     f64,
}

impl std::fmt::Display for EvalScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Music nDCG: {:.6} | Tag nDCG: {:.6} | Score: {:.6}",
            self.song_ndcg, self.tag_ndcg, self.score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_ten_distinct_symbols() {
        let tags = AnswerRecord::placeholder_tags();
        let unique: std::collections::HashSet<_> = tags.iter().collect();
        assert_eq!(tags.len(), 10);
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_json_field_names() {
        let rec = AnswerRecord::new(5, vec![10, 20], vec!["rock".into()]);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["songs"][1], 20);
        assert_eq!(json["tags"][0], "rock");
    }
}
