// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams the orchestrator talks through:
//
//   PlaylistSource — where raw playlists come from
//                    (JSON files today)
//   AnswerScorer   — how a candidate answer file is judged
//                    against the ground truth
//
// The training loop is generic over AnswerScorer so tests
// can plug in a scorer that fails on purpose.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::Path;

use crate::domain::answer::EvalScore;
use crate::domain::playlist::Playlist;

// ─── PlaylistSource ───────────────────────────────────────────────────────────
/// Any component that can produce raw playlists.
///
/// Implementations:
///   - PlaylistLoader → reads an arena JSON file
pub trait PlaylistSource {
    fn load_all(&self) -> Result<Vec<Playlist>>;
}

// ─── AnswerScorer ─────────────────────────────────────────────────────────────
/// Scores a candidate answer file against a ground-truth answer file.
///
/// Implementations:
///   - ArenaEvaluator → song/tag nDCG
pub trait AnswerScorer {
    fn score(&self, ground_truth: &Path, candidates: &Path) -> Result<EvalScore>;
}
