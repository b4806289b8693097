// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores a finished answer file (for example a submission
// written by another tool) against a ground-truth file with
// the same evaluator the training loop uses.

use anyhow::Result;
use std::path::PathBuf;

use crate::domain::{answer::EvalScore, traits::AnswerScorer};
use crate::infra::evaluator::ArenaEvaluator;

pub struct EvaluateUseCase {
    ground_truth: PathBuf,
    candidates:   PathBuf,
    evaluator:    ArenaEvaluator,
}

impl EvaluateUseCase {
    pub fn new(ground_truth: PathBuf, candidates: PathBuf, song_k: usize, tag_k: usize) -> Self {
        Self { ground_truth, candidates, evaluator: ArenaEvaluator::new(song_k, tag_k) }
    }

    pub fn execute(&self) -> Result<EvalScore> {
        tracing::info!(
            "Scoring '{}' against '{}'",
            self.candidates.display(),
            self.ground_truth.display()
        );
        self.evaluator.score(&self.ground_truth, &self.candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer::AnswerRecord;
    use crate::infra::answer_file::write_answers;

    #[test]
    fn test_scores_files_on_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let gt   = dir.path().join("gt.json");
        let cand = dir.path().join("results.json");
        write_answers(&gt, &[AnswerRecord::new(7, vec![1], vec!["a".into()])]).unwrap();
        write_answers(&cand, &[AnswerRecord::new(7, vec![2, 1], vec!["b".into()])]).unwrap();

        let score = EvaluateUseCase::new(gt, cand, 100, 10).execute().unwrap();
        assert!(score.song_ndcg > 0.0 && score.song_ndcg < 1.0);
        assert_eq!(score.tag_ndcg, 0.0);
    }

    #[test]
    fn test_missing_candidate_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gt  = dir.path().join("gt.json");
        write_answers(&gt, &[]).unwrap();

        let use_case = EvaluateUseCase::new(gt, dir.path().join("absent.json"), 100, 10);
        assert!(use_case.execute().is_err());
    }
}
