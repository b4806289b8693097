// ============================================================
// Layer 6 — Arena Evaluator
// ============================================================
// Scores a candidate answer file against the ground truth
// with normalised discounted cumulative gain (nDCG):
//
//   DCG(rec)  = Σ_i [rec_i ∈ gt] / ln(i + 2)
//   IDCG(n)   = Σ_{i<n} 1 / ln(i + 2)
//   nDCG      = DCG / IDCG(min(|gt|, k))
//
// computed separately for songs (k = 100) and tags (k = 10),
// averaged over playlists, and blended:
//
//   score = 0.85 * song_nDCG + 0.15 * tag_nDCG
//
// A playlist whose ground truth is empty contributes 0.
//
// The candidate file must answer exactly the ground-truth
// playlists, with no duplicate ids inside a list and no list
// longer than k.

use anyhow::Result;
use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    path::Path,
};

use crate::domain::answer::{AnswerRecord, EvalScore};
use crate::domain::traits::AnswerScorer;
use crate::infra::answer_file::read_answers;

pub const SONG_WEIGHT: f64 = 0.85;
pub const TAG_WEIGHT:  f64 = 0.15;

pub struct ArenaEvaluator {
    song_k: usize,
    tag_k:  usize,
    idcgs:  Vec<f64>,
}

impl Default for ArenaEvaluator {
    fn default() -> Self {
        Self::new(100, 10)
    }
}

impl ArenaEvaluator {
    pub fn new(song_k: usize, tag_k: usize) -> Self {
        let max_k = song_k.max(tag_k);
        // idcgs[n] = ideal DCG of n hits at the top
        let mut idcgs = Vec::with_capacity(max_k + 1);
        let mut acc = 0.0;
        idcgs.push(acc);
        for i in 0..max_k {
            acc += 1.0 / ((i + 2) as f64).ln();
            idcgs.push(acc);
        }
        Self { song_k, tag_k, idcgs }
    }

    fn ndcg<T: Eq + Hash>(&self, gt: &[T], rec: &[T], k: usize) -> f64 {
        let n = gt.len().min(k);
        if n == 0 {
            return 0.0;
        }
        let truth: HashSet<&T> = gt.iter().collect();
        let dcg: f64 = rec
            .iter()
            .take(k)
            .enumerate()
            .filter(|(_, r)| truth.contains(r))
            .map(|(i, _)| 1.0 / ((i + 2) as f64).ln())
            .sum();
        dcg / self.idcgs[n]
    }

    /// Score in-memory records.
    pub fn evaluate(&self, gt: &[AnswerRecord], rec: &[AnswerRecord]) -> Result<EvalScore> {
        let by_id: HashMap<u64, &AnswerRecord> = rec.iter().map(|r| (r.id, r)).collect();
        anyhow::ensure!(by_id.len() == rec.len(), "candidate answers contain duplicate playlist ids");

        let gt_ids: HashSet<u64> = gt.iter().map(|g| g.id).collect();
        let rec_ids: HashSet<u64> = by_id.keys().copied().collect();
        anyhow::ensure!(
            gt_ids == rec_ids,
            "candidate answers cover {} playlists, ground truth has {} (ids differ)",
            rec_ids.len(), gt_ids.len()
        );

        for r in rec {
            self.validate(r)?;
        }

        if gt.is_empty() {
            return Ok(EvalScore { song_ndcg: 0.0, tag_ndcg: 0.0, score: 0.0 });
        }

        let mut song_sum = 0.0;
        let mut tag_sum  = 0.0;
        for g in gt {
            let r = by_id[&g.id];
            song_sum += self.ndcg(&g.songs, &r.songs, self.song_k);
            tag_sum  += self.ndcg(&g.tags, &r.tags, self.tag_k);
        }

        let n = gt.len() as f64;
        let song_ndcg = song_sum / n;
        let tag_ndcg  = tag_sum / n;
        Ok(EvalScore {
            song_ndcg,
            tag_ndcg,
            score: SONG_WEIGHT * song_ndcg + TAG_WEIGHT * tag_ndcg,
        })
    }

    fn validate(&self, r: &AnswerRecord) -> Result<()> {
        anyhow::ensure!(
            r.songs.len() <= self.song_k && r.tags.len() <= self.tag_k,
            "playlist {} answers {} songs / {} tags (limits {} / {})",
            r.id, r.songs.len(), r.tags.len(), self.song_k, self.tag_k
        );
        anyhow::ensure!(
            r.songs.iter().collect::<HashSet<_>>().len() == r.songs.len(),
            "playlist {} recommends a song twice", r.id
        );
        anyhow::ensure!(
            r.tags.iter().collect::<HashSet<_>>().len() == r.tags.len(),
            "playlist {} recommends a tag twice", r.id
        );
        Ok(())
    }
}

impl AnswerScorer for ArenaEvaluator {
    fn score(&self, ground_truth: &Path, candidates: &Path) -> Result<EvalScore> {
        let gt  = read_answers(ground_truth)?;
        let rec = read_answers(candidates)?;
        self.evaluate(&gt, &rec)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: u64, songs: Vec<u64>, tags: Vec<&str>) -> AnswerRecord {
        AnswerRecord::new(id, songs, tags.into_iter().map(String::from).collect())
    }

    #[test]
    fn test_perfect_answer_scores_one() {
        let gt = vec![rec(1, vec![5, 6], vec!["a"])];
        let s  = ArenaEvaluator::default().evaluate(&gt, &gt).unwrap();
        assert!((s.song_ndcg - 1.0).abs() < 1e-12);
        assert!((s.tag_ndcg - 1.0).abs() < 1e-12);
        assert!((s.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hit_at_second_rank() {
        let gt    = vec![rec(1, vec![5], vec![])];
        let cand  = vec![rec(1, vec![9, 5], vec![])];
        let s     = ArenaEvaluator::default().evaluate(&gt, &cand).unwrap();
        let expected = (1.0 / 3f64.ln()) / (1.0 / 2f64.ln());
        assert!((s.song_ndcg - expected).abs() < 1e-12);
        assert_eq!(s.tag_ndcg, 0.0);
        assert!((s.score - SONG_WEIGHT * expected).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_playlists_rejected() {
        let gt   = vec![rec(1, vec![5], vec![])];
        let cand = vec![rec(2, vec![5], vec![])];
        assert!(ArenaEvaluator::default().evaluate(&gt, &cand).is_err());
    }

    #[test]
    fn test_duplicate_recommendation_rejected() {
        let gt   = vec![rec(1, vec![5], vec![])];
        let cand = vec![rec(1, vec![5, 5], vec![])];
        assert!(ArenaEvaluator::default().evaluate(&gt, &cand).is_err());
    }

    #[test]
    fn test_too_many_tags_rejected() {
        let gt   = vec![rec(1, vec![], vec!["a"])];
        let cand = vec![rec(1, vec![], vec!["a", "b", "c"])];
        assert!(ArenaEvaluator::new(100, 2).evaluate(&gt, &cand).is_err());
    }

    #[test]
    fn test_score_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let gt_path   = dir.path().join("gt.json");
        let cand_path = dir.path().join("cand.json");
        crate::infra::answer_file::write_answers(&gt_path, &[rec(1, vec![1, 2], vec!["x"])]).unwrap();
        crate::infra::answer_file::write_answers(&cand_path, &[rec(1, vec![2, 1], vec!["x"])]).unwrap();

        let s = ArenaEvaluator::default().score(&gt_path, &cand_path).unwrap();
        assert!((s.song_ndcg - 1.0).abs() < 1e-12);
    }
}
