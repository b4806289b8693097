// ============================================================
// Layer 5 — Recommendation Extractor
// ============================================================
// Turns reconstruction scores into ranked identifiers:
//
//   1. pull the (input, scores) tensors back to the host
//   2. per row, drop every column already set in the input
//   3. sort the rest by score, best first (ties: lower id)
//   4. keep the top k and map dense ids → original ids
//
// An empty playlist (all-zero input) excludes nothing, so it
// simply gets the k highest-scoring ids.

use anyhow::Result;
use burn::prelude::*;

use crate::ml::objective::DecodePair;

/// Input values above this count as "already in the playlist".
const PRESENT: f32 = 0.5;

/// Ranked dense ids for one row, excluding present columns.
pub fn rank_row(input: &[f32], scores: &[f32], k: usize) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..scores.len())
        .filter(|&i| input.get(i).map_or(true, |&v| v < PRESENT))
        .collect();

    // total_cmp keeps NaN scores from poisoning the order
    candidates.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    candidates.truncate(k);
    candidates
}

/// Ranked original identifiers for every row of `pair`.
pub fn extract<B: Backend, T: Clone>(pair: DecodePair<B>, lookup: &[T], k: usize) -> Result<Vec<Vec<T>>> {
    let [rows, width] = pair.scores.dims();
    anyhow::ensure!(
        pair.input.dims() == [rows, width],
        "input shape {:?} does not match score shape {:?}",
        pair.input.dims(), [rows, width]
    );
    anyhow::ensure!(
        lookup.len() == width,
        "vocabulary has {} entries but the model scores {} columns",
        lookup.len(), width
    );

    let input  = host_values(pair.input)?;
    let scores = host_values(pair.scores)?;

    let ranked = (0..rows)
        .map(|r| {
            let span = r * width..(r + 1) * width;
            rank_row(&input[span.clone()], &scores[span], k)
                .into_iter()
                .map(|id| lookup[id].clone())
                .collect()
        })
        .collect();
    Ok(ranked)
}

fn host_values<B: Backend>(t: Tensor<B, 2>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor back to host: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    fn tensor(rows: usize, cols: usize, values: Vec<f32>) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(values, [rows, cols]), &Default::default())
    }

    #[test]
    fn test_present_ids_never_recommended() {
        let input  = [1.0, 0.0, 1.0, 0.0, 0.0];
        let scores = [0.99, 0.10, 0.98, 0.50, 0.70];
        let ranked = rank_row(&input, &scores, 5);
        assert_eq!(ranked, vec![4, 3, 1]);
        assert!(ranked.iter().all(|&i| input[i] == 0.0));
    }

    #[test]
    fn test_truncates_to_k() {
        let ranked = rank_row(&[0.0; 4], &[0.1, 0.4, 0.3, 0.2], 2);
        assert_eq!(ranked, vec![1, 2]);
    }

    #[test]
    fn test_ties_broken_by_lower_id() {
        let ranked = rank_row(&[0.0; 3], &[0.5, 0.5, 0.5], 3);
        assert_eq!(ranked, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_playlist_gets_default_ranking() {
        let ranked = rank_row(&[0.0; 3], &[0.2, 0.9, 0.4], 10);
        assert_eq!(ranked, vec![1, 2, 0]);
    }

    #[test]
    fn test_extract_maps_to_original_ids() {
        let pair = DecodePair {
            input:  tensor(2, 3, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            scores: tensor(2, 3, vec![0.9, 0.1, 0.8, 0.3, 0.2, 0.1]),
        };
        let lookup = [500u64, 600, 700];
        let ranked = extract(pair, &lookup, 2).unwrap();
        assert_eq!(ranked, vec![vec![700, 600], vec![500, 600]]);
    }

    #[test]
    fn test_extract_rejects_lookup_width_mismatch() {
        let pair = DecodePair {
            input:  tensor(1, 3, vec![0.0; 3]),
            scores: tensor(1, 3, vec![0.5; 3]),
        };
        let lookup = ["a".to_string(), "b".to_string()];
        assert!(extract(pair, &lookup, 2).is_err());
    }
}
