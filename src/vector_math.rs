use std::cmp::Ordering;

use crate::errors::ChatError;

pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, ChatError> {
    if query.is_empty() || candidate.is_empty() {
        return Err(ChatError::Parse("vectors must not be empty".to_string()));
    }
    if query.len() != candidate.len() {
        return Err(ChatError::Parse(format!(
            "vector length mismatch: {} != {}",
            query.len(),
            candidate.len()
        )));
    }

    let dot: f32 = query.iter().zip(candidate).map(|(a, b)| a * b).sum();
    let query_norm = l2_norm(query);
    let candidate_norm = l2_norm(candidate);
    let denom = query_norm * candidate_norm;
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }

    Ok(dot / denom)
}

/// Index and score of the candidate most similar to the query, if any
/// candidate is comparable.
pub fn argmax_by_cosine(query: &[f32], candidates: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let Ok(score) = cosine_similarity(query, candidate) else {
            continue;
        };
        let better = match best {
            Some((_, current)) => score.partial_cmp(&current) == Some(Ordering::Greater),
            None => true,
        };
        if better {
            best = Some((idx, score));
        }
    }
    best
}

fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        let score = cosine_similarity(&vec, &vec).expect("cosine should work");
        assert!(approx_eq(score, 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("cosine should work");
        assert!(approx_eq(score, 0.0));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_err());
        assert!(cosine_similarity(&[], &[]).is_err());
    }

    #[test]
    fn argmax_returns_highest_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![0.8, 0.2], vec![0.1, 0.9], vec![0.9, 0.0]];
        let (idx, score) = argmax_by_cosine(&query, &candidates).expect("argmax should work");
        assert_eq!(idx, 2);
        assert!(approx_eq(score, 1.0));
    }

    #[test]
    fn argmax_skips_incomparable_candidates() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![0.5], vec![0.0, 1.0]];
        let (idx, _) = argmax_by_cosine(&query, &candidates).expect("argmax should work");
        assert_eq!(idx, 1);
    }
}
