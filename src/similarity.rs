
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};

use crate::model::Model;

/// Outcome of a nearest neighbour lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup {
    /// `(term, cosine similarity)` pairs, most similar first
    Found(Vec<(String, f32)>),
    /// the token is not in the vocabulary
    NotFound,
}

/// Cosine similarity index over the vectors of a [`Model`].
pub struct Similarity {
    w: Array2<f32>,
    t2i: HashMap<String, usize>,
    i2t: Vec<String>,
}

impl Similarity {

    pub fn new(model: &Model) -> Similarity {

        // normalize w so each row has l2 norm 1, all-zero rows stay zero
        let mut w = model.vectors().to_owned();
        for mut row in w.axis_iter_mut(Axis(0)) {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|a| a / norm);
            }
        }

        let i2t = model.words().to_vec();
        let t2i = i2t.iter().enumerate().map(|(i, t)| (t.to_owned(), i)).collect();

        Self { w, t2i, i2t }
    }

    pub fn len(&self) -> usize {
        self.i2t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2t.is_empty()
    }

    /// unit length vector of `token`
    pub fn extract_vec_from_word(&self, token: &str) -> Option<ArrayView1<'_, f32>> {
        self.t2i.get(token).map(|&i| self.w.row(i))
    }

    /// cosine similarity between two tokens, `None` if either is unknown
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.extract_vec_from_word(a)?;
        let vb = self.extract_vec_from_word(b)?;
        Some(va.dot(&vb))
    }

    /// The `k` tokens closest to `token` by cosine similarity, the token itself excluded.
    /// Equal scores keep vocabulary order, so the more frequent token comes first.
    pub fn most_similar(&self, token: &str, k: usize) -> Lookup {

        let index = match self.t2i.get(token) {
            Some(i) => *i,
            None => return Lookup::NotFound,
        };

        let scores = self.w.dot(&self.w.row(index)); // of size w.0, vocab size
        let mut indexed_scores: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .collect();

        // sort by most similar in descending order
        indexed_scores.sort_by(|(_i, s), (_j, t)| t.total_cmp(s));
        indexed_scores.truncate(k);

        Lookup::Found(
            indexed_scores
                .into_iter()
                .map(|(i, score)| (self.i2t[i].clone(), score))
                .collect(),
        )
    }
}
