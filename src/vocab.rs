
use std::collections::HashMap;

use rand::distributions::WeightedIndex;
use tracing::info;

use crate::error::{Error, Result};

/// Tokens kept for training, indexed by descending frequency.
pub struct Vocab {
    words: Vec<String>,
    counts: Vec<usize>,
    t2i: HashMap<String, usize>,
}

impl Vocab {

    /// Counts every token and keeps those seen at least `min_count` times.
    /// Ties in frequency keep the order in which the tokens were first seen.
    pub fn build(sentences: &[Vec<String>], min_count: usize) -> Result<Vocab> {

        // token -> (count, first position)
        let mut token2count: HashMap<&str, (usize, usize)> = HashMap::new();
        for tok in sentences.iter().flatten() {
            let seen = token2count.len();
            let val = token2count.entry(tok.as_str()).or_insert((0, seen));
            val.0 += 1;
        }

        let mut tup = token2count
            .iter()
            .filter(|(_, (count, _))| *count >= min_count)
            .map(|(tok, (count, first))| (*tok, *count, *first))
            .collect::<Vec<(&str, usize, usize)>>();
        tup.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        info!("using {} tokens seen at least {} times out of {} distinct", tup.len(), min_count, token2count.len());
        if tup.is_empty() {
            return Err(Error::EmptyVocabulary { min_count });
        }

        let words: Vec<String> = tup.iter().map(|(tok, _, _)| tok.to_string()).collect();
        let counts: Vec<usize> = tup.iter().map(|(_, count, _)| *count).collect();
        let t2i = words.iter().enumerate().map(|(i, w)| (w.clone(), i)).collect();

        Ok(Self { words, counts, t2i })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn index(&self, token: &str) -> Option<usize> {
        self.t2i.get(token).copied()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<usize>) {
        (self.words, self.counts)
    }

    /// sum of the counts of the retained tokens
    pub fn total_words(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Maps sentences to token ids, dropping out of vocabulary tokens and sentences left empty.
    pub fn encode(&self, sentences: &[Vec<String>]) -> Vec<Vec<usize>> {
        sentences
            .iter()
            .map(|sentence| sentence.iter().filter_map(|tok| self.index(tok)).collect::<Vec<usize>>())
            .filter(|ids| !ids.is_empty())
            .collect()
    }

    /// Probability of keeping each token when down-sampling frequent words.
    /// A `sample` of zero disables down-sampling.
    pub fn keep_probabilities(&self, sample: f64) -> Vec<f32> {
        if sample <= 0.0 {
            return vec![1.0; self.len()];
        }
        let threshold_count = sample * self.total_words() as f64;
        self.counts
            .iter()
            .map(|&count| {
                let v = count as f64;
                let prob = ((v / threshold_count).sqrt() + 1.0) * (threshold_count / v);
                prob.min(1.0) as f32
            })
            .collect()
    }

    /// Unigram distribution raised to the 3/4 power, used to draw negative samples.
    pub fn noise_distribution(&self) -> Result<WeightedIndex<f64>> {
        WeightedIndex::new(self.counts.iter().map(|&c| (c as f64).powf(0.75)))
            .map_err(|e| Error::InvalidParams(format!("cannot build noise distribution: {}", e)))
    }
}
