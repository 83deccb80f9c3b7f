
use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;

use ndarray::{Array, Array1, Array2, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::{prelude::*, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::config::{Algorithm, TrainParams};
use crate::error::Result;
use crate::model::Model;
use crate::vocab::Vocab;

// dot products are clamped to this range before the sigmoid
const MAX_EXP: f32 = 6.0;

/// Word2vec trainer, negative sampling for both CBOW and skip-gram.
pub struct Train {
    syn0: Array2<f32>,    // input vectors, the embeddings kept in the model
    syn1neg: Array2<f32>, // output vectors, discarded after training
}

// a run of consecutive sentences trained by one worker
struct Job {
    sentences: Range<usize>,
    word_offset: usize, // words of the epoch that come before this job
}

// what every job of a training run reads
struct Shared<'a> {
    params: &'a TrainParams,
    keep: &'a [f32],
    noise: &'a WeightedIndex<f64>,
}

// row deltas produced by one job, added to the weights once its wave is done
struct JobUpdate {
    input: Vec<(usize, Array1<f32>)>,
    output: Vec<(usize, Array1<f32>)>,
}

// copy on first touch view of a weight matrix, private to one job
struct Rows<'a> {
    base: ArrayView2<'a, f32>,
    touched: HashMap<usize, Array1<f32>>,
}

impl<'a> Rows<'a> {

    fn new(base: ArrayView2<'a, f32>) -> Self {
        Self { base, touched: HashMap::new() }
    }

    fn row(&mut self, i: usize) -> &mut Array1<f32> {
        let base = &self.base;
        self.touched.entry(i).or_insert_with(|| base.row(i).to_owned())
    }

    fn into_deltas(self) -> Vec<(usize, Array1<f32>)> {
        let base = self.base;
        self.touched
            .into_iter()
            .map(|(i, row)| (i, row - &base.row(i)))
            .collect()
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-MAX_EXP, MAX_EXP)).exp())
}

impl Train {

    fn new(vocab_size: usize, embedding_dim: usize, seed: u64) -> Train {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self {
            syn0: Array::random_using((vocab_size, embedding_dim), Uniform::new(-0.5f32, 0.5), &mut rng) / embedding_dim as f32,
            syn1neg: Array2::zeros((vocab_size, embedding_dim)),
        }
    }

    /// Builds the vocabulary of `sentences`, trains the embeddings and packs them into a [`Model`].
    pub fn run(sentences: &[Vec<String>], params: &TrainParams) -> Result<Model> {

        params.validate()?;
        let vocab = Vocab::build(sentences, params.min_count)?;
        let encoded = vocab.encode(sentences);

        let mut trainer = Train::new(vocab.len(), params.vector_size, params.seed);
        trainer.train(&encoded, &vocab, params)?;

        let (words, counts) = vocab.into_parts();
        Model::new(words, counts, trainer.syn0, params.clone())
    }

    // sentences are cut into jobs of at least `batch_words` words, the last one can be smaller
    fn split_jobs(sentences: &[Vec<usize>], batch_words: usize) -> Vec<Job> {

        let mut jobs = Vec::new();
        let mut start = 0;
        let mut in_job = 0;
        let mut word_offset = 0;

        for (i, sentence) in sentences.iter().enumerate() {
            in_job += sentence.len();
            if in_job >= batch_words {
                jobs.push(Job { sentences: start..i + 1, word_offset });
                word_offset += in_job;
                start = i + 1;
                in_job = 0;
            }
        }
        if start < sentences.len() {
            jobs.push(Job { sentences: start..sentences.len(), word_offset });
        }
        jobs
    }

    fn job_seed(seed: u64, epoch: usize, job: usize) -> u64 {
        seed ^ ((epoch as u64) << 32) ^ (job as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn train(&mut self, sentences: &[Vec<usize>], vocab: &Vocab, params: &TrainParams) -> Result<()> {

        let keep = vocab.keep_probabilities(params.sample);
        let noise = vocab.noise_distribution()?;
        let shared = Shared { params, keep: &keep, noise: &noise };

        let jobs = Train::split_jobs(sentences, params.batch_words);
        let epoch_words: usize = sentences.iter().map(Vec::len).sum();
        let total_words = (epoch_words * params.epochs).max(1) as f32;

        let pool = ThreadPoolBuilder::new().num_threads(params.workers).build()?;
        info!("training {} on {} words in {} jobs per epoch, {} workers", params.algorithm, epoch_words, jobs.len(), params.workers);

        for epoch in 0..params.epochs {

            let timer = Instant::now();
            let mut alpha = params.alpha;

            // each wave runs up to `workers` jobs against the same weights, then merges their deltas in job order
            for (wave_i, wave) in jobs.chunks(params.workers).enumerate() {

                let updates: Vec<JobUpdate> = pool.install(|| {
                    wave.par_iter().enumerate().map(|(k, job)| {
                        let job_i = wave_i * params.workers + k;
                        let progress = (epoch * epoch_words + job.word_offset) as f32 / total_words;
                        let job_alpha = (params.alpha - (params.alpha - params.min_alpha) * progress).max(params.min_alpha);
                        let mut rng = ChaCha8Rng::seed_from_u64(Train::job_seed(params.seed, epoch, job_i));
                        self.train_job(&sentences[job.sentences.clone()], job_alpha, &mut rng, &shared)
                    }).collect()
                });

                for update in updates {
                    self.apply(update);
                }

                if let Some(last) = wave.last() {
                    let progress = (epoch * epoch_words + last.word_offset) as f32 / total_words;
                    alpha = (params.alpha - (params.alpha - params.min_alpha) * progress).max(params.min_alpha);
                }
            }

            info!("finished epoch {} / {}, alpha {:.5}, took {:.2?}", epoch + 1, params.epochs, alpha, timer.elapsed());
        }

        Ok(())
    }

    fn apply(&mut self, update: JobUpdate) {
        for (i, delta) in update.input {
            let mut row = self.syn0.row_mut(i);
            row += &delta;
        }
        for (i, delta) in update.output {
            let mut row = self.syn1neg.row_mut(i);
            row += &delta;
        }
    }

    fn train_job(&self, sentences: &[Vec<usize>], alpha: f32, rng: &mut ChaCha8Rng, shared: &Shared) -> JobUpdate {

        let params = shared.params;
        let window = params.window;
        let dim = params.vector_size;

        let mut syn0 = Rows::new(self.syn0.view());
        let mut syn1 = Rows::new(self.syn1neg.view());
        let mut neu1e: Array1<f32> = Array1::zeros(dim);
        let mut trained = 0;

        for sentence in sentences {

            // down-sample frequent words before the windows are taken
            let kept = sentence
                .iter()
                .copied()
                .filter(|&w| rng.gen::<f32>() < shared.keep[w])
                .collect::<Vec<usize>>();

            for (pos, &word) in kept.iter().enumerate() {

                // effective window between 1 and `window`
                let reach = window - rng.gen_range(0..window);
                let start = pos.saturating_sub(reach);
                let end = (pos + reach + 1).min(kept.len());
                let context = (start..end).filter(|&c| c != pos).map(|c| kept[c]).collect::<Vec<usize>>();
                if context.is_empty() {
                    continue;
                }

                match params.algorithm {
                    Algorithm::SkipGram => {
                        for &ctx in &context {
                            let l1 = syn0.row(ctx).clone();
                            neu1e.fill(0.0);
                            Train::negative_step(&mut syn1, &l1, word, &mut neu1e, alpha, rng, shared);
                            syn0.row(ctx).scaled_add(1.0, &neu1e);
                        }
                    }
                    Algorithm::Cbow => {
                        let mut l1: Array1<f32> = Array1::zeros(dim);
                        for &ctx in &context {
                            l1 += &*syn0.row(ctx);
                        }
                        l1 /= context.len() as f32;
                        neu1e.fill(0.0);
                        Train::negative_step(&mut syn1, &l1, word, &mut neu1e, alpha, rng, shared);
                        for &ctx in &context {
                            syn0.row(ctx).scaled_add(1.0, &neu1e);
                        }
                    }
                }
            }
            trained += kept.len();
        }

        debug!("job of {} sentences trained {} words, alpha {:.5}", sentences.len(), trained, alpha);

        JobUpdate {
            input: syn0.into_deltas(),
            output: syn1.into_deltas(),
        }
    }

    // one positive target plus `negative` noise words, the input gradient is accumulated into `neu1e`
    fn negative_step(
        syn1: &mut Rows,
        l1: &Array1<f32>,
        target: usize,
        neu1e: &mut Array1<f32>,
        alpha: f32,
        rng: &mut ChaCha8Rng,
        shared: &Shared,
    ) {
        for d in 0..=shared.params.negative {
            let (word, label) = if d == 0 {
                (target, 1.0)
            } else {
                let noise_word = shared.noise.sample(rng);
                if noise_word == target {
                    continue;
                }
                (noise_word, 0.0)
            };

            let out = syn1.row(word);
            let f = sigmoid(l1.dot(&*out));
            let g = (label - f) * alpha;
            neu1e.scaled_add(g, &*out);
            out.scaled_add(g, l1);
        }
    }
}


#[cfg(test)]
mod tests {

    use super::{sigmoid, Train};
    use crate::config::{Algorithm, TrainParams};
    use crate::error::Error;
    use crate::similarity::Similarity;

    // two topics that never share a sentence
    fn topic_corpus() -> Vec<Vec<String>> {
        let animals = ["cat", "dog", "pet", "fur"];
        let vehicles = ["car", "truck", "road", "wheel"];
        let mut sentences = Vec::new();
        for i in 0..200 {
            for topic in [&animals, &vehicles] {
                let sentence = (0..topic.len()).map(|j| topic[(i + j) % topic.len()].to_string()).collect();
                sentences.push(sentence);
            }
        }
        sentences
    }

    fn small_params(algorithm: Algorithm) -> TrainParams {
        TrainParams {
            vector_size: 16,
            window: 3,
            epochs: 15,
            algorithm,
            sample: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn sigmoid_is_clamped() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert_eq!(sigmoid(100.0), sigmoid(6.0));
        assert!(sigmoid(-100.0) > 0.0);
    }

    #[test]
    fn jobs_cover_every_sentence() {
        let sentences: Vec<Vec<usize>> = vec![vec![0; 4], vec![1; 3], vec![2; 5], vec![3; 1], vec![4; 2]];
        let jobs = Train::split_jobs(&sentences, 6);
        let ranges: Vec<_> = jobs.iter().map(|j| j.sentences.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..4, 4..5]);
        let offsets: Vec<_> = jobs.iter().map(|j| j.word_offset).collect();
        assert_eq!(offsets, vec![0, 7, 13]);
    }

    #[test]
    fn training_is_deterministic() {
        // small jobs so that every epoch runs a full parallel wave
        let corpus = topic_corpus();
        let params = TrainParams { batch_words: 200, ..small_params(Algorithm::SkipGram) };
        let first = Train::run(&corpus, &params).unwrap();
        let second = Train::run(&corpus, &params).unwrap();
        assert_eq!(first.vectors(), second.vectors());
        assert_eq!(first.words(), second.words());
        assert_eq!(first.vectors().dim(), (8, 16));
    }

    #[test]
    fn topics_are_separated() {
        let corpus = topic_corpus();
        for algorithm in [Algorithm::Cbow, Algorithm::SkipGram] {
            let model = Train::run(&corpus, &small_params(algorithm)).unwrap();
            let similarity = Similarity::new(&model);

            let same = similarity.similarity("cat", "dog").unwrap();
            let other = similarity.similarity("cat", "road").unwrap();
            assert!(same > other, "{}: cat~dog {} <= cat~road {}", algorithm, same, other);
        }
    }

    #[test]
    fn rare_tokens_leave_nothing_to_train() {
        let corpus = vec![vec!["lonely".to_string(), "words".to_string()]];
        let params = small_params(Algorithm::Cbow);
        assert!(matches!(Train::run(&corpus, &params), Err(Error::EmptyVocabulary { .. })));
    }
}
