use crate::automaton::AutomatonState;
use crate::clause_output::{calculate_clause_output, calculate_clause_output_with_pruning};
use crate::coin_tosser::ByteCoinTosser;
use crate::config::Config;
use crate::csr::CsrRowBuffer;
use crate::error::{Result, TsetlinError};
use crate::feedback::sample_classifier_feedback;
use crate::prng::{permutation, FRng, IRng};
use crate::update::{update_clauses_parallel, update_clauses_sequential};
use crate::vote::{all_label_votes, argmax};

/// Draws a seed from `random_state`, or harvests one from the local clock
/// when absent. Only the absent branch is nondeterministic; everything
/// downstream of a concrete seed is bit-reproducible.
fn resolve_seed(random_state: Option<u32>) -> u32 {
    match random_state {
        Some(s) => s,
        None => {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0x9E3779B9)
        }
    }
}

fn validate_labels(y: &[usize]) -> Result<usize> {
    if y.is_empty() {
        return Err(TsetlinError::BadLabels("y is empty".to_string()));
    }
    let min = *y.iter().min().unwrap();
    if min != 0 {
        return Err(TsetlinError::BadLabels(format!("labels must start at 0, got min {min}")));
    }
    let max = *y.iter().max().unwrap();
    let mut seen = vec![false; max + 1];
    for &label in y {
        seen[label] = true;
    }
    if seen.iter().any(|&s| !s) {
        return Err(TsetlinError::BadLabels(
            "labels must be a contiguous set starting at 0".to_string(),
        ));
    }
    if max == 0 {
        return Err(TsetlinError::BadLabels("only one distinct label present".to_string()));
    }
    Ok(max + 1)
}

/// Multi-class Tsetlin Machine classifier. State (`M`/`P`/`W` and
/// per-example scratch) is allocated lazily on the first `fit`/`partial_fit`
/// call and reused by every call after that (§4.10, §5).
pub struct Classifier {
    config: Config,
    number_of_labels: Option<usize>,
    automaton: Option<AutomatonState>,
    irng: IRng,
    frng: FRng,
    perm_rng: IRng,
    estimator_seed: u32,
    clause_output: Vec<u8>,
    feedback: Vec<i8>,
    byte_tosser: Option<ByteCoinTosser>,
}

impl Classifier {
    pub fn new(config: Config) -> Self {
        let seed = resolve_seed(config.random_state);
        let number_of_labels = config.number_of_labels;
        Classifier {
            config,
            number_of_labels,
            automaton: None,
            irng: IRng::new(seed),
            frng: FRng::new(seed ^ 0xA5A5_A5A5),
            perm_rng: IRng::new(seed ^ 0x5A5A_5A5A),
            estimator_seed: seed,
            clause_output: Vec::new(),
            feedback: Vec::new(),
            byte_tosser: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.automaton.is_some()
    }

    /// Label count this classifier settled on, once initialized (either
    /// from `config.number_of_labels` or inferred from training data).
    pub fn number_of_labels(&self) -> Option<usize> {
        self.number_of_labels
    }

    pub fn automaton(&self) -> Option<&AutomatonState> {
        self.automaton.as_ref()
    }

    pub fn irng(&self) -> &IRng {
        &self.irng
    }

    pub fn frng(&self) -> &FRng {
        &self.frng
    }

    /// Rebuild an already-trained classifier from a captured [`AutomatonState`]
    /// and PRNG pair (as returned by `EngineState::restore`), plus the label
    /// count the original training run settled on — `EngineState` itself
    /// carries no notion of "label", so the caller supplies it back.
    /// `perm_rng` (the epoch-shuffle generator) is not part of `EngineState`
    /// and is reseeded from `config.random_state`; a further `partial_fit`
    /// after restore reshuffles from that seed rather than continuing the
    /// exact permutation sequence the original run was on.
    pub fn restore(
        config: Config,
        number_of_labels: usize,
        automaton: AutomatonState,
        irng: IRng,
        frng: FRng,
    ) -> Self {
        let estimator_seed = resolve_seed(config.random_state);
        let c_total = automaton.number_of_clauses();
        let number_of_features = automaton.number_of_features();
        let specificity = config.specificity;
        Classifier {
            config,
            number_of_labels: Some(number_of_labels),
            automaton: Some(automaton),
            irng,
            frng,
            perm_rng: IRng::new(estimator_seed ^ 0x5A5A_5A5A),
            estimator_seed,
            clause_output: vec![0u8; c_total],
            feedback: vec![0i8; c_total],
            byte_tosser: Some(ByteCoinTosser::new(number_of_features, specificity)),
        }
    }

    fn clauses_per_label(&self) -> usize {
        self.config.clauses_per_output
    }

    fn ensure_initialized(&mut self, x_seq: &[Vec<u8>], y_seq: &[usize]) -> Result<()> {
        if self.automaton.is_some() {
            return Ok(());
        }
        let inferred_labels = validate_labels(y_seq)?;
        let number_of_labels = match self.number_of_labels {
            Some(n) => n,
            None => inferred_labels.max(2),
        };
        if inferred_labels > number_of_labels {
            return Err(TsetlinError::BadLabels(format!(
                "training data has {inferred_labels} labels but number_of_labels is {number_of_labels}"
            )));
        }

        let number_of_features = match self.config.number_of_features {
            Some(f) => f,
            None => x_seq
                .first()
                .map(|x| x.len())
                .ok_or_else(|| TsetlinError::BadLabels("X_seq is empty".to_string()))?,
        };

        let c_total = number_of_labels * self.clauses_per_label();
        let mut init_rng = self.irng.clone();
        let automaton = AutomatonState::new(
            self.config.counting_type.resolve(self.config.number_of_states),
            self.config.number_of_states,
            self.config.max_weight,
            c_total,
            number_of_features,
            true,
            self.config.weighted,
            &mut init_rng,
        );
        self.irng = init_rng;

        self.number_of_labels = Some(number_of_labels);
        self.clause_output = vec![0u8; c_total];
        self.feedback = vec![0i8; c_total];
        self.byte_tosser = Some(ByteCoinTosser::new(number_of_features, self.config.specificity));
        self.automaton = Some(automaton);
        Ok(())
    }

    fn train_one(&mut self, x: &[u8], true_label: usize) {
        let automaton = self.automaton.as_mut().expect("initialized");
        let tile_size = self.config.clause_output_tile_size.as_usize();
        calculate_clause_output(automaton, x, &mut self.clause_output, 0, automaton.number_of_clauses(), tile_size);

        let label_votes = all_label_votes(
            automaton,
            &self.clause_output,
            self.number_of_labels.unwrap(),
            self.clauses_per_label(),
            self.config.threshold,
        );

        sample_classifier_feedback(
            &mut self.frng,
            &mut self.irng,
            &label_votes,
            true_label,
            self.clauses_per_label(),
            self.config.threshold,
            &mut self.feedback,
        );

        let n_jobs = self.config.n_jobs.resolve();
        if n_jobs > 1 {
            let base_rng = self.irng.clone();
            update_clauses_parallel(
                automaton,
                x,
                &self.clause_output,
                &self.feedback,
                self.config.boost_true_positive_feedback,
                self.config.specificity,
                &base_rng,
                self.estimator_seed,
            );
        } else {
            let tosser = self.byte_tosser.as_mut().expect("initialized");
            update_clauses_sequential(
                automaton,
                tosser,
                &mut self.irng,
                x,
                &self.clause_output,
                &self.feedback,
                self.config.boost_true_positive_feedback,
            );
        }
    }

    /// Validate shapes, allocate state on first call, then run `epochs`
    /// permutation-ordered passes over `x_seq`/`y_seq`.
    pub fn fit(&mut self, x_seq: &[Vec<u8>], y_seq: &[usize], epochs: usize) -> Result<()> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        self.ensure_initialized(x_seq, y_seq)?;
        self.partial_fit(x_seq, y_seq, epochs)
    }

    /// Same as `fit`, but assumes state already exists (skips shape
    /// inference and allocation) unless this is in fact the first call.
    pub fn partial_fit(&mut self, x_seq: &[Vec<u8>], y_seq: &[usize], epochs: usize) -> Result<()> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        self.ensure_initialized(x_seq, y_seq)?;

        let number_of_labels = self.number_of_labels.unwrap();
        for &label in y_seq {
            if label >= number_of_labels {
                return Err(TsetlinError::BadLabels(format!(
                    "label {label} out of range for {number_of_labels} labels"
                )));
            }
        }

        for _ in 0..epochs {
            let order = permutation(&mut self.perm_rng, x_seq.len());
            for idx in order {
                self.train_one(&x_seq[idx], y_seq[idx]);
            }
        }
        Ok(())
    }

    pub fn predict_raw(&mut self, x: &[u8]) -> Result<Vec<i64>> {
        let automaton = self
            .automaton
            .as_ref()
            .ok_or_else(|| TsetlinError::ValueError("estimator has not been fit".to_string()))?;
        if x.len() != automaton.number_of_features() {
            return Err(TsetlinError::ValueError(format!(
                "expected {} features, got {}",
                automaton.number_of_features(),
                x.len()
            )));
        }
        let tile_size = self.config.clause_output_tile_size.as_usize();
        calculate_clause_output_with_pruning(automaton, x, &mut self.clause_output, 0, automaton.number_of_clauses(), tile_size);
        Ok(all_label_votes(
            automaton,
            &self.clause_output,
            self.number_of_labels.unwrap(),
            self.clauses_per_label(),
            self.config.threshold,
        ))
    }

    pub fn predict(&mut self, x: &[u8]) -> Result<usize> {
        Ok(argmax(&self.predict_raw(x)?))
    }

    pub fn predict_batch(&mut self, x_seq: &[Vec<u8>]) -> Result<Vec<usize>> {
        x_seq.iter().map(|x| self.predict(x)).collect()
    }

    pub fn evaluate(&mut self, x_seq: &[Vec<u8>], y_seq: &[usize]) -> Result<f64> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        if x_seq.is_empty() {
            return Err(TsetlinError::BadLabels("X_seq is empty".to_string()));
        }
        let mut errors = 0usize;
        for (x, &label) in x_seq.iter().zip(y_seq.iter()) {
            if self.predict(x)? != label {
                errors += 1;
            }
        }
        Ok(1.0 - (errors as f64 / x_seq.len() as f64))
    }

    /// Same training loop as `fit`, but reads each row out of a CSR triple
    /// into the reusable dense scratch buffer rather than requiring the
    /// caller to already hold dense rows (§6 CSR batch interface).
    pub fn fit_csr(
        &mut self,
        indptr: &[usize],
        indices: &[usize],
        num_columns: usize,
        y_seq: &[usize],
        epochs: usize,
    ) -> Result<()> {
        crate::csr::validate_csr_shape(indptr, indices, y_seq.len())?;
        let mut dense_rows = Vec::with_capacity(y_seq.len());
        let mut buf = CsrRowBuffer::new(num_columns);
        for row in 0..y_seq.len() {
            dense_rows.push(buf.fill_row(indptr, indices, row)?.to_vec());
        }
        self.fit(&dense_rows, y_seq, epochs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOptions;

    fn noisy_xor_example(rng: &mut IRng, noise: bool) -> (Vec<u8>, usize) {
        let a = (rng.next(0, 1)) as u8;
        let b = (rng.next(0, 1)) as u8;
        let label = (a ^ b) as usize;
        let mut x = vec![a, b];
        for _ in 0..10 {
            x.push(rng.next(0, 1) as u8);
        }
        let label = if noise && rng.next(0, 9) == 0 { 1 - label } else { label };
        (x, label)
    }

    fn base_config() -> Config {
        Config::build(ConfigOptions {
            clauses_per_output: Some(10),
            number_of_states: Some(100),
            threshold: Some(15),
            specificity: Some(3.9),
            random_state: Some(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut c = Classifier::new(base_config());
        let x = vec![vec![0u8; 12]; 3];
        let y = vec![0usize; 2];
        assert!(c.fit(&x, &y, 1).is_err());
    }

    #[test]
    fn rejects_non_contiguous_labels() {
        let mut c = Classifier::new(base_config());
        let x = vec![vec![0u8; 12]; 3];
        let y = vec![0usize, 2, 0];
        assert!(c.fit(&x, &y, 1).is_err());
    }

    #[test]
    fn rejects_single_label() {
        let mut c = Classifier::new(base_config());
        let x = vec![vec![0u8; 12]; 3];
        let y = vec![0usize, 0, 0];
        assert!(c.fit(&x, &y, 1).is_err());
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let mut c = Classifier::new(base_config());
        assert!(c.predict(&vec![0u8; 12]).is_err());
    }

    #[test]
    fn fit_runs_and_evaluate_is_in_unit_interval() {
        let mut gen_rng = IRng::new(99);
        let mut x_seq = Vec::new();
        let mut y_seq = Vec::new();
        for _ in 0..400 {
            let (x, y) = noisy_xor_example(&mut gen_rng, true);
            x_seq.push(x);
            y_seq.push(y);
        }
        let mut c = Classifier::new(base_config());
        c.fit(&x_seq, &y_seq, 5).unwrap();
        let acc = c.evaluate(&x_seq, &y_seq).unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn partial_fit_does_not_reinitialize_existing_state() {
        let mut gen_rng = IRng::new(7);
        let mut x_seq = Vec::new();
        let mut y_seq = Vec::new();
        for _ in 0..50 {
            let (x, y) = noisy_xor_example(&mut gen_rng, false);
            x_seq.push(x);
            y_seq.push(y);
        }
        let mut c = Classifier::new(base_config());
        c.fit(&x_seq, &y_seq, 1).unwrap();
        let clauses_before = c.automaton.as_ref().unwrap().number_of_clauses();
        c.partial_fit(&x_seq, &y_seq, 1).unwrap();
        let clauses_after = c.automaton.as_ref().unwrap().number_of_clauses();
        assert_eq!(clauses_before, clauses_after);
    }

    #[test]
    fn restore_reproduces_identical_predictions() {
        let mut gen_rng = IRng::new(13);
        let mut x_seq = Vec::new();
        let mut y_seq = Vec::new();
        for _ in 0..80 {
            let (x, y) = noisy_xor_example(&mut gen_rng, false);
            x_seq.push(x);
            y_seq.push(y);
        }
        let mut c = Classifier::new(base_config());
        c.fit(&x_seq, &y_seq, 2).unwrap();
        let before: Vec<usize> = x_seq.iter().map(|x| c.predict(x).unwrap()).collect();

        let state = crate::state::EngineState::capture(&c.config, c.automaton.as_ref().unwrap(), &c.irng, &c.frng);
        let (config, automaton, irng, frng) = state.restore();
        let mut restored = Classifier::restore(config, c.number_of_labels().unwrap(), automaton, irng, frng);
        let after: Vec<usize> = x_seq.iter().map(|x| restored.predict(x).unwrap()).collect();

        assert_eq!(before, after);
    }

    #[test]
    #[ignore] // ~200-epoch training run; exercised explicitly, not on every `cargo test`
    fn noisy_xor_reaches_high_accuracy() {
        let mut gen_rng = IRng::new(1);
        let mut train_x = Vec::new();
        let mut train_y = Vec::new();
        for _ in 0..5000 {
            let (x, y) = noisy_xor_example(&mut gen_rng, true);
            train_x.push(x);
            train_y.push(y);
        }
        let mut test_x = Vec::new();
        let mut test_y = Vec::new();
        for _ in 0..1000 {
            let (x, y) = noisy_xor_example(&mut gen_rng, false);
            test_x.push(x);
            test_y.push(y);
        }

        let mut c = Classifier::new(base_config());
        c.fit(&train_x, &train_y, 200).unwrap();
        let acc = c.evaluate(&test_x, &test_y).unwrap();
        assert!(acc >= 0.9, "accuracy was {acc}");
    }
}
