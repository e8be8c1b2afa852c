use crate::automaton::AutomatonState;
use crate::clause_output::{calculate_clause_output, calculate_clause_output_with_pruning};
use crate::coin_tosser::ByteCoinTosser;
use crate::config::Config;
use crate::csr::CsrRowBuffer;
use crate::error::{Result, TsetlinError};
use crate::feedback::{sample_regressor_feedback, LossKernel, RegressorFeedback};
use crate::prng::{permutation, FRng, IRng};
use crate::update::{update_clause, update_clauses_parallel};
use crate::vote::regressor_sum;

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

/// Single-output Tsetlin Machine regressor. Targets are reals clipped to
/// `[0, threshold]`; feedback is driven by a loss kernel over the
/// normalized response error rather than the classifier's label-vote
/// comparison (§4.8).
pub struct Regressor {
    config: Config,
    loss: LossKernel,
    automaton: Option<AutomatonState>,
    irng: IRng,
    frng: FRng,
    perm_rng: IRng,
    estimator_seed: u32,
    clause_output: Vec<u8>,
    byte_tosser: Option<ByteCoinTosser>,
}

impl Regressor {
    pub fn new(config: Config, loss: LossKernel) -> Self {
        let seed = resolve_seed(config.random_state);
        Regressor {
            config,
            loss,
            automaton: None,
            irng: IRng::new(seed),
            frng: FRng::new(seed ^ 0xA5A5_A5A5),
            perm_rng: IRng::new(seed ^ 0x5A5A_5A5A),
            estimator_seed: seed,
            clause_output: Vec::new(),
            byte_tosser: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.automaton.is_some()
    }

    pub fn loss_kernel(&self) -> LossKernel {
        self.loss
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

    /// Rebuild an already-trained regressor from a captured [`AutomatonState`]
    /// and PRNG pair (as returned by `EngineState::restore`). See
    /// `Classifier::restore` for the same caveat about `perm_rng` not being
    /// part of the captured state.
    pub fn restore(config: Config, loss: LossKernel, automaton: AutomatonState, irng: IRng, frng: FRng) -> Self {
        let estimator_seed = resolve_seed(config.random_state);
        let c_total = automaton.number_of_clauses();
        let number_of_features = automaton.number_of_features();
        let specificity = config.specificity;
        Regressor {
            config,
            loss,
            automaton: Some(automaton),
            irng,
            frng,
            perm_rng: IRng::new(estimator_seed ^ 0x5A5A_5A5A),
            estimator_seed,
            clause_output: vec![0u8; c_total],
            byte_tosser: Some(ByteCoinTosser::new(number_of_features, specificity)),
        }
    }

    fn ensure_initialized(&mut self, x_seq: &[Vec<u8>]) -> Result<()> {
        if self.automaton.is_some() {
            return Ok(());
        }
        let number_of_features = match self.config.number_of_features {
            Some(f) => f,
            None => x_seq
                .first()
                .map(|x| x.len())
                .ok_or_else(|| TsetlinError::ValueError("X_seq is empty".to_string()))?,
        };
        let c_total = self.config.clauses_per_output;

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

        self.clause_output = vec![0u8; c_total];
        self.byte_tosser = Some(ByteCoinTosser::new(number_of_features, self.config.specificity));
        self.automaton = Some(automaton);
        Ok(())
    }

    fn train_one(&mut self, x: &[u8], target: i64) {
        let automaton = self.automaton.as_mut().expect("initialized");
        let tile_size = self.config.clause_output_tile_size.as_usize();
        calculate_clause_output(automaton, x, &mut self.clause_output, 0, automaton.number_of_clauses(), tile_size);

        let prediction = regressor_sum(automaton, &self.clause_output, self.config.threshold);
        let response_error = (prediction - target).clamp(i32::MIN as i64, i32::MAX as i64);

        let draws = sample_regressor_feedback(
            &mut self.frng,
            &mut self.irng,
            response_error,
            self.config.threshold,
            automaton.number_of_clauses(),
            self.loss,
        );
        if draws.is_empty() {
            return;
        }

        let n_jobs = self.config.n_jobs.resolve();
        if n_jobs > 1 {
            let mut feedback = vec![0i8; automaton.number_of_clauses()];
            for &(clause, kind) in &draws {
                let code = match kind {
                    RegressorFeedback::None => continue,
                    RegressorFeedback::TypeI => crate::feedback::FEEDBACK_TYPE_I,
                    RegressorFeedback::TypeIIIfOutputOne => {
                        if self.clause_output[clause] != 0 {
                            crate::feedback::FEEDBACK_TYPE_II
                        } else {
                            continue;
                        }
                    }
                };
                feedback[clause] = code;
            }
            let base_rng = self.irng.clone();
            update_clauses_parallel(
                automaton,
                x,
                &self.clause_output,
                &feedback,
                self.config.boost_true_positive_feedback,
                self.config.specificity,
                &base_rng,
                self.estimator_seed,
            );
        } else {
            let tosser = self.byte_tosser.as_mut().expect("initialized");
            for &(clause, kind) in &draws {
                let code = match kind {
                    RegressorFeedback::None => continue,
                    RegressorFeedback::TypeI => crate::feedback::FEEDBACK_TYPE_I,
                    RegressorFeedback::TypeIIIfOutputOne => {
                        if self.clause_output[clause] != 0 {
                            crate::feedback::FEEDBACK_TYPE_II
                        } else {
                            continue;
                        }
                    }
                };
                update_clause(
                    automaton,
                    tosser,
                    &mut self.irng,
                    x,
                    clause,
                    self.clause_output[clause],
                    code,
                    self.config.boost_true_positive_feedback,
                );
            }
        }
    }

    pub fn fit(&mut self, x_seq: &[Vec<u8>], y_seq: &[i64], epochs: usize) -> Result<()> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        if x_seq.is_empty() {
            return Err(TsetlinError::ValueError("X_seq is empty".to_string()));
        }
        self.ensure_initialized(x_seq)?;
        self.partial_fit(x_seq, y_seq, epochs)
    }

    pub fn partial_fit(&mut self, x_seq: &[Vec<u8>], y_seq: &[i64], epochs: usize) -> Result<()> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        self.ensure_initialized(x_seq)?;
        let threshold = self.config.threshold;

        for _ in 0..epochs {
            let order = permutation(&mut self.perm_rng, x_seq.len());
            for idx in order {
                let target = y_seq[idx].clamp(0, threshold);
                self.train_one(&x_seq[idx], target);
            }
        }
        Ok(())
    }

    pub fn predict(&mut self, x: &[u8]) -> Result<i64> {
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
        Ok(regressor_sum(automaton, &self.clause_output, self.config.threshold))
    }

    pub fn predict_batch(&mut self, x_seq: &[Vec<u8>]) -> Result<Vec<i64>> {
        x_seq.iter().map(|x| self.predict(x)).collect()
    }

    /// Mean absolute error against clipped targets, since "accuracy" has no
    /// meaning for a real-valued output.
    pub fn evaluate(&mut self, x_seq: &[Vec<u8>], y_seq: &[i64]) -> Result<f64> {
        if x_seq.len() != y_seq.len() {
            return Err(TsetlinError::ValueError(format!(
                "X_seq has {} rows but y_seq has {}",
                x_seq.len(),
                y_seq.len()
            )));
        }
        if x_seq.is_empty() {
            return Err(TsetlinError::ValueError("X_seq is empty".to_string()));
        }
        let threshold = self.config.threshold;
        let mut total_abs_error = 0.0f64;
        for (x, &target) in x_seq.iter().zip(y_seq.iter()) {
            let predicted = self.predict(x)?;
            total_abs_error += (predicted - target.clamp(0, threshold)).unsigned_abs() as f64;
        }
        Ok(total_abs_error / x_seq.len() as f64)
    }

    pub fn fit_csr(
        &mut self,
        indptr: &[usize],
        indices: &[usize],
        num_columns: usize,
        y_seq: &[i64],
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

    fn base_config(threshold: i64) -> Config {
        Config::build(ConfigOptions {
            clauses_per_output: Some(20),
            number_of_states: Some(100),
            threshold: Some(threshold),
            specificity: Some(3.0),
            random_state: Some(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut r = Regressor::new(base_config(10), LossKernel::L1);
        let x = vec![vec![0u8; 5]; 3];
        let y = vec![1i64; 2];
        assert!(r.fit(&x, &y, 1).is_err());
    }

    #[test]
    fn predict_before_fit_is_an_error() {
        let mut r = Regressor::new(base_config(10), LossKernel::L1);
        assert!(r.predict(&vec![0u8; 5]).is_err());
    }

    #[test]
    fn fit_runs_and_predictions_stay_in_range() {
        let mut rng = IRng::new(3);
        let mut x_seq = Vec::new();
        let mut y_seq = Vec::new();
        for _ in 0..200 {
            let x: Vec<u8> = (0..8).map(|_| rng.next(0, 1) as u8).collect();
            let sum: i64 = x.iter().map(|&b| b as i64).sum();
            x_seq.push(x);
            y_seq.push(sum.clamp(0, 8));
        }
        let mut r = Regressor::new(base_config(8), LossKernel::L2);
        r.fit(&x_seq, &y_seq, 10).unwrap();
        for x in &x_seq {
            let p = r.predict(x).unwrap();
            assert!((0..=8).contains(&p));
        }
        let mae = r.evaluate(&x_seq, &y_seq).unwrap();
        assert!(mae >= 0.0);
    }

    #[test]
    fn restore_reproduces_identical_predictions() {
        let mut rng = IRng::new(21);
        let mut x_seq = Vec::new();
        let mut y_seq = Vec::new();
        for _ in 0..60 {
            let x: Vec<u8> = (0..6).map(|_| rng.next(0, 1) as u8).collect();
            let sum: i64 = x.iter().map(|&b| b as i64).sum();
            x_seq.push(x);
            y_seq.push(sum.clamp(0, 6));
        }
        let mut r = Regressor::new(base_config(6), LossKernel::L1);
        r.fit(&x_seq, &y_seq, 2).unwrap();
        let before: Vec<i64> = x_seq.iter().map(|x| r.predict(x).unwrap()).collect();

        let state = crate::state::EngineState::capture(&r.config, r.automaton.as_ref().unwrap(), &r.irng, &r.frng);
        let (config, automaton, irng, frng) = state.restore();
        let mut restored = Regressor::restore(config, r.loss_kernel(), automaton, irng, frng);
        let after: Vec<i64> = x_seq.iter().map(|x| restored.predict(x).unwrap()).collect();

        assert_eq!(before, after);
    }
}
