use serde::{Deserialize, Serialize};

use crate::error::{Result, TsetlinError};

/// Width of the automaton counter, chosen per §3 of the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountingType {
    I8,
    I16,
    I32,
    /// Narrowest signed width that covers `[-number_of_states, number_of_states - 1]`.
    Auto,
}

impl CountingType {
    /// Resolve `Auto` against `number_of_states`; all other variants pass through.
    pub fn resolve(self, number_of_states: i64) -> CountingType {
        match self {
            CountingType::Auto => {
                let lo = -number_of_states;
                let hi = number_of_states - 1;
                if lo >= i8::MIN as i64 && hi <= i8::MAX as i64 {
                    CountingType::I8
                } else if lo >= i16::MIN as i64 && hi <= i16::MAX as i64 {
                    CountingType::I16
                } else {
                    CountingType::I32
                }
            }
            other => other,
        }
    }
}

/// Unroll factor for the clause-output kernel's tiled inner loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileSize {
    T16 = 16,
    T32 = 32,
    T64 = 64,
    T128 = 128,
}

impl TileSize {
    pub fn as_usize(self) -> usize {
        self as usize
    }

    fn from_usize(v: usize) -> Option<TileSize> {
        match v {
            16 => Some(TileSize::T16),
            32 => Some(TileSize::T32),
            64 => Some(TileSize::T64),
            128 => Some(TileSize::T128),
            _ => None,
        }
    }
}

/// Number of worker threads to use, or "all hardware threads".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NJobs {
    Fixed(usize),
    All,
}

impl NJobs {
    pub fn resolve(self) -> usize {
        match self {
            NJobs::Fixed(n) => n,
            NJobs::All => rayon::current_num_threads(),
        }
    }
}

/// Frozen engine configuration. Built once via [`Config::build`], which
/// validates every field, then never mutated again for the estimator's
/// lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub number_of_labels: Option<usize>,
    pub number_of_features: Option<usize>,
    /// Clauses per label (classifier) or per regressor output (regressor).
    /// Must be a positive even number: the set splits evenly into
    /// positive-polarity (even indices) and negative-polarity (odd) halves.
    pub clauses_per_output: usize,
    pub number_of_states: i64,
    pub threshold: i64,
    pub specificity: f64,
    pub boost_true_positive_feedback: bool,
    pub weighted: bool,
    pub max_weight: i64,
    pub counting_type: CountingType,
    pub clause_output_tile_size: TileSize,
    pub n_jobs: NJobs,
    pub random_state: Option<u32>,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_labels: None,
            number_of_features: None,
            clauses_per_output: 20,
            number_of_states: 100,
            threshold: 15,
            specificity: 3.0,
            boost_true_positive_feedback: false,
            weighted: false,
            max_weight: i64::MAX,
            counting_type: CountingType::Auto,
            clause_output_tile_size: TileSize::T32,
            n_jobs: NJobs::Fixed(1),
            random_state: None,
            verbose: false,
        }
    }
}

/// Raw, unvalidated option bundle as it would arrive from an external
/// configuration document (or be built by hand). `tsetlin-cli` is
/// responsible for turning JSON into this shape; [`Config::build`] is
/// responsible for turning this shape into a frozen, validated [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigOptions {
    pub number_of_labels: Option<usize>,
    pub number_of_features: Option<usize>,
    pub clauses_per_output: Option<usize>,
    pub number_of_states: Option<i64>,
    pub threshold: Option<i64>,
    pub specificity: Option<f64>,
    pub boost_true_positive_feedback: Option<bool>,
    pub weighted: Option<bool>,
    pub max_weight: Option<i64>,
    pub counting_type: Option<String>,
    pub clause_output_tile_size: Option<usize>,
    pub n_jobs: Option<i64>,
    pub random_state: Option<u32>,
    pub verbose: Option<bool>,
}

impl Config {
    /// Validate and freeze a raw option bundle. Unknown keys are rejected
    /// one layer up, by the CLI's JSON loader (serde's `deny_unknown_fields`
    /// equivalent); here we only validate ranges.
    pub fn build(opts: ConfigOptions) -> Result<Config> {
        let clauses_per_output = opts.clauses_per_output.unwrap_or(20);
        if clauses_per_output == 0 || clauses_per_output % 2 != 0 {
            return Err(TsetlinError::ValueError(format!(
                "clauses_per_output must be a positive even number, got {clauses_per_output}"
            )));
        }

        let number_of_states = opts.number_of_states.unwrap_or(100);
        if number_of_states < 1 {
            return Err(TsetlinError::ValueError(format!(
                "number_of_states must be >= 1, got {number_of_states}"
            )));
        }

        let threshold = opts.threshold.unwrap_or(15);
        if threshold < 1 {
            return Err(TsetlinError::ValueError(format!(
                "threshold must be >= 1, got {threshold}"
            )));
        }

        let specificity = opts.specificity.unwrap_or(3.0);
        if !specificity.is_finite() || specificity < 1.0 {
            return Err(TsetlinError::ValueError(format!(
                "specificity must be finite and >= 1.0, got {specificity}"
            )));
        }

        let max_weight = opts.max_weight.unwrap_or(i64::MAX);
        if max_weight < 1 {
            return Err(TsetlinError::ValueError(format!(
                "max_weight must be >= 1, got {max_weight}"
            )));
        }

        let counting_type = match opts.counting_type.as_deref() {
            None | Some("auto") => CountingType::Auto,
            Some("int8") => CountingType::I8,
            Some("int16") => CountingType::I16,
            Some("int32") => CountingType::I32,
            Some(other) => {
                return Err(TsetlinError::ValueError(format!(
                    "unrecognized counting_type {other:?}"
                )))
            }
        };

        let clause_output_tile_size = match opts.clause_output_tile_size {
            None => TileSize::T32,
            Some(v) => TileSize::from_usize(v).ok_or_else(|| {
                TsetlinError::ValueError(format!(
                    "clause_output_tile_size must be one of 16, 32, 64, 128, got {v}"
                ))
            })?,
        };

        let n_jobs = match opts.n_jobs {
            None => NJobs::Fixed(1),
            Some(-1) => NJobs::All,
            Some(n) if n >= 1 => NJobs::Fixed(n as usize),
            Some(n) => {
                return Err(TsetlinError::ValueError(format!(
                    "n_jobs must be positive or -1, got {n}"
                )))
            }
        };

        if let Some(n) = opts.number_of_labels {
            if n < 2 {
                return Err(TsetlinError::ValueError(format!(
                    "number_of_labels must be >= 2, got {n}"
                )));
            }
        }
        if let Some(f) = opts.number_of_features {
            if f < 1 {
                return Err(TsetlinError::ValueError(format!(
                    "number_of_features must be >= 1, got {f}"
                )));
            }
        }

        Ok(Config {
            number_of_labels: opts.number_of_labels,
            number_of_features: opts.number_of_features,
            clauses_per_output,
            number_of_states,
            threshold,
            specificity,
            boost_true_positive_feedback: opts.boost_true_positive_feedback.unwrap_or(false),
            weighted: opts.weighted.unwrap_or(false),
            max_weight,
            counting_type,
            clause_output_tile_size,
            n_jobs,
            random_state: opts.random_state,
            verbose: opts.verbose.unwrap_or(false),
        })
    }

    pub fn s_inv(&self) -> f64 {
        1.0 / self.specificity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_clause_count() {
        let opts = ConfigOptions {
            clauses_per_output: Some(11),
            ..Default::default()
        };
        assert!(Config::build(opts).is_err());
    }

    #[test]
    fn accepts_even_clause_count_not_divisible_by_four() {
        let opts = ConfigOptions {
            clauses_per_output: Some(10),
            ..Default::default()
        };
        assert!(Config::build(opts).is_ok());
    }

    #[test]
    fn rejects_bad_tile_size() {
        let opts = ConfigOptions {
            clause_output_tile_size: Some(48),
            ..Default::default()
        };
        assert!(Config::build(opts).is_err());
    }

    #[test]
    fn rejects_nan_specificity() {
        let opts = ConfigOptions {
            specificity: Some(f64::NAN),
            ..Default::default()
        };
        assert!(Config::build(opts).is_err());
    }

    #[test]
    fn accepts_defaults() {
        let cfg = Config::build(ConfigOptions::default()).unwrap();
        assert_eq!(cfg.clauses_per_output, 20);
    }

    #[test]
    fn auto_counting_picks_narrowest_width() {
        assert_eq!(CountingType::Auto.resolve(100), CountingType::I8);
        assert_eq!(CountingType::Auto.resolve(20_000), CountingType::I16);
        assert_eq!(CountingType::Auto.resolve(2_000_000), CountingType::I32);
    }
}
