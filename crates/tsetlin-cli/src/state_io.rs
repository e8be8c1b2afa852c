//! Persists a trained estimator to JSON and restores it later. `EngineState`
//! alone does not know whether it backs a `Classifier` or a `Regressor`, or
//! (for the classifier) how many labels it was trained on — this module's
//! `SavedModel` wrapper carries that extra bit of bookkeeping alongside it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tsetlin_core::feedback::LossKernel;
use tsetlin_core::{Classifier, EngineState, Regressor};

use crate::error::Result;

/// JSON-safe stand-in for `LossKernel`, whose core definition intentionally
/// carries no `serde` impls since it is a training-time-only choice, not
/// part of the engine's persisted state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LossKernelDoc {
    L1,
    L2,
    BerHu { c1: f64 },
    ConvexMix { c1: f64 },
}

impl From<LossKernelDoc> for LossKernel {
    fn from(doc: LossKernelDoc) -> LossKernel {
        match doc {
            LossKernelDoc::L1 => LossKernel::L1,
            LossKernelDoc::L2 => LossKernel::L2,
            LossKernelDoc::BerHu { c1 } => LossKernel::BerHu(c1),
            LossKernelDoc::ConvexMix { c1 } => LossKernel::ConvexMix(c1),
        }
    }
}

impl From<LossKernel> for LossKernelDoc {
    fn from(loss: LossKernel) -> LossKernelDoc {
        match loss {
            LossKernel::L1 => LossKernelDoc::L1,
            LossKernel::L2 => LossKernelDoc::L2,
            LossKernel::BerHu(c1) => LossKernelDoc::BerHu { c1 },
            LossKernel::ConvexMix(c1) => LossKernelDoc::ConvexMix { c1 },
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "estimator")]
pub enum SavedModel {
    Classifier { number_of_labels: usize, engine: EngineState },
    Regressor { loss: LossKernelDoc, engine: EngineState },
}

pub fn save_classifier(path: &Path, clf: &Classifier) -> Result<()> {
    let automaton = clf
        .automaton()
        .ok_or_else(|| tsetlin_core::TsetlinError::ValueError("classifier has not been fit".to_string()))?;
    let engine = EngineState::capture(clf.config(), automaton, clf.irng(), clf.frng());
    let saved = SavedModel::Classifier {
        number_of_labels: clf.number_of_labels().expect("checked above"),
        engine,
    };
    write_json(path, &saved)
}

pub fn save_regressor(path: &Path, reg: &Regressor) -> Result<()> {
    let automaton = reg
        .automaton()
        .ok_or_else(|| tsetlin_core::TsetlinError::ValueError("regressor has not been fit".to_string()))?;
    let engine = EngineState::capture(reg.config(), automaton, reg.irng(), reg.frng());
    let saved = SavedModel::Regressor {
        loss: reg.loss_kernel().into(),
        engine,
    };
    write_json(path, &saved)
}

pub enum LoadedModel {
    Classifier(Classifier),
    Regressor(Regressor),
}

pub fn load(path: &Path) -> Result<LoadedModel> {
    let text = std::fs::read_to_string(path)?;
    let saved: SavedModel =
        serde_json::from_str(&text).map_err(|e| tsetlin_core::TsetlinError::BadJson(format!("{}: {e}", path.display())))?;

    Ok(match saved {
        SavedModel::Classifier { number_of_labels, engine } => {
            let (config, automaton, irng, frng) = engine.restore();
            LoadedModel::Classifier(Classifier::restore(config, number_of_labels, automaton, irng, frng))
        }
        SavedModel::Regressor { loss, engine } => {
            let (config, automaton, irng, frng) = engine.restore();
            LoadedModel::Regressor(Regressor::restore(config, loss.into(), automaton, irng, frng))
        }
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}
