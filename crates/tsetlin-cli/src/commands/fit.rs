use tsetlin_core::{Classifier, Regressor};

use crate::cli::{EstimatorKind, FitArgs};
use crate::error::Result;
use crate::{config_doc, datasets, state_io};

pub fn run(args: FitArgs) -> Result<()> {
    let config = config_doc::load(&args.config)?;
    let dataset = datasets::load_csv(&args.data)?;

    match args.estimator {
        EstimatorKind::Classifier => {
            let y_seq: Vec<usize> = dataset
                .y_seq
                .iter()
                .map(|&y| {
                    usize::try_from(y)
                        .map_err(|_| tsetlin_core::TsetlinError::BadLabels(format!("negative label {y}")))
                })
                .collect::<std::result::Result<_, _>>()?;

            let mut clf = Classifier::new(config);
            clf.fit(&dataset.x_seq, &y_seq, args.epochs)?;
            state_io::save_classifier(&args.out, &clf)?;
            tracing::info!(rows = dataset.x_seq.len(), epochs = args.epochs, "classifier fit complete");
        }
        EstimatorKind::Regressor => {
            let mut reg = Regressor::new(config, tsetlin_core::LossKernel::L1);
            reg.fit(&dataset.x_seq, &dataset.y_seq, args.epochs)?;
            state_io::save_regressor(&args.out, &reg)?;
            tracing::info!(rows = dataset.x_seq.len(), epochs = args.epochs, "regressor fit complete");
        }
    }

    Ok(())
}
