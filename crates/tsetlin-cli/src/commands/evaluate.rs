use crate::cli::EvaluateArgs;
use crate::error::Result;
use crate::{datasets, state_io};

pub fn run(args: EvaluateArgs) -> Result<()> {
    let dataset = datasets::load_csv(&args.data)?;
    let model = state_io::load(&args.state)?;

    match model {
        state_io::LoadedModel::Classifier(mut clf) => {
            let y_seq: Vec<usize> = dataset
                .y_seq
                .iter()
                .map(|&y| {
                    usize::try_from(y)
                        .map_err(|_| tsetlin_core::TsetlinError::BadLabels(format!("negative label {y}")))
                })
                .collect::<std::result::Result<_, _>>()?;
            let acc = clf.evaluate(&dataset.x_seq, &y_seq)?;
            println!("accuracy: {acc:.4}");
        }
        state_io::LoadedModel::Regressor(mut reg) => {
            let mae = reg.evaluate(&dataset.x_seq, &dataset.y_seq)?;
            println!("mean_absolute_error: {mae:.4}");
        }
    }

    Ok(())
}
