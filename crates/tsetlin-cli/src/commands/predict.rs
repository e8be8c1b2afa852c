use crate::cli::PredictArgs;
use crate::error::Result;
use crate::{datasets, state_io};

pub fn run(args: PredictArgs) -> Result<()> {
    let x_seq = datasets::load_csv_unlabeled(&args.data)?;
    let model = state_io::load(&args.state)?;

    match model {
        state_io::LoadedModel::Classifier(mut clf) => {
            for x in &x_seq {
                let label = clf.predict(x)?;
                println!("{label}");
            }
        }
        state_io::LoadedModel::Regressor(mut reg) => {
            for x in &x_seq {
                let value = reg.predict(x)?;
                println!("{value}");
            }
        }
    }

    Ok(())
}
