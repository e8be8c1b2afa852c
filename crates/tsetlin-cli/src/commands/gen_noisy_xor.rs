use crate::cli::GenNoisyXorArgs;
use crate::error::Result;
use crate::datasets;

pub fn run(args: GenNoisyXorArgs) -> Result<()> {
    let dataset = datasets::noisy_xor(args.n, args.num_features, args.noise, args.seed);
    datasets::write_csv(&args.out, &dataset)?;
    tracing::info!(rows = args.n, path = %args.out.display(), "wrote Noisy-XOR dataset");
    Ok(())
}
