//! Dataset I/O: a plain CSV loader (one row per example, last column is
//! the label, every other column a 0/1 feature) and the Noisy-XOR
//! generator used by `gen-noisy-xor` and the end-to-end smoke test.

use std::path::Path;

use tsetlin_core::prng::IRng;

use crate::error::Result;

/// `X_seq`/`y_seq` read from a CSV file with no header row.
pub struct Dataset {
    pub x_seq: Vec<Vec<u8>>,
    pub y_seq: Vec<i64>,
}

pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut x_seq = Vec::new();
    let mut y_seq = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let label_field = record
            .iter()
            .last()
            .ok_or_else(|| tsetlin_core::TsetlinError::ValueError(format!("empty row in {}", path.display())))?;
        let label: i64 = label_field
            .trim()
            .parse()
            .map_err(|_| tsetlin_core::TsetlinError::ValueError(format!("non-numeric label {label_field:?}")))?;

        let mut x = Vec::with_capacity(record.len().saturating_sub(1));
        for _ in 0..record.len().saturating_sub(1) {
            let field = fields.next().expect("bounds already checked");
            let bit: u8 = field
                .trim()
                .parse()
                .map_err(|_| tsetlin_core::TsetlinError::ValueError(format!("non-numeric feature {field:?}")))?;
            x.push(bit);
        }
        x_seq.push(x);
        y_seq.push(label);
    }

    Ok(Dataset { x_seq, y_seq })
}

/// Feature-only CSV (no label column), for `predict`.
pub fn load_csv_unlabeled(path: &Path) -> Result<Vec<Vec<u8>>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut x_seq = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut x = Vec::with_capacity(record.len());
        for field in record.iter() {
            let bit: u8 = field
                .trim()
                .parse()
                .map_err(|_| tsetlin_core::TsetlinError::ValueError(format!("non-numeric feature {field:?}")))?;
            x.push(bit);
        }
        x_seq.push(x);
    }
    Ok(x_seq)
}

pub fn write_csv(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    for (x, &y) in dataset.x_seq.iter().zip(dataset.y_seq.iter()) {
        let mut row: Vec<String> = x.iter().map(|b| b.to_string()).collect();
        row.push(y.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Classic two-relevant-bit-plus-noise-features XOR task, with label
/// flips applied at `noise` rate.
pub fn noisy_xor(n: usize, num_features: usize, noise: f64, seed: u32) -> Dataset {
    assert!(num_features >= 2, "Noisy-XOR needs at least the two relevant bits");
    let mut rng = IRng::new(seed);
    let mut x_seq = Vec::with_capacity(n);
    let mut y_seq = Vec::with_capacity(n);

    for _ in 0..n {
        let x: Vec<u8> = (0..num_features).map(|_| rng.next(0, 1) as u8).collect();
        let mut label = (x[0] ^ x[1]) as i64;
        if noise > 0.0 && (rng.next(0, 999) as f64 / 1000.0) < noise {
            label = 1 - label;
        }
        x_seq.push(x);
        y_seq.push(label);
    }

    Dataset { x_seq, y_seq }
}
