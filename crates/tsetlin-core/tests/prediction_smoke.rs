//! Prediction smoke test: a classifier trained on Noisy-XOR must recover the
//! XOR of the first two features on unambiguous feature vectors (features
//! 3..12 fixed, no noise applied to these particular vectors).

use tsetlin_core::config::{Config, ConfigOptions};
use tsetlin_core::prng::IRng;
use tsetlin_core::Classifier;

fn noisy_xor_dataset(n: usize, num_features: usize, noise_rate: f64, seed: u32) -> (Vec<Vec<u8>>, Vec<usize>) {
    let mut rng = IRng::new(seed);
    let mut x_seq = Vec::with_capacity(n);
    let mut y_seq = Vec::with_capacity(n);
    for _ in 0..n {
        let x: Vec<u8> = (0..num_features).map(|_| rng.next(0, 1) as u8).collect();
        let mut label = (x[0] ^ x[1]) as usize;
        if (rng.next(0, 999) as f64 / 1000.0) < noise_rate {
            label = 1 - label;
        }
        x_seq.push(x);
        y_seq.push(label);
    }
    (x_seq, y_seq)
}

#[test]
#[ignore] // trains a full classifier; exercised explicitly, not on every `cargo test`
fn trained_classifier_predicts_xor_on_fixed_vectors() {
    let (train_x, train_y) = noisy_xor_dataset(5000, 12, 0.4, 1);

    let cfg = Config::build(ConfigOptions {
        clauses_per_output: Some(10),
        number_of_states: Some(100),
        threshold: Some(15),
        specificity: Some(3.9),
        boost_true_positive_feedback: Some(false),
        random_state: Some(1),
        ..Default::default()
    })
    .unwrap();

    let mut clf = Classifier::new(cfg);
    clf.fit(&train_x, &train_y, 200).unwrap();

    let v1 = vec![1u8, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0];
    let v2 = vec![0u8, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0];
    let v3 = vec![0u8, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0];
    let v4 = vec![1u8, 1, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0];

    assert_eq!(clf.predict(&v1).unwrap(), 1);
    assert_eq!(clf.predict(&v2).unwrap(), 1);
    assert_eq!(clf.predict(&v3).unwrap(), 0);
    assert_eq!(clf.predict(&v4).unwrap(), 0);
}
