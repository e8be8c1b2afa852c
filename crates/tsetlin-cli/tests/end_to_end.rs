//! Black-box end-to-end test driving the compiled `tsetlin` binary, since
//! this crate has no library target to unit-test against directly.

use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tsetlin"))
}

#[test]
fn gen_fit_predict_evaluate_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_path = dir.path().join("xor.csv");
    let config_path = dir.path().join("config.json");
    let state_path = dir.path().join("state.json");
    let features_path = dir.path().join("features.csv");

    let status = bin()
        .args([
            "gen-noisy-xor",
            "--out",
            data_path.to_str().unwrap(),
            "--n",
            "300",
            "--num-features",
            "8",
            "--noise",
            "0.0",
            "--seed",
            "1",
        ])
        .status()
        .expect("run gen-noisy-xor");
    assert!(status.success());

    std::fs::write(
        &config_path,
        r#"{"clauses_per_output": 12, "number_of_states": 60, "threshold": 10, "specificity": 3.0, "random_state": 7}"#,
    )
    .unwrap();

    let status = bin()
        .args([
            "fit",
            "--config",
            config_path.to_str().unwrap(),
            "--data",
            data_path.to_str().unwrap(),
            "--epochs",
            "5",
            "--out",
            state_path.to_str().unwrap(),
        ])
        .status()
        .expect("run fit");
    assert!(status.success());
    assert!(state_path.exists());

    let csv_data = std::fs::read_to_string(&data_path).unwrap();
    let feature_rows: Vec<String> = csv_data
        .lines()
        .take(10)
        .map(|line| {
            let mut fields: Vec<&str> = line.split(',').collect();
            fields.pop();
            fields.join(",")
        })
        .collect();
    std::fs::write(&features_path, feature_rows.join("\n")).unwrap();

    let predict_out = bin()
        .args([
            "predict",
            "--state",
            state_path.to_str().unwrap(),
            "--data",
            features_path.to_str().unwrap(),
        ])
        .output()
        .expect("run predict");
    assert!(predict_out.status.success());
    let predicted_lines = String::from_utf8(predict_out.stdout).unwrap();
    assert_eq!(predicted_lines.lines().count(), 10);

    let status = bin()
        .args([
            "evaluate",
            "--state",
            state_path.to_str().unwrap(),
            "--data",
            data_path.to_str().unwrap(),
        ])
        .status()
        .expect("run evaluate");
    assert!(status.success());
}

#[test]
fn fit_rejects_malformed_config_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_path = dir.path().join("xor.csv");
    let config_path = dir.path().join("config.json");
    let state_path = dir.path().join("state.json");

    bin()
        .args([
            "gen-noisy-xor",
            "--out",
            data_path.to_str().unwrap(),
            "--n",
            "20",
        ])
        .status()
        .expect("run gen-noisy-xor");

    std::fs::write(&config_path, "{ not valid json").unwrap();

    let status = bin()
        .args([
            "fit",
            "--config",
            config_path.to_str().unwrap(),
            "--data",
            data_path.to_str().unwrap(),
            "--out",
            state_path.to_str().unwrap(),
        ])
        .status()
        .expect("run fit");
    assert!(!status.success());
}
