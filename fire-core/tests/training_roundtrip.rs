//! End-to-end training tests: CSV → artifact on disk → prediction

use fire_core::layout::FEATURE_COUNT;
use fire_core::model::ForestParams;
use fire_core::training::{train, RawDataset, TrainingConfig};
use fire_core::{ModelArtifact, Predictor, ValidationMode};
use serde_json::json;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Synthetic dataset with the real column set: hot, dry, windy rows burn
fn synthetic_csv(rows: usize) -> String {
    let mut csv = String::from("X,Y,month,day,FFMC,DMC,DC,ISI,temp,RH,wind,rain,area\n");
    for i in 0..rows {
        let temp = 4.0 + (i * 13 % 300) as f64 / 10.0;
        let rh = 15.0 + (i * 29 % 80) as f64;
        let wind = 0.5 + (i * 7 % 90) as f64 / 10.0;
        let ffmc = 80.0 + (i * 11 % 150) as f64 / 10.0;
        let burns = temp > 20.0 && rh < 45.0;
        let area = if burns { 1.0 + (i % 9) as f64 } else { 0.0 };
        csv.push_str(&format!(
            "{},{},{},{},{:.1},{:.1},{:.1},{:.1},{:.1},{:.0},{:.1},{:.1},{:.2}\n",
            i % 9 + 1,
            i % 8 + 2,
            MONTHS[i % 12],
            DAYS[i % 7],
            ffmc,
            20.0 + (i % 50) as f64,
            100.0 + (i * 17 % 600) as f64,
            (i % 15) as f64,
            temp,
            rh,
            wind,
            if i % 10 == 0 { 0.2 } else { 0.0 },
            area,
        ));
    }
    csv
}

fn config() -> TrainingConfig {
    TrainingConfig {
        forest: ForestParams {
            n_trees: 25,
            ..ForestParams::default()
        },
        ..TrainingConfig::default()
    }
}

fn example_request() -> serde_json::Value {
    json!({
        "FFMC": 85.6, "DMC": 26.2, "DC": 94.3, "ISI": 5.1,
        "temp": 32.0, "RH": 25.0, "wind": 15.0, "rain": 0.2,
        "month": 8, "day": 6
    })
}

#[test]
fn training_is_deterministic() {
    let dataset = RawDataset::from_reader(synthetic_csv(300).as_bytes(), "synthetic").unwrap();

    let first = train(&dataset, &config()).unwrap();
    let second = train(&dataset, &config()).unwrap();

    assert_eq!(first.artifact.forest, second.artifact.forest);
    assert_eq!(first.artifact.checksum, second.artifact.checksum);

    let a = Predictor::from_artifact(first.artifact, ValidationMode::Lenient)
        .predict_value(Some(&example_request()))
        .unwrap();
    let b = Predictor::from_artifact(second.artifact, ValidationMode::Lenient)
        .predict_value(Some(&example_request()))
        .unwrap();
    assert_eq!(a, b);
    assert!((0.0..=1.0).contains(&a.risk_score));
}

#[test]
fn artifact_roundtrip_is_bit_identical() {
    let dataset = RawDataset::from_reader(synthetic_csv(200).as_bytes(), "synthetic").unwrap();
    let outcome = train(&dataset, &config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    outcome.artifact.save(&path).unwrap();
    let loaded = ModelArtifact::load(&path).unwrap();

    assert_eq!(loaded, outcome.artifact);

    let encoded = dataset.encode();
    for row in encoded.rows.iter().take(50) {
        let before = outcome.artifact.predict_proba(row).unwrap();
        let after = loaded.predict_proba(row).unwrap();
        assert_eq!(before.to_bits(), after.to_bits());
    }
}

#[test]
fn trained_model_separates_obvious_cases() {
    let dataset = RawDataset::from_reader(synthetic_csv(400).as_bytes(), "synthetic").unwrap();
    let artifact = train(&dataset, &config()).unwrap().artifact;

    let mut hot = [0.0; FEATURE_COUNT];
    hot[0] = 92.0; // FFMC
    hot[4] = 31.0; // temp
    hot[5] = 22.0; // RH
    hot[6] = 5.0; // wind
    let mut cold = hot;
    cold[4] = 6.0;
    cold[5] = 85.0;

    let p_hot = artifact.predict_proba(&hot.into()).unwrap();
    let p_cold = artifact.predict_proba(&cold.into()).unwrap();
    assert!(p_hot > p_cold, "hot={p_hot} cold={p_cold}");
    assert!(p_cold < 0.4, "cold={p_cold}");
}

#[test]
fn month_labels_resolve_through_persisted_encoder() {
    let dataset = RawDataset::from_reader(synthetic_csv(120).as_bytes(), "synthetic").unwrap();
    let artifact = train(&dataset, &config()).unwrap().artifact;

    // sorted labels: apr aug dec feb jan jul jun mar may nov oct sep
    assert_eq!(artifact.encoders.month.encode("aug"), Some(1));
    assert_eq!(artifact.encoders.day.encode("fri"), Some(0));

    let predictor = Predictor::from_artifact(artifact, ValidationMode::Lenient);
    let mut by_label = example_request();
    by_label["month"] = json!("aug");
    by_label["day"] = json!("fri");
    let mut by_index = example_request();
    by_index["month"] = json!(1);
    by_index["day"] = json!(0);

    assert_eq!(
        predictor.predict_value(Some(&by_label)).unwrap(),
        predictor.predict_value(Some(&by_index)).unwrap()
    );
}
