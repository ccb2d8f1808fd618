use std::fmt::Write as _;

use dslr::io::{read_weights, write_weights, RawTable};
use dslr::{
    prepare, DescriptiveReporter, FeatureEngineer, GradientDescent, GradientMethod, House,
    OneVsRest, Progress, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Небольшой датасет в формате школьного CSV: каждый факультет выделяется
/// двумя предметами, остальные колонки - шум или выбрасываемые.
fn school_csv() -> String {
    let mut text = String::from(
        "Index,Hogwarts House,First Name,Last Name,Birthday,Best Hand,Arithmancy,Astronomy,\
         Herbology,Defense Against the Dark Arts,Care of Magical Creatures,Potions\n",
    );
    let centers = [
        (House::Ravenclaw, 2.0, 8.0),
        (House::Slytherin, 8.0, 2.0),
        (House::Gryffindor, 2.0, 2.0),
        (House::Hufflepuff, 8.0, 8.0),
    ];
    let mut index = 0;
    for (house, herbology, defense) in centers {
        for i in 0..12 {
            let jitter = (i % 4) as f64 * 0.3 - 0.45;
            let hand = if i % 2 == 0 { "Left" } else { "Right" };
            // пропуск в каждой шестой строке
            let potions = if i % 6 == 5 {
                String::new()
            } else {
                format!("{}", (index * 5) % 7)
            };
            writeln!(
                text,
                "{},{},First{},Last{},2000-01-{:02},{},{},{},{},{},{},{}",
                index,
                house,
                index,
                index,
                i + 1,
                hand,
                50000 + index * 13,
                (index * 7) % 11,
                herbology + jitter,
                defense - jitter,
                (index % 3) as f64 * 0.1,
                potions,
            )
            .unwrap();
            index += 1;
        }
    }
    text
}

fn training_data() -> (dslr::Dataset, Vec<usize>) {
    let table = RawTable::from_reader(school_csv().as_bytes()).unwrap();
    let (raw, labels) = FeatureEngineer::extract_training_features(&table).unwrap();
    (prepare(raw).unwrap(), labels)
}

#[test]
fn prepared_features_are_complete_and_scaled() {
    let (data, labels) = training_data();

    assert_eq!(
        data.columns,
        vec!["Best Hand", "Herbology", "Defense Against the Dark Arts", "Potions"]
    );
    assert_eq!(data.nrows(), 48);
    assert_eq!(labels.len(), 48);
    assert!(data.features.iter().all(|v| v.is_finite()));
    for column in data.features.columns() {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!((min, max), (0.0, 1.0));
    }
}

#[test]
fn batch_training_separates_houses() {
    let (data, labels) = training_data();
    let config = TrainConfig {
        seed: Some(21),
        n_cycle: 3000,
        ..TrainConfig::default()
    };
    let trainer = OneVsRest::from_config(House::names(), &config);
    let weights = trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(21), None)
        .unwrap();

    // bias + 4 признака, по колонке на факультет
    assert_eq!(weights.weights.dim(), (5, 4));
    assert_eq!(weights.classes, House::names());
    assert!(weights.accuracy(&data.features, &labels).unwrap() >= 0.95);
}

#[test]
fn every_method_produces_finite_weights() {
    let (data, labels) = training_data();
    for method in [GradientMethod::Batch, GradientMethod::MiniBatch, GradientMethod::Sgd] {
        let engine = GradientDescent {
            method,
            n_cycle: 500,
            batch_size: 5,
            ..GradientDescent::default()
        };
        let trainer = OneVsRest::new(House::names(), engine);
        let weights = trainer
            .fit(&data.features, &labels, &mut StdRng::seed_from_u64(4), None)
            .unwrap();
        assert!(weights.weights.iter().all(|w| w.is_finite()), "{}", method);
    }
}

#[test]
fn same_seed_same_model() {
    let (data, labels) = training_data();
    let engine = GradientDescent {
        method: GradientMethod::Sgd,
        ..GradientDescent::default()
    };
    let trainer = OneVsRest::new(House::names(), engine);
    let a = trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(99), None)
        .unwrap();
    let b = trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(99), None)
        .unwrap();
    let c = trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(100), None)
        .unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn debug_observer_reports_loss_and_accuracy() {
    let (data, labels) = training_data();
    let engine = GradientDescent {
        n_cycle: 100,
        ..GradientDescent::default()
    };
    let trainer = OneVsRest::new(House::names(), engine);
    let mut reports: Vec<Progress> = Vec::new();
    let mut observer = |p: &Progress| reports.push(*p);
    trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(1), Some(&mut observer))
        .unwrap();

    // 50 отчетов на каждый из четырех раундов
    assert_eq!(reports.len(), 200);
    assert!(reports.iter().all(|p| (0.0..=1.0).contains(&p.accuracy)));
    assert!(reports.iter().all(|p| p.loss.is_finite() && p.loss >= 0.0));
}

#[test]
fn weights_survive_disk_round_trip() {
    let (data, labels) = training_data();
    let trainer = OneVsRest::new(
        House::names(),
        GradientDescent {
            n_cycle: 200,
            ..GradientDescent::default()
        },
    );
    let weights = trainer
        .fit(&data.features, &labels, &mut StdRng::seed_from_u64(8), None)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datasets").join("weights.csv");
    write_weights(&path, &weights).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with(",Ravenclaw,Slytherin,Gryffindor,Hufflepuff\n0,"));

    let loaded = read_weights(&path).unwrap();
    assert_eq!(loaded, weights);
    assert_eq!(loaded.predict(&data.features).unwrap(), weights.predict(&data.features).unwrap());
}

#[test]
fn describe_reports_numeric_columns() {
    let table = RawTable::from_reader(school_csv().as_bytes()).unwrap();
    let data = FeatureEngineer::extract_numeric_columns(&table).unwrap();
    let summary = DescriptiveReporter::new(true).describe(&data).unwrap();

    assert!(!summary.columns.contains(&"Index".to_string()));
    assert!(!summary.columns.contains(&"Birthday".to_string()));
    assert_eq!(summary.get("count", "Herbology"), Some(48.0));
    assert_eq!(summary.get("count", "Defense Against the Dark Arts"), Some(48.0));
    assert_eq!(summary.get("count", "Potions"), Some(40.0));
    assert_eq!(summary.get("min", "Best Hand"), Some(0.0));
    assert_eq!(summary.get("max", "Best Hand"), Some(1.0));
    assert_eq!(summary.get("mean", "Best Hand"), Some(0.5));

    let text = summary.to_string();
    assert!(text.lines().count() == 14);
    assert!(text.contains("sum of squares"));
}
