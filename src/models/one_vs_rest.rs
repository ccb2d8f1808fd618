//! Многоклассовая модель "один против всех"

use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::gradient_descent::{logistic, reborrow, GradientDescent, TracingObserver, TrainingObserver};
use super::logistic_regression::LogisticRegression;
use crate::error::{DslrError, Result};
use crate::types::{with_bias, TrainConfig, WeightTable};

/// Обучает по одной бинарной модели на каждый класс.
///
/// Раунды независимы и делят только таблицу признаков на чтение. Каждый
/// раунд получает собственный `StdRng`, зерно которого берется из общего
/// генератора в порядке классов, поэтому `fit` и `fit_parallel` дают
/// одинаковые веса при одном и том же зерне.
pub struct OneVsRest {
    classes: Vec<String>,
    engine: GradientDescent,
    debug: bool,
}

impl OneVsRest {
    pub fn new(classes: Vec<String>, engine: GradientDescent) -> Self {
        Self {
            classes,
            engine,
            debug: false,
        }
    }

    pub fn from_config(classes: Vec<String>, config: &TrainConfig) -> Self {
        Self {
            classes,
            engine: GradientDescent::from_config(config),
            debug: config.debug,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Последовательное обучение. `labels[i]` - индекс класса строки `i`.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        features: &Array2<f64>,
        labels: &[usize],
        rng: &mut R,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<WeightTable> {
        let x = self.design_matrix(features, labels)?;
        let seeds = self.round_seeds(rng);

        let mut columns = Vec::with_capacity(self.classes.len());
        for (class, seed) in seeds.into_iter().enumerate() {
            columns.push(self.train_round(x.view(), labels, class, seed, reborrow(&mut observer))?);
        }

        WeightTable::from_columns(self.classes.clone(), &columns)
    }

    /// То же, что `fit`, но раунды идут на пуле rayon. Ход обучения
    /// пишется в `tracing`, если включен debug.
    pub fn fit_parallel<R: Rng + ?Sized>(
        &self,
        features: &Array2<f64>,
        labels: &[usize],
        rng: &mut R,
    ) -> Result<WeightTable> {
        let x = self.design_matrix(features, labels)?;
        let seeds = self.round_seeds(rng);

        let columns = seeds
            .into_par_iter()
            .enumerate()
            .map(|(class, seed)| {
                let mut tracer = TracingObserver::new(self.classes[class].as_str());
                let observer: Option<&mut dyn TrainingObserver> =
                    if self.debug { Some(&mut tracer) } else { None };
                self.train_round(x.view(), labels, class, seed, observer)
            })
            .collect::<Result<Vec<_>>>()?;

        WeightTable::from_columns(self.classes.clone(), &columns)
    }

    fn design_matrix(&self, features: &Array2<f64>, labels: &[usize]) -> Result<Array2<f64>> {
        if features.nrows() == 0 {
            return Err(DslrError::EmptyInput { operation: "one-vs-rest training" });
        }
        if labels.len() != features.nrows() {
            return Err(DslrError::ShapeMismatch {
                what: "label count",
                expected: features.nrows(),
                found: labels.len(),
            });
        }
        Ok(with_bias(features))
    }

    fn round_seeds<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u64> {
        self.classes.iter().map(|_| rng.gen()).collect()
    }

    fn train_round(
        &self,
        x: ArrayView2<'_, f64>,
        labels: &[usize],
        class: usize,
        seed: u64,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<Array1<f64>> {
        let name = &self.classes[class];
        tracing::debug!(class = %name, method = %self.engine.method, "one-vs-rest round");

        let targets: Array1<f64> = labels
            .iter()
            .map(|&label| if label == class { 1.0 } else { 0.0 })
            .collect();

        if let Some(observer) = observer.as_mut() {
            observer.on_round_start(name, self.engine.method);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = LogisticRegression::new(self.engine.clone());
        model.fit(x, targets.view(), &mut rng, observer)?;
        model.into_weights()
    }
}

impl WeightTable {
    /// Вероятность каждого класса: строки - объекты, колонки - классы
    pub fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(DslrError::ShapeMismatch {
                what: "feature count",
                expected: self.n_features(),
                found: features.ncols(),
            });
        }
        Ok(with_bias(features).dot(&self.weights).mapv(logistic))
    }

    /// Индекс класса с наибольшей вероятностью для каждой строки
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(features)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (j, &p)| if p > best.1 { (j, p) } else { best })
                    .0
            })
            .collect())
    }

    pub fn accuracy(&self, features: &Array2<f64>, labels: &[usize]) -> Result<f64> {
        if labels.len() != features.nrows() {
            return Err(DslrError::ShapeMismatch {
                what: "label count",
                expected: features.nrows(),
                found: labels.len(),
            });
        }
        let predicted = self.predict(features)?;
        let hits = predicted.iter().zip(labels).filter(|(p, l)| p == l).count();
        Ok(hits as f64 / labels.len().max(1) as f64)
    }
}
