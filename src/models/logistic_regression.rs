//! Бинарная логистическая регрессия

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::Rng;

use super::gradient_descent::{sigmoid, GradientDescent, TrainingObserver};
use crate::error::{DslrError, Result};

/// Начальная инициализация весов равномерно в [-0.1, 0.1)
pub fn init_weights<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Array1<f64> {
    Array1::from_shape_fn(len, |_| rng.gen_range(-0.1..0.1))
}

/// Одна модель "класс против остальных". Вектор весов включает bias
/// первым элементом и принадлежит только этой модели.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    engine: GradientDescent,
    weights: Option<Array1<f64>>,
}

impl LogisticRegression {
    pub fn new(engine: GradientDescent) -> Self {
        Self {
            engine,
            weights: None,
        }
    }

    pub fn with_weights(engine: GradientDescent, weights: Array1<f64>) -> Self {
        Self {
            engine,
            weights: Some(weights),
        }
    }

    /// `x` уже содержит колонку единиц. Если веса не заданы, они
    /// инициализируются из `rng`.
    pub fn fit<R: Rng + ?Sized>(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        rng: &mut R,
        observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<()> {
        let mut weights = match self.weights.take() {
            Some(w) => w,
            None => init_weights(x.ncols(), rng),
        };
        let outcome = self.engine.run(x, y, &mut weights, rng, observer);
        self.weights = Some(weights);
        outcome
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn into_weights(self) -> Result<Array1<f64>> {
        self.weights.ok_or(DslrError::NotFitted)
    }

    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(DslrError::NotFitted)?;
        if weights.len() != x.ncols() {
            return Err(DslrError::ShapeMismatch {
                what: "feature count",
                expected: weights.len(),
                found: x.ncols(),
            });
        }
        Ok(sigmoid(x, weights.view()))
    }
}
