//! Градиентный спуск для бинарной логистической регрессии
//!
//! Три стратегии: `batch` (вся матрица на каждом шаге), `mini_batch`
//! (последовательные куски фиксированного размера с переходом в начало)
//! и `sgd` (одна строка за шаг после совместного перемешивания).
//! Ни одна стратегия не проверяет сходимость - число шагов фиксировано.

use std::ops::Range;

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{DslrError, Result};
use crate::types::{GradientMethod, TrainConfig};

/// Логистическая функция без ограничения снизу и сверху
pub fn logistic(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// `1 / (1 + e^(-X·w))` построчно
pub fn sigmoid(x: ArrayView2<'_, f64>, w: ArrayView1<'_, f64>) -> Array1<f64> {
    x.dot(&w).mapv(logistic)
}

/// `Xᵗ · (sigmoid(w, X) - y) / n`
pub fn gradient(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>, w: ArrayView1<'_, f64>) -> Array1<f64> {
    let residual = sigmoid(x, w) - &y;
    x.t().dot(&residual) / x.nrows() as f64
}

/// Один шаг `w <- w - alpha * gradient`
pub fn update(w: &mut Array1<f64>, gradient: &Array1<f64>, alpha: f64) {
    w.scaled_add(-alpha, gradient);
}

/// Кросс-энтропия. При насыщении сигмоиды возвращает не конечное значение.
pub fn loss(predicted: ArrayView1<'_, f64>, expected: ArrayView1<'_, f64>) -> f64 {
    let total: f64 = predicted
        .iter()
        .zip(expected.iter())
        .map(|(&p, &y)| y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        .sum();
    -total / predicted.len() as f64
}

/// Доля совпадений при пороге 0.5
pub fn accuracy(predicted: ArrayView1<'_, f64>, expected: ArrayView1<'_, f64>) -> f64 {
    let hits = predicted
        .iter()
        .zip(expected.iter())
        .filter(|&(&p, &y)| {
            let label = if p > 0.5 { 1.0 } else { 0.0 };
            label == y
        })
        .count();
    hits as f64 / predicted.len() as f64
}

/// Состояние обучения, которое видит наблюдатель
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub loss: f64,
    pub accuracy: f64,
}

/// Наблюдатель за обучением. Только читает состояние, траекторию не меняет.
pub trait TrainingObserver {
    fn on_round_start(&mut self, _class: &str, _method: GradientMethod) {}

    fn on_progress(&mut self, progress: &Progress);

    fn on_finish(&mut self, _weights: &Array1<f64>) {}
}

impl<F: FnMut(&Progress)> TrainingObserver for F {
    fn on_progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Пишет ход обучения в `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver {
    class: String,
}

impl TracingObserver {
    pub fn new(class: impl Into<String>) -> Self {
        Self { class: class.into() }
    }
}

impl TrainingObserver for TracingObserver {
    fn on_round_start(&mut self, class: &str, method: GradientMethod) {
        self.class = class.to_string();
        tracing::info!("Training \"{} against all\" model with {} method", class, method);
    }

    fn on_progress(&mut self, progress: &Progress) {
        tracing::info!(
            class = %self.class,
            "Iteration {}: Loss: {:.6} - Current Accuracy: {:.4}",
            progress.iteration,
            progress.loss,
            progress.accuracy
        );
    }

    fn on_finish(&mut self, weights: &Array1<f64>) {
        tracing::info!(class = %self.class, "Weights: {}", weights);
    }
}

/// Заимствует наблюдателя на один вызов, оставляя `Option` за вызывающим
pub(crate) fn reborrow<'s>(
    observer: &'s mut Option<&mut dyn TrainingObserver>,
) -> Option<&'s mut dyn TrainingObserver> {
    observer.as_mut().map(|o| &mut **o as &mut dyn TrainingObserver)
}

fn report(
    observer: Option<&mut dyn TrainingObserver>,
    iteration: usize,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    w: &Array1<f64>,
) {
    let Some(observer) = observer else {
        return;
    };
    let predicted = sigmoid(x, w.view());
    let progress = Progress {
        iteration,
        loss: loss(predicted.view(), y),
        accuracy: accuracy(predicted.view(), y),
    };
    if !progress.loss.is_finite() {
        tracing::warn!(iteration, "loss is not finite, sigmoid saturated");
    }
    observer.on_progress(&progress);
}

/// Кусок данных, выданный `MiniBatches`
#[derive(Debug, Clone)]
pub struct MiniBatch<'a> {
    pub features: ArrayView2<'a, f64>,
    pub targets: ArrayView1<'a, f64>,
    pub rows: Range<usize>,
    /// Сколько строк выдано с начала, включая этот кусок
    pub offset: usize,
}

/// Бесконечный итератор по последовательным кускам матрицы.
///
/// После последнего (возможно неполного) куска начинает сначала.
/// Останавливать перебор должен вызывающий код по `offset`.
#[derive(Debug, Clone)]
pub struct MiniBatches<'a> {
    features: ArrayView2<'a, f64>,
    targets: ArrayView1<'a, f64>,
    size: usize,
    start: usize,
    pass: usize,
}

impl<'a> MiniBatches<'a> {
    pub fn new(features: ArrayView2<'a, f64>, targets: ArrayView1<'a, f64>, size: usize) -> Self {
        Self {
            features,
            targets,
            size: size.max(1),
            start: 0,
            pass: 0,
        }
    }

    /// Кусков в одном полном проходе
    pub fn chunks_per_pass(&self) -> usize {
        (self.features.nrows() + self.size - 1) / self.size
    }
}

impl<'a> Iterator for MiniBatches<'a> {
    type Item = MiniBatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.features.nrows();
        if n == 0 {
            return None;
        }

        let end = (self.start + self.size).min(n);
        let batch = MiniBatch {
            features: self.features.clone().slice_move(s![self.start..end, ..]),
            targets: self.targets.clone().slice_move(s![self.start..end]),
            rows: self.start..end,
            offset: self.pass * n + end,
        };

        if end == n {
            self.start = 0;
            self.pass += 1;
        } else {
            self.start = end;
        }

        Some(batch)
    }
}

/// Совместно перемешивает строки признаков и меток
pub fn shuffle_rows<R: Rng + ?Sized>(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    rng: &mut R,
) -> (Array2<f64>, Array1<f64>) {
    let mut order: Vec<usize> = (0..x.nrows()).collect();
    order.shuffle(rng);
    (x.select(Axis(0), &order), y.select(Axis(0), &order))
}

/// Параметры спуска
#[derive(Debug, Clone, PartialEq)]
pub struct GradientDescent {
    pub method: GradientMethod,
    pub alpha: f64,
    pub n_cycle: usize,
    pub batch_size: usize,
    /// mini-batch останавливается, когда offset превышает `rows * mini_batch_epochs`
    pub mini_batch_epochs: usize,
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self::from_config(&TrainConfig::default())
    }
}

impl GradientDescent {
    pub fn from_config(config: &TrainConfig) -> Self {
        Self {
            method: config.method,
            alpha: config.alpha,
            n_cycle: config.n_cycle,
            batch_size: config.batch_size,
            mini_batch_epochs: config.mini_batch_epochs,
        }
    }

    /// Обновляет `w` на месте выбранной стратегией
    pub fn run<R: Rng + ?Sized>(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        w: &mut Array1<f64>,
        rng: &mut R,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) -> Result<()> {
        if x.nrows() == 0 {
            return Err(DslrError::EmptyInput { operation: "gradient descent" });
        }
        if y.len() != x.nrows() {
            return Err(DslrError::ShapeMismatch {
                what: "target vector length",
                expected: x.nrows(),
                found: y.len(),
            });
        }
        if w.len() != x.ncols() {
            return Err(DslrError::ShapeMismatch {
                what: "weight vector length",
                expected: x.ncols(),
                found: w.len(),
            });
        }

        match self.method {
            GradientMethod::Batch => self.batch(x, y, w, reborrow(&mut observer)),
            GradientMethod::MiniBatch => self.mini_batch(x, y, w, reborrow(&mut observer)),
            GradientMethod::Sgd => self.sgd(x, y, w, rng, reborrow(&mut observer)),
        }

        if let Some(observer) = observer {
            observer.on_finish(w);
        }
        Ok(())
    }

    /// Каждый шаг по всей матрице, ровно `n_cycle` шагов
    fn batch(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        w: &mut Array1<f64>,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) {
        for i in 0..self.n_cycle {
            let grad = gradient(x, y, w.view());
            update(w, &grad, self.alpha);

            // 50 отчетов за прогон
            if (i * 50) % self.n_cycle == 0 {
                report(reborrow(&mut observer), i, x, y, w);
            }
        }
    }

    fn mini_batch(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        w: &mut Array1<f64>,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) {
        let limit = x.nrows() * self.mini_batch_epochs;

        for (i, batch) in MiniBatches::new(x.view(), y.view(), self.batch_size).enumerate() {
            if batch.offset > limit {
                break;
            }
            let grad = gradient(batch.features, batch.targets, w.view());
            update(w, &grad, self.alpha);

            if i % 3 == 0 {
                report(reborrow(&mut observer), i, x, y, w);
            }
        }
    }

    /// Одна строка за шаг, не больше `min(n_cycle, rows)` шагов
    fn sgd<R: Rng + ?Sized>(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        w: &mut Array1<f64>,
        rng: &mut R,
        mut observer: Option<&mut dyn TrainingObserver>,
    ) {
        let (x_set, y_set) = shuffle_rows(x, y, rng);
        let rows = x_set.nrows();

        for i in 0..self.n_cycle.min(rows) {
            let grad = gradient(x_set.slice(s![i..i + 1, ..]), y_set.slice(s![i..i + 1]), w.view());
            update(w, &grad, self.alpha);

            // 25 отчетов за проход
            if (i * 25) % rows == 0 {
                report(reborrow(&mut observer), i, x, y, w);
            }
        }
    }
}
