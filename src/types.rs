/// Типы данных для обучения и отчетов

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ndarray::{s, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{DslrError, Result};

/// Факультет - метка класса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Ravenclaw,
    Slytherin,
    Gryffindor,
    Hufflepuff,
}

impl House {
    /// Порядок совпадает с кодами 0..3 и с порядком колонок таблицы весов
    pub const ALL: [House; 4] = [
        House::Ravenclaw,
        House::Slytherin,
        House::Gryffindor,
        House::Hufflepuff,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<House> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            House::Ravenclaw => "Ravenclaw",
            House::Slytherin => "Slytherin",
            House::Gryffindor => "Gryffindor",
            House::Hufflepuff => "Hufflepuff",
        }
    }

    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|h| h.name().to_string()).collect()
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for House {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|h| h.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Таблица признаков: строки - объекты, колонки - признаки.
/// Пропуски хранятся как NaN до импутации.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub features: Array2<f64>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, features: Array2<f64>) -> Result<Self> {
        if columns.len() != features.ncols() {
            return Err(DslrError::ShapeMismatch {
                what: "column names",
                expected: features.ncols(),
                found: columns.len(),
            });
        }
        Ok(Self { columns, features })
    }

    pub fn nrows(&self) -> usize {
        self.features.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.features.ncols()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DslrError::UnknownColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        Ok(self.features.column(self.column_index(name)?))
    }

    /// Значения колонки без пропусков
    pub fn present_values(&self, index: usize) -> Vec<f64> {
        self.features
            .column(index)
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect()
    }
}

/// Добавляет слева колонку единиц под свободный член
pub fn with_bias(features: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::ones((features.nrows(), features.ncols() + 1));
    out.slice_mut(s![.., 1..]).assign(features);
    out
}

/// Обученная модель: строки - bias и признаки, колонки - классы
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    pub classes: Vec<String>,
    pub weights: Array2<f64>,
}

impl WeightTable {
    pub fn new(classes: Vec<String>, weights: Array2<f64>) -> Result<Self> {
        if classes.len() != weights.ncols() {
            return Err(DslrError::ShapeMismatch {
                what: "weight table classes",
                expected: weights.ncols(),
                found: classes.len(),
            });
        }
        Ok(Self { classes, weights })
    }

    /// Собирает таблицу из векторов весов по классам
    pub fn from_columns(classes: Vec<String>, columns: &[Array1<f64>]) -> Result<Self> {
        let n_weights = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut weights = Array2::zeros((n_weights, columns.len()));
        for (j, column) in columns.iter().enumerate() {
            if column.len() != n_weights {
                return Err(DslrError::ShapeMismatch {
                    what: "weight vector length",
                    expected: n_weights,
                    found: column.len(),
                });
            }
            weights.column_mut(j).assign(column);
        }
        Self::new(classes, weights)
    }

    /// Число признаков без учета bias
    pub fn n_features(&self) -> usize {
        self.weights.nrows().saturating_sub(1)
    }

    pub fn class_weights(&self, class: &str) -> Option<ArrayView1<'_, f64>> {
        self.classes
            .iter()
            .position(|c| c == class)
            .map(|j| self.weights.column(j))
    }
}

/// Таблица описательных статистик: метрика -> колонка -> значение
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub metrics: Vec<String>,
    pub columns: Vec<String>,
    /// values[metric][column]
    pub values: Vec<Vec<f64>>,
}

impl SummaryTable {
    pub fn get(&self, metric: &str, column: &str) -> Option<f64> {
        let i = self.metrics.iter().position(|m| m == metric)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }
}

/// Метод градиентного спуска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    #[default]
    Batch,
    MiniBatch,
    Sgd,
}

impl GradientMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            GradientMethod::Batch => "batch",
            GradientMethod::MiniBatch => "mini_batch",
            GradientMethod::Sgd => "sgd",
        }
    }
}

impl fmt::Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientMethod {
    type Err = DslrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "batch" => Ok(GradientMethod::Batch),
            "mini_batch" => Ok(GradientMethod::MiniBatch),
            "sgd" => Ok(GradientMethod::Sgd),
            other => Err(DslrError::UnknownMethod(other.to_string())),
        }
    }
}

/// Параметры обучения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    #[serde(default)]
    pub method: GradientMethod,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_n_cycle")]
    pub n_cycle: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Сколько полных проходов по данным делает mini-batch
    #[serde(default = "default_mini_batch_epochs")]
    pub mini_batch_epochs: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub debug: bool,
}

fn default_alpha() -> f64 { 1.0 }
fn default_n_cycle() -> usize { 5000 }
fn default_batch_size() -> usize { 8 }
fn default_mini_batch_epochs() -> usize { 1 }

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            method: GradientMethod::default(),
            alpha: default_alpha(),
            n_cycle: default_n_cycle(),
            batch_size: default_batch_size(),
            mini_batch_epochs: default_mini_batch_epochs(),
            seed: None,
            parallel: false,
            debug: false,
        }
    }
}

impl TrainConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn house_codes_follow_declaration_order() {
        assert_eq!(House::Ravenclaw.index(), 0);
        assert_eq!(House::Hufflepuff.index(), 3);
        assert_eq!(House::from_index(1), Some(House::Slytherin));
        assert_eq!("Gryffindor".parse::<House>(), Ok(House::Gryffindor));
        assert!("Durmstrang".parse::<House>().is_err());
    }

    #[test]
    fn gradient_method_parses_cli_names() {
        assert_eq!("mini_batch".parse::<GradientMethod>().unwrap(), GradientMethod::MiniBatch);
        assert_eq!(GradientMethod::Sgd.to_string(), "sgd");
        assert!(matches!(
            "adam".parse::<GradientMethod>(),
            Err(DslrError::UnknownMethod(_))
        ));
    }

    #[test]
    fn train_config_fills_defaults() {
        let config: TrainConfig = serde_json::from_str(r#"{"method": "sgd", "seed": 7}"#).unwrap();
        assert_eq!(config.method, GradientMethod::Sgd);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.n_cycle, 5000);
        assert_eq!(config.batch_size, 8);
    }

    #[test]
    fn bias_column_is_prepended() {
        let x = array![[2.0, 3.0], [4.0, 5.0]];
        assert_eq!(with_bias(&x), array![[1.0, 2.0, 3.0], [1.0, 4.0, 5.0]]);
    }

    #[test]
    fn weight_table_from_columns() {
        let table = WeightTable::from_columns(
            vec!["a".into(), "b".into()],
            &[array![0.1, 0.2, 0.3], array![-0.1, -0.2, -0.3]],
        )
        .unwrap();
        assert_eq!(table.n_features(), 2);
        assert_eq!(table.class_weights("b").unwrap()[2], -0.3);

        let err = WeightTable::from_columns(vec!["a".into(), "b".into()], &[array![1.0], array![1.0, 2.0]]);
        assert!(matches!(err, Err(DslrError::ShapeMismatch { .. })));
    }
}
