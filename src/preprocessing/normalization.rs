//! Min-max нормализация

use ndarray::Array1;

use crate::error::{DslrError, Result};
use crate::maths::statistics;
use crate::types::Dataset;

/// `x' = (x - min) / (max - min)` по каждой колонке
#[derive(Debug, Clone, Default)]
pub struct MinMaxNormalizer {
    min: Option<Array1<f64>>,
    max: Option<Array1<f64>>,
}

impl MinMaxNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Колонка с max == min - ошибка `DegenerateColumn`, решение о ней
    /// остается за вызывающим кодом.
    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        if data.nrows() == 0 {
            return Err(DslrError::EmptyInput { operation: "min-max normalization" });
        }

        let mut min = Array1::zeros(data.ncols());
        let mut max = Array1::zeros(data.ncols());
        for (j, column) in data.columns.iter().enumerate() {
            let values = data.features.column(j).to_vec();
            min[j] = statistics::min(&values)?;
            max[j] = statistics::max(&values)?;
            if max[j] == min[j] {
                return Err(DslrError::DegenerateColumn { column: column.clone() });
            }
        }

        self.min = Some(min);
        self.max = Some(max);
        Ok(())
    }

    pub fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let min = self.min.as_ref().ok_or(DslrError::NotFitted)?;
        let max = self.max.as_ref().ok_or(DslrError::NotFitted)?;
        if min.len() != data.ncols() {
            return Err(DslrError::ShapeMismatch {
                what: "normalized column count",
                expected: min.len(),
                found: data.ncols(),
            });
        }

        let mut normalized = data.clone();
        for mut row in normalized.features.rows_mut() {
            for (j, val) in row.iter_mut().enumerate() {
                *val = (*val - min[j]) / (max[j] - min[j]);
            }
        }

        Ok(normalized)
    }

    pub fn fit_transform(&mut self, data: &Dataset) -> Result<Dataset> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn min(&self) -> Option<&Array1<f64>> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Array1<f64>> {
        self.max.as_ref()
    }
}
