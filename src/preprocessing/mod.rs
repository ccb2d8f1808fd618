/// Модуль предобработки данных

pub mod feature_engineering;
pub mod imputation;
pub mod normalization;

pub use feature_engineering::{FeatureEngineer, HandEncoding};
pub use imputation::impute_median;
pub use normalization::MinMaxNormalizer;

use crate::error::Result;
use crate::types::Dataset;

/// Медиана вместо пропусков, затем min-max. Порядок важен.
pub fn prepare(mut data: Dataset) -> Result<Dataset> {
    impute_median(&mut data)?;

    let mut normalizer = MinMaxNormalizer::new();
    let scaled = normalizer.fit_transform(&data)?;
    if let (Some(min), Some(max)) = (normalizer.min(), normalizer.max()) {
        tracing::debug!(%min, %max, "min-max ranges");
    }
    Ok(scaled)
}
