//! DSLR - логистическая регрессия "один против всех" и описательная статистика

pub mod error;
pub mod io;
pub mod maths;
pub mod models;
pub mod preprocessing;
pub mod types;

pub use error::{DslrError, Result};
pub use models::*;
pub use preprocessing::{prepare, FeatureEngineer, MinMaxNormalizer};
pub use types::*;
