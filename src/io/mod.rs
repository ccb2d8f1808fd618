/// Ввод/вывод: CSV с данными и таблица весов

pub mod dataset;
pub mod weights;

pub use dataset::RawTable;
pub use weights::{read_weights, write_predictions, write_weights};
