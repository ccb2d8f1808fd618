/// ML модели

pub mod describe;
pub mod gradient_descent;
pub mod logistic_regression;
pub mod one_vs_rest;

pub use describe::{DescriptiveReporter, Metric};
pub use gradient_descent::{
    GradientDescent, MiniBatch, MiniBatches, Progress, TracingObserver, TrainingObserver,
};
pub use logistic_regression::LogisticRegression;
pub use one_vs_rest::OneVsRest;
