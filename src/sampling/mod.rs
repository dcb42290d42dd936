pub mod gaussian;
pub mod noise;
pub mod uniform;

pub use noise::ErrorSampler;
pub use uniform::{sample_uniform, sample_uniform_matrix, sample_uniform_vec};
