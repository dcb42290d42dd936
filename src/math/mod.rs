pub mod matrix;
pub mod modular;

pub use matrix::Matrix;
pub use modular::{centered_abs, dot_mod, from_signed, mod_add, mod_mul, mod_sub, to_centered};
