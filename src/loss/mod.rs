pub mod mse;

pub use mse::{ErrorData, MseLoss};
