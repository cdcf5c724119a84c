use crate::error::Result;
use ndarray::ArrayD;

/// A compute target the finished batch is copied to.
///
/// Implement this for an accelerator backend to receive the batch in its own
/// tensor type. The transfer happens once per load.
pub trait Device {
    type Tensor;

    fn name(&self) -> String;

    fn transfer(&self, batch: ArrayD<f32>) -> Result<Self::Tensor>;
}

/// Host memory. The batch is returned as-is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cpu;

impl Device for Cpu {
    type Tensor = ArrayD<f32>;

    fn name(&self) -> String {
        "cpu".to_string()
    }

    fn transfer(&self, batch: ArrayD<f32>) -> Result<Self::Tensor> {
        Ok(batch)
    }
}
