use burn::backend::ndarray::NdArrayDevice;

/// CPU tensor backend with f64 elements.
///
/// The batched similarity path must agree with the scalar reference path to
/// 1e-9 absolute, which rules out f32 accumulation. Burn's NdArray backend
/// parameterized over f64 keeps every tensor op at full double precision.
pub type CpuBackend = burn::backend::NdArray<f64>;

pub fn init_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
