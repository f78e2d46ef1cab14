//! Compile-time backend selection
//!
//! `ndarray` (default) trains and serves on the CPU. `cuda` moves both to the
//! GPU and takes precedence when both features are enabled.

use burn::backend::Autodiff;
use burn::tensor::backend::Backend;

#[cfg(feature = "cuda")]
pub type DefaultBackend = burn_cuda::Cuda;

#[cfg(all(feature = "ndarray", not(feature = "cuda")))]
pub type DefaultBackend = burn_ndarray::NdArray<f32>;

#[cfg(not(any(feature = "ndarray", feature = "cuda")))]
compile_error!("enable the `ndarray` or `cuda` feature");

/// Backend with gradient tracking, used by `signlang train`
pub type TrainingBackend = Autodiff<DefaultBackend>;

pub type Device = <DefaultBackend as Backend>::Device;

pub fn default_device() -> Device {
    Device::default()
}

/// Shown in the training banner
pub const fn backend_name() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA (GPU)"
    } else {
        "NdArray (CPU)"
    }
}
