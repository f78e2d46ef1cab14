//! Dense Classifier for Hand-Landmark Features
//!
//! A small multilayer perceptron over the 63-float landmark vector: a stack
//! of ReLU hidden layers followed by a linear output layer. Softmax is
//! applied separately so training can feed raw logits to cross-entropy.

use std::path::Path;

use burn::{
    config::Config,
    module::Module,
    nn::{Initializer, Linear, LinearConfig, Relu},
    tensor::{backend::Backend, Tensor},
};

use crate::utils::error::{Result as SignLangResult, SignLangError};
use crate::FEATURE_DIM;

/// Configuration for the LandmarkClassifier model
#[derive(Config, Debug)]
pub struct LandmarkClassifierConfig {
    /// Number of output classes
    pub num_classes: usize,

    /// Width of the input feature vector
    #[config(default = "63")]
    pub input_dim: usize,

    /// Units per hidden layer, input side first
    #[config(default = "vec![64, 32]")]
    pub hidden_units: Vec<usize>,
}

impl LandmarkClassifierConfig {
    pub fn validate(&self) -> SignLangResult<()> {
        if self.num_classes == 0 {
            return Err(SignLangError::Model("num_classes must be > 0".to_string()));
        }
        if self.input_dim != FEATURE_DIM {
            return Err(SignLangError::Model(format!(
                "input_dim must be {}, got {}",
                FEATURE_DIM, self.input_dim
            )));
        }
        if self.hidden_units.iter().any(|&u| u == 0) {
            return Err(SignLangError::Model("hidden layer width must be > 0".to_string()));
        }
        Ok(())
    }

    /// Write the config as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> SignLangResult<()> {
        self.save(path.as_ref())?;
        Ok(())
    }

    /// Read a config written by [`Self::save_json`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> SignLangResult<Self> {
        let path = path.as_ref();
        crate::utils::error::ensure_exists(path)?;
        Self::load(path).map_err(|e| SignLangError::Config(format!("{:?}: {}", path, e)))
    }

    /// Initialize a model with Glorot-uniform weights and zero biases
    pub fn init<B: Backend>(&self, device: &B::Device) -> LandmarkClassifier<B> {
        LandmarkClassifier::new(self, device)
    }
}

/// Sign-language classifier over flattened hand landmarks
///
/// Architecture:
/// - `hidden_units.len()` dense layers with ReLU
/// - A dense output layer producing one logit per class
#[derive(Module, Debug)]
pub struct LandmarkClassifier<B: Backend> {
    // Public for weight export
    pub hidden: Vec<Linear<B>>,
    pub output: Linear<B>,
    pub activation: Relu,

    num_classes: usize,
}

impl<B: Backend> LandmarkClassifier<B> {
    pub fn new(config: &LandmarkClassifierConfig, device: &B::Device) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_units.len());
        let mut width = config.input_dim;

        for &units in &config.hidden_units {
            hidden.push(dense(width, units, device));
            width = units;
        }

        Self {
            hidden,
            output: dense(width, config.num_classes, device),
            activation: Relu::new(),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 63]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(x, |x, layer| self.activation.forward(layer.forward(x)));
        self.output.forward(x)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Layer widths from input to output, e.g. `[63, 64, 32, 5]`
    pub fn layer_dims(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.hidden.len() + 2);
        for layer in self.hidden.iter().chain(std::iter::once(&self.output)) {
            let [d_input, d_output] = layer.weight.dims();
            if dims.is_empty() {
                dims.push(d_input);
            }
            dims.push(d_output);
        }
        dims
    }
}

fn dense<B: Backend>(d_input: usize, d_output: usize, device: &B::Device) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device);
    // The initializer also fills the bias; biases start at zero
    linear.bias = Some(Initializer::Zeros.init([d_output], device));
    linear
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::TensorData;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(5).init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 2>::zeros([4, FEATURE_DIM], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [4, 5]);
        assert_eq!(model.num_classes(), 5);
        assert_eq!(model.layer_dims(), vec![63, 64, 32, 5]);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(3).init::<TestBackend>(&device);

        let data: Vec<f32> = (0..2 * FEATURE_DIM).map(|i| (i % 7) as f32 / 10.0).collect();
        let input = Tensor::<TestBackend, 2>::from_floats(TensorData::new(data, [2, FEATURE_DIM]), &device);
        let probs = model.forward_softmax(input).into_data().to_vec::<f32>().unwrap();

        for row in probs.chunks(3) {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!(row.iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn test_biases_start_at_zero() {
        let device = Default::default();
        let model = LandmarkClassifierConfig::new(4).init::<TestBackend>(&device);

        let bias = model.output.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();
        assert!(bias.iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_custom_hidden_layers() {
        let device = Default::default();
        let config = LandmarkClassifierConfig::new(2).with_hidden_units(vec![16]);
        let model = config.init::<TestBackend>(&device);
        assert_eq!(model.layer_dims(), vec![63, 16, 2]);
    }

    #[test]
    fn test_validate() {
        assert!(LandmarkClassifierConfig::new(3).validate().is_ok());
        assert!(LandmarkClassifierConfig::new(0).validate().is_err());
        assert!(LandmarkClassifierConfig::new(3).with_input_dim(10).validate().is_err());
        assert!(LandmarkClassifierConfig::new(3)
            .with_hidden_units(vec![8, 0])
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config.json");
        let config = LandmarkClassifierConfig::new(6).with_hidden_units(vec![32, 16]);

        config.save_json(&path).unwrap();
        let loaded = LandmarkClassifierConfig::load_json(&path).unwrap();
        assert_eq!(loaded.num_classes, 6);
        assert_eq!(loaded.hidden_units, vec![32, 16]);
    }
}
