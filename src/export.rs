//! Web Model Export
//!
//! Writes a trained classifier in the TensorFlow.js layers format so the
//! browser client can load it with `tf.loadLayersModel`:
//!
//! - `model.json`: a `Sequential` topology plus the weights manifest
//! - `group1-shard1of1.bin`: every weight as little-endian float32,
//!   concatenated in manifest order
//!
//! Burn stores a `Linear` weight as `[d_input, d_output]`, which is already
//! the Keras `Dense` kernel layout, so no transpose is needed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::model::LandmarkClassifier;
use crate::utils::error::{Result, SignLangError};
use crate::VERSION;

/// Name of the topology file
pub const MODEL_JSON_FILE: &str = "model.json";

/// Name of the single weights shard
pub const WEIGHTS_FILE: &str = "group1-shard1of1.bin";

/// One entry of the weights manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// A group of weights stored in the listed shard files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsGroup {
    pub paths: Vec<String>,
    pub weights: Vec<WeightSpec>,
}

/// Contents of `model.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayersModelJson {
    pub format: String,
    pub generated_by: String,
    pub converted_by: Option<String>,
    pub model_topology: Value,
    pub weights_manifest: Vec<WeightsGroup>,
}

/// What was written by [`export_web_model`]
#[derive(Debug, Clone, PartialEq)]
pub struct WebExport {
    pub model_json: PathBuf,
    pub weights_bin: PathBuf,
    /// Total number of float32 values in the shard
    pub num_weights: usize,
    /// Layer widths from input to output
    pub layer_dims: Vec<usize>,
}

struct DenseWeights {
    name: String,
    units: usize,
    activation: &'static str,
    kernel: (Vec<usize>, Vec<f32>),
    bias: Option<(Vec<usize>, Vec<f32>)>,
}

/// Export `model` into `output_dir`, creating it if needed
pub fn export_web_model<B: Backend>(model: &LandmarkClassifier<B>, output_dir: &Path) -> Result<WebExport> {
    fs::create_dir_all(output_dir)?;

    let layers = collect_dense_layers(model)?;
    let input_dim = layers
        .first()
        .map(|l| l.kernel.0[0])
        .ok_or_else(|| SignLangError::Export("model has no dense layers".to_string()))?;

    let mut weights = Vec::new();
    let mut values: Vec<f32> = Vec::new();
    for layer in &layers {
        weights.push(WeightSpec {
            name: format!("{}/kernel", layer.name),
            shape: layer.kernel.0.clone(),
            dtype: "float32".to_string(),
        });
        values.extend_from_slice(&layer.kernel.1);

        if let Some((shape, data)) = &layer.bias {
            weights.push(WeightSpec {
                name: format!("{}/bias", layer.name),
                shape: shape.clone(),
                dtype: "float32".to_string(),
            });
            values.extend_from_slice(data);
        }
    }

    let manifest = LayersModelJson {
        format: "layers-model".to_string(),
        generated_by: format!("signlang {}", VERSION),
        converted_by: None,
        model_topology: sequential_topology(input_dim, &layers),
        weights_manifest: vec![WeightsGroup {
            paths: vec![WEIGHTS_FILE.to_string()],
            weights,
        }],
    };

    let model_json = output_dir.join(MODEL_JSON_FILE);
    fs::write(&model_json, serde_json::to_string(&manifest)?)?;

    let weights_bin = output_dir.join(WEIGHTS_FILE);
    let mut writer = BufWriter::new(File::create(&weights_bin)?);
    for v in &values {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()?;

    let mut layer_dims = vec![input_dim];
    layer_dims.extend(layers.iter().map(|l| l.units));

    info!(
        "Exported web model to {:?}: layers {:?}, {} weights",
        output_dir,
        layer_dims,
        values.len()
    );

    Ok(WebExport {
        model_json,
        weights_bin,
        num_weights: values.len(),
        layer_dims,
    })
}

fn collect_dense_layers<B: Backend>(model: &LandmarkClassifier<B>) -> Result<Vec<DenseWeights>> {
    let total = model.hidden.len() + 1;
    let all = model.hidden.iter().chain(std::iter::once(&model.output));

    all.enumerate()
        .map(|(idx, linear)| {
            let name = if idx == 0 {
                "dense".to_string()
            } else {
                format!("dense_{}", idx)
            };
            let kernel = tensor_values(linear.weight.val())?;
            let bias = linear
                .bias
                .as_ref()
                .map(|b| tensor_values(b.val()))
                .transpose()?;

            Ok(DenseWeights {
                name,
                units: kernel.0[1],
                activation: if idx + 1 == total { "softmax" } else { "relu" },
                kernel,
                bias,
            })
        })
        .collect()
}

fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<(Vec<usize>, Vec<f32>)> {
    let shape = tensor.dims().to_vec();
    let data = tensor.into_data().iter::<f32>().collect::<Vec<_>>();
    let expected: usize = shape.iter().product();
    if data.len() != expected {
        return Err(SignLangError::Export(format!(
            "tensor of shape {:?} yielded {} values",
            shape,
            data.len()
        )));
    }
    Ok((shape, data))
}

fn sequential_topology(input_dim: usize, layers: &[DenseWeights]) -> Value {
    let mut config_layers = vec![json!({
        "class_name": "InputLayer",
        "config": {
            "batch_input_shape": [null, input_dim],
            "dtype": "float32",
            "sparse": false,
            "name": "input_1"
        }
    })];

    for layer in layers {
        config_layers.push(json!({
            "class_name": "Dense",
            "config": {
                "name": layer.name,
                "trainable": true,
                "dtype": "float32",
                "units": layer.units,
                "activation": layer.activation,
                "use_bias": layer.bias.is_some(),
                "kernel_initializer": {"class_name": "GlorotUniform", "config": {"seed": null}},
                "bias_initializer": {"class_name": "Zeros", "config": {}},
                "kernel_regularizer": null,
                "bias_regularizer": null,
                "activity_regularizer": null,
                "kernel_constraint": null,
                "bias_constraint": null
            }
        }));
    }

    json!({
        "class_name": "Sequential",
        "config": {
            "name": "sequential",
            "layers": config_layers
        },
        "keras_version": "2.15.0",
        "backend": "tensorflow"
    })
}
