//! Q-network for the snake agent
//!
//! A feed-forward approximator mapping the 11 state features to one score per
//! relative action.
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → 256) + ReLU
//!   ↓ Linear(256 → 3)
//! Output: [batch, 3]  (straight, right, left)
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_dqn::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::default().init::<Backend>(&device);
//!
//! let states = Tensor::zeros([4, 11], &device);
//! let q_values = network.forward(states);
//!
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use anyhow::{Result, anyhow};
use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, TensorData, activation::relu, backend::Backend},
};
use serde::{Deserialize, Serialize};

use super::observation::{STATE_SIZE, StateVector};
use crate::game::Action;

/// Shape of the Q-network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    /// Number of input features (11)
    pub input_size: usize,
    /// Hidden layer width (default: 256)
    pub hidden_size: usize,
    /// Number of actions scored (3)
    pub output_size: usize,
}

impl QNetworkConfig {
    /// Network over the fixed feature and action spaces with the given hidden width
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: STATE_SIZE,
            hidden_size,
            output_size: Action::COUNT,
        }
    }

    /// Initialize the network with fresh parameters on `device`
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.output_size).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Two-layer perceptron producing Q-values
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: `[batch, 11]` → `[batch, 3]`
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(states));
        self.output.forward(x)
    }

    /// Q-values for a single state
    pub fn q_values(&self, state: &StateVector, device: &B::Device) -> Result<Vec<f32>> {
        let input = states_to_tensor::<B>(&[state], device);
        self.forward(input)
            .into_data()
            .to_vec()
            .map_err(|err| anyhow!("Failed to read Q-values: {err:?}"))
    }
}

/// Stack encoded states into a `[batch, 11]` tensor
pub fn states_to_tensor<B: Backend>(states: &[&StateVector], device: &B::Device) -> Tensor<B, 2> {
    let data: Vec<f32> = states.iter().flat_map(|s| s.iter().copied()).collect();
    Tensor::from_data(TensorData::new(data, [states.len(), STATE_SIZE]), device)
}

/// Index of the first maximum, `None` for an empty slice
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}
