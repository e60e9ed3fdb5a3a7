//! Temporal-difference trainer for the Q-network
//!
//! Each update is one step of semi-gradient TD(0): targets are built from the
//! network's current estimates, detached from the graph, and the mean squared
//! error against the prediction is minimized with a single Adam step. A
//! single transition is just a batch of one.

use anyhow::{Result, anyhow};
use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Tensor, TensorData, backend::AutodiffBackend},
};

use super::memory::Transition;
use super::network::{QNetwork, states_to_tensor};
use crate::game::{Action, GameError};

/// TD target for one transition
///
/// `reward` when the transition ended the episode, otherwise
/// `reward + gamma * max_a Q(next_state, a)`.
pub fn td_target(reward: f32, done: bool, gamma: f32, next_max_q: f32) -> f32 {
    if done {
        reward
    } else {
        reward + gamma * next_max_q
    }
}

/// Build the `[batch, 3]` target matrix (row-major) from the predictions:
/// a copy of each prediction row with the taken action's entry replaced by
/// its TD target
///
/// Fails on a transition whose action is not a strict one-hot vector.
pub fn build_targets(
    predicted: &[f32],
    batch: &[&Transition],
    next_max_q: &[f32],
    gamma: f32,
) -> Result<Vec<f32>, GameError> {
    let mut targets = predicted.to_vec();

    for (i, transition) in batch.iter().enumerate() {
        let q_new = td_target(transition.reward, transition.done, gamma, next_max_q[i]);
        targets[i * Action::COUNT + transition.action_index()?] = q_new;
    }

    Ok(targets)
}

/// Optimizer state and TD settings for training a [`QNetwork`]
pub struct QTrainer<B: AutodiffBackend> {
    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,

    learning_rate: f64,

    /// Discount factor
    gamma: f32,

    device: B::Device,
}

impl<B: AutodiffBackend> QTrainer<B> {
    /// Create a trainer with a fresh Adam optimizer
    pub fn new(learning_rate: f64, gamma: f32, device: B::Device) -> Self {
        Self {
            optim: AdamConfig::new().init(),
            learning_rate,
            gamma,
            device,
        }
    }

    /// Run one TD update on `network` over `batch`, returning the MSE loss
    /// measured before the update
    pub fn train_step(&mut self, network: &mut QNetwork<B>, batch: &[&Transition]) -> Result<f32> {
        if batch.is_empty() {
            return Ok(0.0);
        }
        let batch_size = batch.len();

        let states: Vec<_> = batch.iter().map(|t| &t.state).collect();
        let next_states: Vec<_> = batch.iter().map(|t| &t.next_state).collect();

        // Prediction with gradient tracking
        let predicted = network.forward(states_to_tensor::<B>(&states, &self.device));
        let predicted_values: Vec<f32> = predicted
            .clone()
            .into_data()
            .to_vec()
            .map_err(|err| anyhow!("Failed to read predictions: {err:?}"))?;

        // Bootstrap estimate without gradient tracking
        let next_max_q: Vec<f32> = network
            .valid()
            .forward(states_to_tensor::<B::InnerBackend>(&next_states, &self.device))
            .max_dim(1)
            .into_data()
            .to_vec()
            .map_err(|err| anyhow!("Failed to read next-state values: {err:?}"))?;

        let targets = build_targets(&predicted_values, batch, &next_max_q, self.gamma)?;
        let target = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [batch_size, Action::COUNT]),
            &self.device,
        );

        let loss = mse_loss(predicted, target);
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = GradientsParams::from_grads(loss.backward(), &*network);
        *network = self
            .optim
            .step(self.learning_rate, network.clone(), grads);

        Ok(loss_value)
    }

    /// Discount factor used for targets
    pub fn gamma(&self) -> f32 {
        self.gamma
    }
}

/// Mean squared error over every element
fn mse_loss<B: AutodiffBackend>(predicted: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    let diff = predicted - target;
    (diff.clone() * diff).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::QNetworkConfig;
    use burn::backend::{
        Autodiff,
        ndarray::{NdArray, NdArrayDevice},
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    fn transition(action: [f32; 3], reward: f32, done: bool) -> Transition {
        let mut state = [0.0; 11];
        state[4] = 1.0;
        state[8] = 1.0;
        Transition {
            state,
            action,
            reward,
            next_state: [1.0; 11],
            done,
        }
    }

    fn setup() -> (QNetwork<TestBackend>, QTrainer<TestBackend>) {
        let device = NdArrayDevice::default();
        let network = QNetworkConfig::new(32).init::<TestBackend>(&device);
        let trainer = QTrainer::new(1e-3, 0.9, device);
        (network, trainer)
    }

    #[test]
    fn test_td_target_terminal() {
        assert_eq!(td_target(-10.0, true, 0.9, 123.0), -10.0);
    }

    #[test]
    fn test_td_target_bootstraps() {
        let target = td_target(10.0, false, 0.9, 2.0);
        assert!((target - 11.8).abs() < 1e-6);
    }

    #[test]
    fn test_build_targets_replaces_only_taken_action() {
        let a = transition([0.0, 1.0, 0.0], 10.0, false);
        let b = transition([0.0, 0.0, 1.0], -10.0, true);
        let predicted = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];

        let targets = build_targets(&predicted, &[&a, &b], &[1.0, 7.0], 0.5).unwrap();

        assert_eq!(targets[0], 0.1);
        assert!((targets[1] - 10.5).abs() < 1e-6);
        assert_eq!(targets[2], 0.3);
        assert_eq!(targets[3], 0.4);
        assert_eq!(targets[4], 0.5);
        assert_eq!(targets[5], -10.0);
    }

    #[test]
    fn test_single_sample_step() {
        let (mut network, mut trainer) = setup();
        let t = transition([1.0, 0.0, 0.0], 0.0, false);

        let loss = trainer.train_step(&mut network, &[&t]).unwrap();
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_batch_step() {
        let (mut network, mut trainer) = setup();
        let batch: Vec<Transition> = (0..16)
            .map(|i| transition(Action::ALL[i % 3].to_one_hot(), i as f32, i % 4 == 0))
            .collect();
        let refs: Vec<&Transition> = batch.iter().collect();

        let loss = trainer.train_step(&mut network, &refs).unwrap();
        assert!(loss.is_finite());
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let (mut network, mut trainer) = setup();
        assert_eq!(trainer.train_step(&mut network, &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_repeated_updates_fit_terminal_reward() {
        let (mut network, mut trainer) = setup();
        let t = transition([0.0, 1.0, 0.0], -10.0, true);
        let device = NdArrayDevice::default();

        let before = network.valid().q_values(&t.state, &device).unwrap();
        let first_loss = trainer.train_step(&mut network, &[&t]).unwrap();
        let mut last_loss = first_loss;
        for _ in 0..200 {
            last_loss = trainer.train_step(&mut network, &[&t]).unwrap();
        }

        assert!(
            last_loss < first_loss,
            "loss should decrease: first {first_loss}, last {last_loss}"
        );

        let after = network.valid().q_values(&t.state, &device).unwrap();
        assert!(
            after[1] < before[1] - 0.5,
            "Q(right) should move towards -10: {} -> {}",
            before[1],
            after[1]
        );
    }

    #[test]
    fn test_update_changes_parameters() {
        let (mut network, mut trainer) = setup();
        let device = NdArrayDevice::default();
        let t = transition([1.0, 0.0, 0.0], 10.0, true);

        let before = network.valid().q_values(&t.state, &device).unwrap();
        trainer.train_step(&mut network, &[&t]).unwrap();
        let after = network.valid().q_values(&t.state, &device).unwrap();

        assert_ne!(before, after);
    }

    /// MSE of a batch of one where only the taken action's target differs
    fn single_sample_loss(predicted: &[f32], action: usize, target: f32) -> f32 {
        (predicted[action] - target).powi(2) / Action::COUNT as f32
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() <= 1e-4 * expected.abs().max(1.0),
            "loss {actual} should equal {expected}"
        );
    }

    #[test]
    fn test_loss_bootstraps_from_next_state() {
        let (mut network, mut trainer) = setup();
        let device = NdArrayDevice::default();
        let t = transition([0.0, 0.0, 1.0], 10.0, false);

        let predicted = network.valid().q_values(&t.state, &device).unwrap();
        let next = network.valid().q_values(&t.next_state, &device).unwrap();
        let next_max = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let expected = single_sample_loss(&predicted, 2, 10.0 + 0.9 * next_max);

        let loss = trainer.train_step(&mut network, &[&t]).unwrap();
        assert_close(loss, expected);
    }

    #[test]
    fn test_terminal_loss_uses_reward_only() {
        let (mut network, mut trainer) = setup();
        let device = NdArrayDevice::default();
        let t = transition([0.0, 1.0, 0.0], -10.0, true);

        let predicted = network.valid().q_values(&t.state, &device).unwrap();
        let expected = single_sample_loss(&predicted, 1, -10.0);

        let loss = trainer.train_step(&mut network, &[&t]).unwrap();
        assert_close(loss, expected);
    }

    #[test]
    fn test_malformed_action_is_rejected() {
        let (mut network, mut trainer) = setup();
        let device = NdArrayDevice::default();
        let t = transition([0.0, 0.0, 0.0], -10.0, true);
        let before = network.valid().q_values(&t.state, &device).unwrap();

        let err = trainer.train_step(&mut network, &[&t]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GameError>(),
            Some(GameError::InvalidAction { .. })
        ));

        let after = network.valid().q_values(&t.state, &device).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_build_targets_rejects_double_hot_action() {
        let t = transition([0.0, 1.0, 1.0], 1.0, false);
        assert!(build_targets(&[0.0; 3], &[&t], &[0.0], 0.9).is_err());
    }
}
