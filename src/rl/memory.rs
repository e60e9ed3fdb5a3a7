//! Experience replay memory for DQN training
//!
//! A bounded FIFO of transitions. Once full, every push evicts the oldest
//! transition. Sampling draws uniformly without replacement and leaves the
//! buffer untouched.

use std::collections::VecDeque;

use rand::{Rng, seq::index};

use super::observation::StateVector;
use crate::game::{Action, GameError};

/// One recorded step of experience
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Encoded state before the action
    pub state: StateVector,
    /// One-hot relative action `[straight, right, left]`
    pub action: [f32; 3],
    /// Reward received for the step
    pub reward: f32,
    /// Encoded state after the action
    pub next_state: StateVector,
    /// Whether the step ended the episode
    pub done: bool,
}

impl Transition {
    /// Index of the action taken, rejecting anything but a strict one-hot
    pub fn action_index(&self) -> Result<usize, GameError> {
        Action::from_one_hot(&self.action).map(|action| action.index())
    }
}

/// Replay memory with overwrite-oldest-on-full semantics
///
/// # Example
///
/// ```rust
/// use snake_dqn::rl::{ReplayMemory, Transition};
///
/// let mut memory = ReplayMemory::new(2);
/// let transition = Transition {
///     state: [0.0; 11],
///     action: [1.0, 0.0, 0.0],
///     reward: 0.0,
///     next_state: [0.0; 11],
///     done: false,
/// };
///
/// memory.push(transition.clone());
/// memory.push(transition.clone());
/// memory.push(transition);
/// assert_eq!(memory.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create an empty memory holding at most `capacity` transitions
    pub fn new(capacity: usize) -> Self {
        Self {
            // Grow lazily: the default capacity is large
            transitions: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draw `k` transitions uniformly without replacement, or the whole
    /// buffer (oldest first) when it holds `k` or fewer
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<&Transition> {
        if self.transitions.len() <= k {
            return self.transitions.iter().collect();
        }

        index::sample(rng, self.transitions.len(), k)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect()
    }

    /// Number of stored transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the memory is empty
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Maximum number of stored transitions
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn transition(reward: f32) -> Transition {
        Transition {
            state: [0.0; 11],
            action: [0.0, 1.0, 0.0],
            reward,
            next_state: [1.0; 11],
            done: false,
        }
    }

    #[test]
    fn test_push_and_len() {
        let mut memory = ReplayMemory::new(10);
        assert!(memory.is_empty());

        memory.push(transition(1.0));
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.capacity(), 10);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut memory = ReplayMemory::new(3);
        for reward in 0..5 {
            memory.push(transition(reward as f32));
        }

        let rewards: Vec<f32> = memory.iter().map(|t| t.reward).collect();
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sample_returns_everything_when_small() {
        let mut memory = ReplayMemory::new(10);
        for reward in 0..4 {
            memory.push(transition(reward as f32));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sample = memory.sample(1000, &mut rng);
        assert_eq!(sample.len(), 4);
        assert_eq!(sample[0].reward, 0.0);
        assert_eq!(sample[3].reward, 3.0);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = ReplayMemory::new(100);
        for reward in 0..100 {
            memory.push(transition(reward as f32));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let sample = memory.sample(30, &mut rng);
        assert_eq!(sample.len(), 30);

        let distinct: HashSet<u32> = sample.iter().map(|t| t.reward as u32).collect();
        assert_eq!(distinct.len(), 30);
        assert_eq!(memory.len(), 100);
    }

    #[test]
    fn test_sample_is_reproducible() {
        let mut memory = ReplayMemory::new(50);
        for reward in 0..50 {
            memory.push(transition(reward as f32));
        }

        let a: Vec<f32> = memory
            .sample(10, &mut ChaCha8Rng::seed_from_u64(9))
            .iter()
            .map(|t| t.reward)
            .collect();
        let b: Vec<f32> = memory
            .sample(10, &mut ChaCha8Rng::seed_from_u64(9))
            .iter()
            .map(|t| t.reward)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_action_index() {
        assert_eq!(transition(0.0).action_index(), Ok(1));
    }

    #[test]
    fn test_malformed_action_index_is_error() {
        let mut t = transition(0.0);
        t.action = [0.0, 0.0, 0.0];
        assert!(matches!(t.action_index(), Err(GameError::InvalidAction { .. })));

        t.action = [0.0, 1.0, 1.0];
        assert!(t.action_index().is_err());
    }

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(capacity in 1usize..50, pushes in 0usize..200) {
            let mut memory = ReplayMemory::new(capacity);
            for i in 0..pushes {
                memory.push(transition(i as f32));
                prop_assert!(memory.len() <= capacity);
            }
            prop_assert_eq!(memory.len(), pushes.min(capacity));

            if pushes > 0 {
                let newest = memory.iter().last().map(|t| t.reward);
                prop_assert_eq!(newest, Some((pushes - 1) as f32));
            }
        }
    }
}
