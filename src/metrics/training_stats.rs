//! Training statistics tracking for the DQN loop
//!
//! Keeps what the end-of-episode report needs: the full score history, the
//! running mean over every episode, the best score, a rolling window of recent
//! scores and the most recent training losses.

use std::collections::VecDeque;

/// Score history and loss tracker
///
/// # Example
///
/// ```rust
/// use snake_dqn::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(5);
/// stats.record_episode(3);
/// stats.record_losses(0.4, 1.2);
///
/// assert_eq!(stats.record(), 5);
/// assert_eq!(stats.mean_score(), 4.0);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Every episode score, oldest first
    scores: Vec<u32>,

    /// Running mean after each episode, for plotting alongside `scores`
    mean_scores: Vec<f32>,

    total_score: u64,

    record: u32,

    /// Recent scores (rolling window)
    recent_scores: VecDeque<u32>,

    /// Single-sample losses (rolling window)
    short_losses: VecDeque<f32>,

    /// Replay losses (rolling window)
    replay_losses: VecDeque<f32>,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker whose rolling averages cover `window_size` entries
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            scores: Vec::new(),
            mean_scores: Vec::new(),
            total_score: 0,
            record: 0,
            recent_scores: VecDeque::with_capacity(window_size),
            short_losses: VecDeque::with_capacity(window_size),
            replay_losses: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Record the final score of a completed episode
    ///
    /// Returns `true` when the score beats the previous record.
    pub fn record_episode(&mut self, score: u32) -> bool {
        self.scores.push(score);
        self.total_score += u64::from(score);
        Self::push_deque(&mut self.recent_scores, score, self.window_size);
        self.mean_scores.push(self.mean_score());

        let new_record = score > self.record;
        if new_record {
            self.record = score;
        }
        new_record
    }

    /// Record the losses of the latest single-sample and replay updates
    pub fn record_losses(&mut self, short_loss: f32, replay_loss: f32) {
        Self::push_deque(&mut self.short_losses, short_loss, self.window_size);
        Self::push_deque(&mut self.replay_losses, replay_loss, self.window_size);
    }

    /// Seed the record from an earlier run so resumed training does not
    /// report stale records
    pub fn with_record(mut self, record: u32) -> Self {
        self.record = record;
        self
    }

    /// Mean score over every completed episode, 0.0 before the first
    pub fn mean_score(&self) -> f32 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.total_score as f32 / self.scores.len() as f32
        }
    }

    /// Mean score over the rolling window
    pub fn recent_mean_score(&self) -> f32 {
        if self.recent_scores.is_empty() {
            0.0
        } else {
            self.recent_scores.iter().sum::<u32>() as f32 / self.recent_scores.len() as f32
        }
    }

    /// Mean single-sample loss over the rolling window
    pub fn mean_short_loss(&self) -> f32 {
        Self::mean(&self.short_losses)
    }

    /// Mean replay loss over the rolling window
    pub fn mean_replay_loss(&self) -> f32 {
        Self::mean(&self.replay_losses)
    }

    /// Every recorded score, oldest first
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Running mean after each episode
    pub fn mean_scores(&self) -> &[f32] {
        &self.mean_scores
    }

    /// Best score seen
    pub fn record(&self) -> u32 {
        self.record
    }

    /// Number of completed episodes
    pub fn total_episodes(&self) -> usize {
        self.scores.len()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line report of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Last: {} | Record: {} | Mean: {:.2} | Recent: {:.2} | Loss: {:.4} | Replay: {:.4}",
            self.total_episodes(),
            self.scores.last().copied().unwrap_or_default(),
            self.record,
            self.mean_score(),
            self.recent_mean_score(),
            self.mean_short_loss(),
            self.mean_replay_loss(),
        )
    }

    fn mean(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.record(), 0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_score(), 0.0);
        assert_eq!(stats.recent_mean_score(), 0.0);
        assert_eq!(stats.mean_short_loss(), 0.0);
        assert_eq!(stats.mean_replay_loss(), 0.0);
        assert!(stats.scores().is_empty());
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);

        assert!(stats.record_episode(3));
        assert!(!stats.record_episode(3));
        assert!(!stats.record_episode(1));
        assert!(stats.record_episode(7));

        assert_eq!(stats.total_episodes(), 4);
        assert_eq!(stats.record(), 7);
        assert_eq!(stats.scores(), &[3, 3, 1, 7]);
        assert!((stats.mean_score() - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_score_is_not_a_record() {
        let mut stats = TrainingStats::new(10);
        assert!(!stats.record_episode(0));
    }

    #[test]
    fn test_running_mean_history() {
        let mut stats = TrainingStats::new(10);
        stats.record_episode(2);
        stats.record_episode(4);
        stats.record_episode(0);

        assert_eq!(stats.mean_scores(), &[2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_rolling_window() {
        let mut stats = TrainingStats::new(3);
        for score in 1..=3 {
            stats.record_episode(score);
        }
        assert!((stats.recent_mean_score() - 2.0).abs() < 1e-6);

        // Fourth episode evicts the first from the window only
        stats.record_episode(4);
        assert!((stats.recent_mean_score() - 3.0).abs() < 1e-6);
        assert!((stats.mean_score() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_loss_window() {
        let mut stats = TrainingStats::new(2);
        stats.record_losses(0.1, 1.0);
        stats.record_losses(0.3, 2.0);
        assert!((stats.mean_short_loss() - 0.2).abs() < 1e-6);

        stats.record_losses(0.5, 4.0);
        assert!((stats.mean_short_loss() - 0.4).abs() < 1e-6);
        assert!((stats.mean_replay_loss() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_with_record() {
        let mut stats = TrainingStats::new(10).with_record(12);
        assert!(!stats.record_episode(10));
        assert!(stats.record_episode(13));
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(5);
        stats.record_losses(0.02, 0.05);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Last: 5"));
        assert!(summary.contains("Record: 5"));
        assert!(summary.contains("Mean: 5.00"));
        assert!(summary.contains("Loss: 0.0200"));
        assert!(summary.contains("Replay: 0.0500"));
    }
}
