// ============================================================
// Layer 5 — Early Stopping
// ============================================================
// Watches a validation score (higher is better) and keeps a
// snapshot of whatever produced the best one.
//
//   - the first observed epoch is always the best so far
//   - improvement means strictly greater than best + min_delta
//   - NaN never improves on a real score
//   - `patience` consecutive non-improving epochs → Stop
//
// The snapshot type is generic: the trainer stores a model,
// tests store plain epoch numbers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// New best score; snapshot captured.
    Improved,
    /// No improvement for `wait` epochs, still within patience.
    NoImprovement { wait: usize },
    Stop,
}

#[derive(Debug)]
struct Best<S> {
    epoch:    usize,
    score:    f64,
    snapshot: S,
}

#[derive(Debug)]
pub struct EarlyStopping<S> {
    patience:  usize,
    min_delta: f64,
    wait:      usize,
    best:      Option<Best<S>>,
}

impl<S> EarlyStopping<S> {
    pub fn new(patience: usize) -> Self {
        Self { patience, min_delta: 0.0, wait: 0, best: None }
    }

    pub fn with_min_delta(mut self, min_delta: f64) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Record one epoch's score. `snapshot` is only called on improvement.
    pub fn observe(
        &mut self,
        epoch:    usize,
        score:    f64,
        snapshot: impl FnOnce() -> S,
    ) -> StopDecision {
        if self.improves(score) {
            self.best = Some(Best { epoch, score, snapshot: snapshot() });
            self.wait = 0;
            return StopDecision::Improved;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::NoImprovement { wait: self.wait }
        }
    }

    fn improves(&self, score: f64) -> bool {
        match &self.best {
            None => true,
            Some(best) if best.score.is_nan() => !score.is_nan(),
            Some(best) => score > best.score + self.min_delta,
        }
    }

    #[cfg(test)]
    pub fn best_epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|b| b.epoch)
    }

    #[cfg(test)]
    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.score)
    }

    /// `(epoch, score, snapshot)` of the best epoch seen.
    pub fn into_best(self) -> Option<(usize, f64, S)> {
        self.best.map(|b| (b.epoch, b.score, b.snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed scores until Stop; returns (epoch stopped at, best snapshot).
    fn run(scores: &[f64], patience: usize) -> (usize, Option<(usize, f64, usize)>) {
        let mut es = EarlyStopping::new(patience);
        let mut stopped_at = scores.len();
        for (i, &score) in scores.iter().enumerate() {
            let epoch = i + 1;
            if es.observe(epoch, score, || epoch) == StopDecision::Stop {
                stopped_at = epoch;
                break;
            }
        }
        (stopped_at, es.into_best())
    }

    #[test]
    fn test_peak_then_decline_stops_after_patience() {
        // peak at epoch 4, strictly decreasing for the next 5 epochs
        let scores = [0.60, 0.70, 0.75, 0.80, 0.79, 0.78, 0.77, 0.76, 0.75, 0.74, 0.73];
        let (stopped_at, best) = run(&scores, 5);
        assert_eq!(stopped_at, 4 + 5);
        let (epoch, score, snapshot) = best.unwrap();
        assert_eq!(epoch, 4);
        assert_eq!(score, 0.80);
        assert_eq!(snapshot, 4);
    }

    #[test]
    fn test_never_improving_keeps_first_epoch() {
        let (stopped_at, best) = run(&[0.9, 0.8, 0.7, 0.6, 0.5], 3);
        assert_eq!(stopped_at, 4);
        assert_eq!(best.unwrap().2, 1);
    }

    #[test]
    fn test_equal_score_is_not_an_improvement() {
        let mut es = EarlyStopping::new(2);
        assert_eq!(es.observe(1, 0.7, || 1), StopDecision::Improved);
        assert_eq!(es.observe(2, 0.7, || 2), StopDecision::NoImprovement { wait: 1 });
        assert_eq!(es.observe(3, 0.7, || 3), StopDecision::Stop);
        assert_eq!(es.best_epoch(), Some(1));
    }

    #[test]
    fn test_improvement_resets_wait() {
        let mut es = EarlyStopping::new(2);
        es.observe(1, 0.5, || 1);
        assert_eq!(es.observe(2, 0.4, || 2), StopDecision::NoImprovement { wait: 1 });
        assert_eq!(es.observe(3, 0.6, || 3), StopDecision::Improved);
        assert_eq!(es.observe(4, 0.5, || 4), StopDecision::NoImprovement { wait: 1 });
        assert_eq!(es.best_score(), Some(0.6));
    }

    #[test]
    fn test_min_delta() {
        let mut es = EarlyStopping::new(3).with_min_delta(0.05);
        es.observe(1, 0.70, || 1);
        assert_eq!(es.observe(2, 0.74, || 2), StopDecision::NoImprovement { wait: 1 });
        assert_eq!(es.observe(3, 0.76, || 3), StopDecision::Improved);
    }

    #[test]
    fn test_nan_never_improves() {
        let mut es = EarlyStopping::new(3);
        es.observe(1, 0.6, || 1);
        assert_eq!(es.observe(2, f64::NAN, || 2), StopDecision::NoImprovement { wait: 1 });
        assert_eq!(es.best_epoch(), Some(1));
    }

    #[test]
    fn test_nan_first_epoch_is_replaced_by_real_score() {
        let mut es = EarlyStopping::new(3);
        assert_eq!(es.observe(1, f64::NAN, || 1), StopDecision::Improved);
        assert_eq!(es.observe(2, 0.1, || 2), StopDecision::Improved);
        assert_eq!(es.best_epoch(), Some(2));
    }

    #[test]
    fn test_snapshot_only_taken_on_improvement() {
        let mut es = EarlyStopping::new(5);
        let mut taken = Vec::new();
        for (epoch, score) in [(1, 0.5), (2, 0.4), (3, 0.6)] {
            es.observe(epoch, score, || {
                taken.push(epoch);
                epoch
            });
        }
        assert_eq!(taken, vec![1, 3]);
    }
}
