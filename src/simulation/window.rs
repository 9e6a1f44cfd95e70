/// Fixed-capacity ring of recent (humidity, temperature) samples.
///
/// Pushing into a full window overwrites the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: Vec<(f64, f64)>,
    capacity: usize,
    /// Slot the next push writes to once the buffer is full.
    next: usize,
}

impl RollingWindow {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity.min(4096)),
            capacity,
            next: 0,
        }
    }

    pub fn push(&mut self, humidity: f64, temperature: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push((humidity, temperature));
        } else {
            self.samples[self.next] = (humidity, temperature);
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// Arithmetic mean of (humidity, temperature) over the current contents.
    pub fn mean(&self) -> Option<(f64, f64)> {
        if self.samples.is_empty() {
            return None;
        }
        let n = self.samples.len() as f64;
        let (rh_sum, t_sum) = self
            .samples
            .iter()
            .fold((0.0, 0.0), |(rh, t), &(h, temp)| (rh + h, t + temp));
        Some((rh_sum / n, t_sum / n))
    }

    /// Mean the window would have after pushing this sample, without pushing it.
    pub fn mean_with(&self, humidity: f64, temperature: f64) -> Option<(f64, f64)> {
        let evicted = if self.samples.len() < self.capacity {
            None
        } else {
            Some(self.next)
        };
        let (rh_sum, t_sum) = self
            .samples
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != evicted)
            .fold((humidity, temperature), |(rh, t), (_, &(h, temp))| (rh + h, t + temp));
        let n = (self.samples.len() + 1).min(self.capacity) as f64;
        Some((rh_sum / n, t_sum / n))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_partial_window() {
        let mut w = RollingWindow::new(4);
        assert_eq!(w.mean(), None);
        w.push(80.0, 20.0);
        w.push(90.0, 10.0);
        assert_eq!(w.len(), 2);
        assert_eq!(w.mean(), Some((85.0, 15.0)));
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut w = RollingWindow::new(3);
        for (rh, t) in [(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0), (50.0, 5.0)] {
            w.push(rh, t);
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.mean(), Some((40.0, 4.0)));
    }

    #[test]
    fn test_mean_with_matches_push_then_mean() {
        let mut w = RollingWindow::new(3);
        for (rh, t) in [(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0)] {
            let expected = {
                let mut pushed = w.clone();
                pushed.push(rh, t);
                pushed.mean()
            };
            assert_eq!(w.mean_with(rh, t), expected);
            w.push(rh, t);
        }
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn test_mean_with_leaves_window_untouched() {
        let mut w = RollingWindow::new(2);
        w.push(80.0, 20.0);
        assert_eq!(w.mean_with(f64::MAX, 20.0).map(|(rh, _)| rh.is_finite()), Some(true));
        assert_eq!(w.len(), 1);
        assert_eq!(w.mean(), Some((80.0, 20.0)));
    }

    #[test]
    fn test_zero_capacity_holds_latest_sample() {
        let mut w = RollingWindow::new(0);
        assert_eq!(w.capacity(), 1);
        w.push(70.0, 18.0);
        w.push(95.0, 30.0);
        assert_eq!(w.mean(), Some((95.0, 30.0)));
    }
}
