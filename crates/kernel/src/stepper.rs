/// Fixed-timestep accumulator.
///
/// Elapsed wall time is collected and drained in whole `interval` chunks, so
/// the simulation sees the same number of steps however the frame deltas are
/// split. What is left over, as a fraction of one interval, is the render
/// interpolation factor.
#[derive(Debug, Clone)]
pub struct FixedStep {
    interval: f64,
    accumulator: f64,
    render_owed: bool,
}

impl FixedStep {
    /// Stepper running `ups` updates per simulated second. `ups` must be non-zero.
    pub fn new(ups: u32) -> Self {
        Self {
            interval: 1.0 / f64::from(ups.max(1)),
            accumulator: 0.0,
            render_owed: false,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Add `delta` seconds and run `on_step(interval)` once per whole interval
    /// available. Returns the number of steps taken.
    pub fn advance(&mut self, delta: f64, mut on_step: impl FnMut(f64)) -> u32 {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= self.interval {
            on_step(self.interval);
            self.accumulator -= self.interval;
            self.render_owed = true;
            steps += 1;
        }
        steps
    }

    /// Progress toward the next step, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.interval).clamp(0.0, 1.0 - f64::EPSILON)
    }

    /// Whether a step ran since the last call, clearing the flag.
    pub fn take_render_owed(&mut self) -> bool {
        std::mem::take(&mut self.render_owed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn run(deltas: &[f64]) -> (FixedStep, u32) {
        let mut stepper = FixedStep::new(60);
        let mut total = 0;
        for &d in deltas {
            total += stepper.advance(d, |_| {});
        }
        (stepper, total)
    }

    #[test]
    fn steps_are_exact_intervals() {
        let mut stepper = FixedStep::new(60);
        let mut seen = Vec::new();
        stepper.advance(0.05, |dt| seen.push(dt));
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&dt| dt == 1.0 / 60.0));
    }

    #[test]
    fn step_count_matches_total_time_for_irregular_deltas() {
        let deltas = [0.001, 0.033, 0.016, 0.1, 0.0, 0.007, 0.05, 0.0167, 0.2, 0.013];
        let total: f64 = deltas.iter().sum();
        let (stepper, steps) = run(&deltas);

        let interval = stepper.interval();
        let expected = (total / interval).floor() as i64;
        assert!((i64::from(steps) - expected).abs() <= 1);

        let remainder = total - f64::from(steps) * interval;
        assert!((stepper.accumulator() - remainder).abs() < TOLERANCE);
        assert!(stepper.accumulator() >= 0.0 && stepper.accumulator() < interval);
    }

    #[test]
    fn chunking_does_not_change_step_count() {
        let (_, one_big) = run(&[1.0]);
        let small = vec![0.001; 1000];
        let (_, many_small) = run(&small);
        assert!((i64::from(one_big) - i64::from(many_small)).abs() <= 1);
        assert!((i64::from(one_big) - 60).abs() <= 1);
    }

    #[test]
    fn alpha_stays_in_unit_interval() {
        let mut stepper = FixedStep::new(60);
        for i in 0..500 {
            let delta = (i % 7) as f64 * 0.0049 + (i % 3) as f64 * 0.011;
            stepper.advance(delta, |_| {});
            let alpha = stepper.alpha();
            assert!((0.0..1.0).contains(&alpha), "alpha {alpha} out of range");
        }
    }

    #[test]
    fn alpha_is_fraction_of_interval() {
        let mut stepper = FixedStep::new(50);
        stepper.advance(0.03, |_| {});
        assert!((stepper.alpha() - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn render_owed_only_after_a_step() {
        let mut stepper = FixedStep::new(60);
        stepper.advance(0.001, |_| {});
        assert!(!stepper.take_render_owed());
        stepper.advance(0.02, |_| {});
        assert!(stepper.take_render_owed());
        assert!(!stepper.take_render_owed());
    }
}
