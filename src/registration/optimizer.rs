//! Regular-step gradient descent.
//!
//! The optimizer moves a fixed step length along the normalised scaled
//! gradient and shrinks the step every time the gradient direction flips,
//! the classic behaviour of intensity-based registration frameworks. The
//! gradient is estimated by central finite differences, so any cost function
//! that may be undefined (`None`) at some positions can be minimised.

use super::options::OptimizerOptions;
use log::debug;
use nalgebra::DVector;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The step shrank below `min_step`.
    StepTooSmall,
    /// The scaled gradient magnitude dropped below `gradient_tolerance`.
    GradientTolerance,
    MaxIterations,
    /// The cost could not be evaluated around the current position.
    UndefinedCost,
}

#[derive(Clone, Debug)]
pub struct OptimizerOutcome {
    pub position: DVector<f64>,
    /// Cost at `position`; `None` only when the start itself is undefined.
    pub value: Option<f64>,
    pub iterations: usize,
    pub stop_reason: StopReason,
    pub final_step: f64,
}

#[derive(Clone, Debug, Default)]
pub struct RegularStepGradientDescent {
    options: OptimizerOptions,
}

impl RegularStepGradientDescent {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }

    fn scale(&self, i: usize) -> f64 {
        self.options
            .scales
            .get(i)
            .copied()
            .filter(|s| *s > 0.0)
            .unwrap_or(1.0)
    }

    fn gradient<F>(&self, cost: &mut F, x: &DVector<f64>) -> Option<DVector<f64>>
    where
        F: FnMut(&DVector<f64>) -> Option<f64>,
    {
        let mut grad = DVector::zeros(x.len());
        let mut probe = x.clone();
        for i in 0..x.len() {
            let h = self.options.finite_difference / self.scale(i);
            probe[i] = x[i] + h;
            let plus = cost(&probe)?;
            probe[i] = x[i] - h;
            let minus = cost(&probe)?;
            probe[i] = x[i];
            grad[i] = (plus - minus) / (2.0 * h);
        }
        Some(grad)
    }

    /// Minimise `cost` starting from `x0`.
    pub fn minimize<F>(&self, mut cost: F, x0: &DVector<f64>) -> OptimizerOutcome
    where
        F: FnMut(&DVector<f64>) -> Option<f64>,
    {
        let opts = &self.options;
        let mut x = x0.clone();
        let mut step = opts.learning_rate;
        let Some(mut value) = cost(&x) else {
            return OptimizerOutcome {
                position: x,
                value: None,
                iterations: 0,
                stop_reason: StopReason::UndefinedCost,
                final_step: step,
            };
        };

        let mut previous: Option<DVector<f64>> = None;
        let mut stop_reason = StopReason::MaxIterations;
        let mut iterations = 0;
        while iterations < opts.max_iterations {
            iterations += 1;
            let Some(grad) = self.gradient(&mut cost, &x) else {
                stop_reason = StopReason::UndefinedCost;
                break;
            };
            let scaled = DVector::from_fn(x.len(), |i, _| grad[i] / self.scale(i));
            let norm = scaled.norm();
            if !norm.is_finite() || norm < opts.gradient_tolerance {
                stop_reason = StopReason::GradientTolerance;
                break;
            }
            let direction = scaled / norm;
            if previous.as_ref().is_some_and(|p| p.dot(&direction) < 0.0) {
                step *= opts.relaxation_factor;
            }
            if step < opts.min_step {
                stop_reason = StopReason::StepTooSmall;
                break;
            }
            let candidate = DVector::from_fn(x.len(), |i, _| {
                x[i] - step * direction[i] / self.scale(i)
            });
            match cost(&candidate) {
                Some(v) => {
                    x = candidate;
                    value = v;
                    previous = Some(direction);
                }
                // Stepped out of the defined region: shorten and retry.
                None => step *= opts.relaxation_factor,
            }
        }
        debug!(
            "gradient descent: {iterations} iterations, value={value:.6}, step={step:.4}, stop={stop_reason:?}"
        );
        OptimizerOutcome {
            position: x,
            value: Some(value),
            iterations,
            stop_reason,
            final_step: step,
        }
    }
}
