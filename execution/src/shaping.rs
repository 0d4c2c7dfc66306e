//! Curves mapping a value ratio (nominally in `[0, 1]`) to a raffle weight.

use giftdraw_types::ShapingFunctionKind;

// Calibration of the SIGMOID kind. Only the upper half of the logistic curve
// is used (x >= 0 gives outputs in [0.5, 1)), so it is rescaled from
// [SIGMOID_MIN, SIGMOID_MAX] onto [0, 1].
const SIGMOID_SLOPE: f64 = 5.0;
const SIGMOID_MIN: f64 = 0.5;
const SIGMOID_MAX: f64 = 1.0;

pub fn linear(x: f64) -> f64 {
    x
}

pub fn quadratic(x: f64) -> f64 {
    x.powi(2)
}

/// Logistic curve `1 / (1 + e^(-slope * x))`.
pub fn sigmoid(x: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (-slope * x).exp())
}

/// Logistic curve rescaled so that `min` maps to 0 and `max` maps to 1.
pub fn normalized_sigmoid(x: f64, slope: f64, min: f64, max: f64) -> f64 {
    (sigmoid(x, slope) - min) / (max - min)
}

/// Evaluate the curve selected by `kind` at `ratio`.
pub fn shape(ratio: f64, kind: ShapingFunctionKind) -> f64 {
    match kind {
        ShapingFunctionKind::Linear => linear(ratio),
        ShapingFunctionKind::Quadratic => quadratic(ratio),
        ShapingFunctionKind::Sigmoid => {
            normalized_sigmoid(ratio, SIGMOID_SLOPE, SIGMOID_MIN, SIGMOID_MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_linear_and_quadratic() {
        assert_eq!(shape(0.5, ShapingFunctionKind::Linear), 0.5);
        assert_eq!(shape(0.5, ShapingFunctionKind::Quadratic), 0.25);
        assert_eq!(shape(2.0, ShapingFunctionKind::Quadratic), 4.0);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert!((sigmoid(0.0, SIGMOID_SLOPE) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_normalized_sigmoid_range() {
        // Origin maps to 0 after normalization.
        assert!(shape(0.0, ShapingFunctionKind::Sigmoid).abs() < EPSILON);

        // At the limit (ratio 1) the curve is close to, but below, 1.
        let at_limit = shape(1.0, ShapingFunctionKind::Sigmoid);
        let expected = (1.0 / (1.0 + (-5.0f64).exp()) - 0.5) / 0.5;
        assert!((at_limit - expected).abs() < EPSILON);
        assert!(at_limit > 0.98 && at_limit < 1.0);
    }

    #[test]
    fn test_sigmoid_is_monotonic() {
        let mut previous = shape(0.0, ShapingFunctionKind::Sigmoid);
        for step in 1..=20 {
            let value = shape(step as f64 / 20.0, ShapingFunctionKind::Sigmoid);
            assert!(value > previous);
            previous = value;
        }
    }
}
