//! Testing helpers.

use assert_float_eq::*;

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_absolute_eq!(expected, actual, epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_epsilon() {
        assert_slice_f64_absolute(&[0.1, 0.2], &[0.1, 0.21], 0.02);
    }

    #[test]
    #[should_panic]
    fn beyond_epsilon() {
        assert_slice_f64_absolute(&[0.1, 0.2], &[0.1, 0.25], 0.02);
    }

    #[test]
    #[should_panic(expected = "lengths do not match: 2 ≠ 1")]
    fn length_mismatch() {
        assert_slice_f64_absolute(&[0.1, 0.2], &[0.1], 0.02);
    }
}
