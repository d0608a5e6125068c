/// Asserts that a velocity's magnitude lies inside a `VelocityRange`, with a
/// small tolerance for normalization error.
#[macro_export]
macro_rules! assert_speed_in_range {
    ($velocity:expr, $range:expr) => {
        let speed = $velocity.length();
        assert!(
            speed >= $range.min - 1e-4 && speed <= $range.max + 1e-4,
            "Speed {} outside [{}, {}]",
            speed,
            $range.min,
            $range.max
        );
    };
}

/// Asserts that two vectors are component-wise within `$eps`.
#[macro_export]
macro_rules! assert_vec_close {
    ($a:expr, $b:expr, $eps:expr) => {
        let (a, b) = ($a, $b);
        assert!(
            a.abs_diff_eq(b, $eps),
            "Vectors differ: {:?} vs {:?} (eps {})",
            a,
            b,
            $eps
        );
    };
}
