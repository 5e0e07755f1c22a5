use glam::{IVec3, Vec3};

/// Lattice offsets of a line leaving the origin along `direction`.
///
/// `driving` advances by exactly one cell per step, so the result holds
/// `steps` points starting at the origin and consecutive points are
/// neighbours. `direction[driving]` must be the largest component in
/// magnitude and non-zero.
pub(crate) fn trace(direction: Vec3, driving: usize, steps: usize) -> Vec<IVec3> {
    if steps == 0 {
        return Vec::new();
    }
    let lead = direction[driving];
    debug_assert!(lead != 0.0, "driving component of {direction} is zero");

    let span = (steps - 1) as i32;
    let mut end = IVec3::ZERO;
    for axis in 0..3 {
        end[axis] = if axis == driving {
            if lead > 0.0 {
                span
            } else {
                -span
            }
        } else {
            (direction[axis] / lead.abs() * span as f32).round() as i32
        };
    }
    line(end, driving)
}

/// Integer 3D Bresenham from the origin to `end`
fn line(end: IVec3, driving: usize) -> Vec<IVec3> {
    let delta = end.abs();
    let step = end.signum();
    let long = delta[driving];

    let mut errors = IVec3::ZERO;
    for axis in 0..3 {
        errors[axis] = 2 * delta[axis] - long;
    }

    let mut points = Vec::with_capacity(long as usize + 1);
    let mut p = IVec3::ZERO;
    points.push(p);
    for _ in 0..long {
        p[driving] += step[driving];
        for axis in (0..3).filter(|&axis| axis != driving) {
            if errors[axis] > 0 {
                p[axis] += step[axis];
                errors[axis] -= 2 * long;
            }
            errors[axis] += 2 * delta[axis];
        }
        points.push(p);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_line() {
        let points = trace(Vec3::NEG_Y, 1, 4);
        assert_eq!(
            points,
            vec![
                IVec3::ZERO,
                IVec3::new(0, -1, 0),
                IVec3::new(0, -2, 0),
                IVec3::new(0, -3, 0)
            ]
        );
    }

    #[test]
    fn test_steps_are_adjacent_and_end_on_target() {
        let direction = Vec3::new(0.3, -0.9, 0.6).normalize();
        let points = trace(direction, 1, 10);
        assert_eq!(points.len(), 10);
        for pair in points.windows(2) {
            let d = (pair[1] - pair[0]).abs();
            assert_eq!(d.y, 1);
            assert!(d.x <= 1 && d.z <= 1);
        }
        let last = points[9];
        assert_eq!(last.y, -9);
        assert_eq!(last.x, (0.3f32 / 0.9 * 9.0).round() as i32);
        assert_eq!(last.z, (0.6f32 / 0.9 * 9.0).round() as i32);
    }

    #[test]
    fn test_single_step_is_origin() {
        assert_eq!(trace(Vec3::X, 0, 1), vec![IVec3::ZERO]);
        assert!(trace(Vec3::X, 0, 0).is_empty());
    }
}
