use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How many intervals a cursor will scan forward before falling back to a
/// binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in.
///
/// A bake sweeps time strictly forward at a fixed step, so consecutive
/// samples land in the same interval or the next few. The cursor turns that
/// into an O(1) forward scan; an out-of-range time (or a stale cursor) falls
/// back to a full binary search.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// A keyframe curve over one value type.
///
/// For `CubicSpline`, `values` holds (in-tangent, value, out-tangent)
/// triplets, so its length is `times.len() * 3`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Samples the track at `time` with a binary search.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        assert!(!self.times.is_empty(), "track has no keyframes");

        // partition_point returns the first index with t > time, i.e. the
        // index after the interval containing `time`.
        let next_idx = self.times.partition_point(|&t| t <= time);
        let idx = next_idx.saturating_sub(1);
        self.sample_interval(idx, time)
    }

    /// Samples the track at `time`, advancing `cursor`.
    ///
    /// Bake sampling is monotone, so the interval is found by scanning at
    /// most [`MAX_SCAN_OFFSET`] intervals past the cursor; anything else
    /// (first sample of a new bake, cursor from another clip) takes the
    /// binary-search path and re-seats the cursor.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        assert!(!self.times.is_empty(), "track has no keyframes");

        let len = self.times.len();
        if len == 1 {
            return *self.value_at(0);
        }

        let start = cursor.last_index.min(len - 1);
        let mut found = None;

        if time >= self.times[start] {
            for idx in start..=(start + MAX_SCAN_OFFSET).min(len - 1) {
                if idx == len - 1 {
                    // Past the last keyframe: clamp.
                    found = Some(idx);
                    break;
                }
                if time < self.times[idx + 1] {
                    found = Some(idx);
                    break;
                }
            }
        }

        let idx = match found {
            Some(idx) => idx,
            None => {
                let next_idx = self.times.partition_point(|&t| t <= time);
                next_idx.saturating_sub(1)
            }
        };

        cursor.last_index = idx;
        self.sample_interval(idx, time)
    }

    /// Value accessor that hides the CubicSpline triplet layout.
    fn value_at(&self, index: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[index * 3 + 1],
            _ => &self.values[index],
        }
    }

    fn sample_interval(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        // No next keyframe: clamp to the last value. Times before the first
        // keyframe also land here via index 0 with t clamped to 0.
        if index >= len - 1 {
            return *self.value_at(len - 1);
        }

        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => *self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(*self.value_at(index), *self.value_at(index + 1), t)
            }
            InterpolationMode::CubicSpline => {
                let i0 = index * 3;
                let i1 = (index + 1) * 3;

                let v0 = self.values[i0 + 1];
                let out_tangent0 = self.values[i0 + 2];
                let in_tangent1 = self.values[i1];
                let v1 = self.values[i1 + 1];

                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
            }
        }
    }
}
