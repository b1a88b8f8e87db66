//! Sample value transformations:
//! modality rescale and window level presets.

/// Description of a modality rescale function,
/// defined by a _rescale slope_ and _rescale intercept_.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rescale {
    /// the rescale slope
    pub slope: f64,
    /// the rescale intercept
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Rescale::IDENTITY
    }
}

impl Rescale {
    /// The rescale function which keeps values as they are.
    pub const IDENTITY: Rescale = Rescale {
        slope: 1.0,
        intercept: 0.0,
    };

    /// Create a new rescale function.
    #[inline]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Rescale { slope, intercept }
    }

    /// Apply the rescale function to a value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }

    /// Whether applying the function changes values.
    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }

    /// The function which maps stored values under `self`
    /// to stored values under `target`,
    /// so that both give the same rescaled value.
    ///
    /// The slope of `target` must not be zero.
    pub fn relative_to(&self, target: &Rescale) -> Rescale {
        Rescale {
            slope: self.slope / target.slope,
            intercept: (self.intercept - target.intercept) / target.slope,
        }
    }
}

/// The parameters of a single window level
/// for a VOI LUT transformation,
/// comprising the window center and the window width.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevel {
    /// The _Window Width_.
    ///
    /// Should be greater than 0
    pub width: f64,
    /// The _Window Center_.
    pub center: f64,
}

impl WindowLevel {
    /// Map a rescaled value into a number between `0` and `y_max`,
    /// with the linear function.
    pub fn apply(&self, value: f64, y_max: f64) -> f64 {
        let width = self.width.max(1.);
        let center = self.center - 0.5;
        let x = (value - center) / (width - 1.) + 0.5;
        (x * y_max).clamp(0., y_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_relative_to_target() {
        let source = Rescale::new(2.0, -100.0);
        let target = Rescale::new(4.0, -1024.0);
        let relative = source.relative_to(&target);
        for stored in [0.0, 17.0, 512.0] {
            let normalized = relative.apply(stored);
            assert!((target.apply(normalized) - source.apply(stored)).abs() < 1e-9);
        }
        assert!(Rescale::default().is_identity());
        assert!(Rescale::IDENTITY.relative_to(&Rescale::IDENTITY).is_identity());
    }

    #[test]
    fn window_level_clamps() {
        let window = WindowLevel {
            width: 400.,
            center: 40.,
        };
        assert_eq!(window.apply(-1000., 255.), 0.);
        assert_eq!(window.apply(1000., 255.), 255.);
        let mid = window.apply(40., 255.);
        assert!(mid > 120. && mid < 135.);
    }
}
