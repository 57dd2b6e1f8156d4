use core::ops;

use glam::Vec4;

/// Composite Simpson's-rule accumulator over uniformly spaced samples.
///
/// Samples are appended one-by-one, starting at index zero; the first one is
/// kept aside, the remaining ones are bucketed by their index's parity, while
/// the latest one is always remembered as `last`.
///
/// [`Self::integrate()`] requires an even number of intervals (i.e. an odd
/// number of samples, at least three) - [`Self::partial()`] doesn't and can
/// be used to peek at the integral while the samples are still coming.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct SimpsonIntegrator<T> {
    first: T,
    last: T,
    prev: T,
    odd: T,
    even: T,
    count: u32,
}

pub type Integrator = SimpsonIntegrator<f32>;
pub type Integrator4 = SimpsonIntegrator<Vec4>;

impl<T> SimpsonIntegrator<T>
where
    T: ops::Add<Output = T>,
    T: ops::Sub<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: Copy + Default,
{
    pub fn append(&mut self, value: T) {
        if self.count == 0 {
            self.first = value;
        } else if self.count % 2 == 1 {
            self.odd = self.odd + value;
        } else {
            self.even = self.even + value;
        }

        self.prev = self.last;
        self.last = value;
        self.count += 1;
    }

    /// Number of intervals spanned by the samples appended so far.
    pub fn intervals(&self) -> u32 {
        self.count.saturating_sub(1)
    }

    /// Integrates the samples, assuming they are evenly spread across
    /// `distance`.
    pub fn integrate(&self, distance: f32) -> T {
        let intervals = self.intervals();

        debug_assert!(
            intervals == 0 || intervals % 2 == 0,
            "Simpson's rule requires an even number of intervals",
        );

        if intervals == 0 {
            return T::default();
        }

        self.simpson(distance / (intervals as f32))
    }

    /// Integrates the samples appended so far, given the distance between two
    /// consecutive samples.
    ///
    /// For an odd number of intervals, the last interval is integrated with
    /// the trapezoidal rule and the rest with Simpson's rule.
    pub fn partial(&self, step: f32) -> T {
        let intervals = self.intervals();

        if intervals == 0 {
            T::default()
        } else if intervals % 2 == 0 {
            self.simpson(step)
        } else {
            let head = (self.first
                + self.prev
                + (self.odd - self.last) * 4.0
                + (self.even - self.prev) * 2.0)
                * (step / 3.0);

            let tail = (self.prev + self.last) * (step / 2.0);

            head + tail
        }
    }

    fn simpson(&self, step: f32) -> T {
        (self.first
            + self.last
            + self.odd * 4.0
            + (self.even - self.last) * 2.0)
            * (step / 3.0)
    }
}
