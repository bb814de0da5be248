use crate::config::{TransitionTimings, ZoomLimits};

/// Pan/zoom transform from map coordinates to screen coordinates:
/// `screen = translate + scale * map`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.translate_x) / self.scale,
            (sy - self.translate_y) / self.scale,
        )
    }

    /// Same transform rescaled to `scale` with the screen point `(cx, cy)` fixed.
    pub fn scaled_about(&self, scale: f64, cx: f64, cy: f64) -> Self {
        let (mx, my) = self.invert(cx, cy);
        Self {
            scale,
            translate_x: cx - mx * scale,
            translate_y: cy - my * scale,
        }
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!(
            "translate({:.3},{:.3}) scale({:.4})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        Self {
            scale: self.scale + (to.scale - self.scale) * t,
            translate_x: self.translate_x + (to.translate_x - self.translate_x) * t,
            translate_y: self.translate_y + (to.translate_y - self.translate_y) * t,
        }
    }
}

/// An eased move between two transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformTransition {
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub start_time: f64,
    pub duration: f64, // milliseconds
}

impl TransformTransition {
    /// Interpolated transform, or `None` once the transition has finished.
    pub fn sample(&self, now: f64) -> Option<ViewTransform> {
        let elapsed = now - self.start_time;
        if self.duration <= 0.0 || elapsed >= self.duration {
            return None;
        }
        let t = cubic_in_out((elapsed / self.duration).max(0.0));
        Some(self.from.lerp(&self.to, t))
    }
}

fn cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Drop float noise from repeated step arithmetic.
fn tidy(v: f64) -> f64 {
    (v * 1e9).round() / 1e9
}

/// Owns the view transform. Programmatic zooms animate; gestures apply directly.
#[derive(Debug, Clone)]
pub struct ViewportController {
    limits: ZoomLimits,
    timings: TransitionTimings,
    /// Transform currently on screen.
    current: ViewTransform,
    /// Where the view settles once any transition ends.
    target: ViewTransform,
    transition: Option<TransformTransition>,
    width: f64,
    height: f64,
}

impl ViewportController {
    pub fn new(limits: ZoomLimits, timings: TransitionTimings, initial_scale: f64) -> Self {
        let start = ViewTransform {
            scale: limits.clamp(initial_scale),
            ..ViewTransform::IDENTITY
        };
        Self {
            limits,
            timings,
            current: start,
            target: start,
            transition: None,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Scale the view settles on; drives the external slider.
    pub fn current_scale(&self) -> f64 {
        self.target.scale
    }

    pub fn transform(&self) -> ViewTransform {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    fn animate_to(&mut self, to: ViewTransform, duration: f64, now: f64) {
        self.target = to;
        self.transition = Some(TransformTransition {
            from: self.current,
            to,
            start_time: now,
            duration,
        });
    }

    /// Clamp `scale` to the zoom limits and animate toward it around the
    /// viewport center. Returns the clamped scale.
    pub fn zoom_to(&mut self, scale: f64, now: f64) -> f64 {
        let scale = self.limits.clamp(scale);
        let (cx, cy) = self.center();
        let to = self.target.scaled_about(scale, cx, cy);
        self.animate_to(to, self.timings.zoom_ms, now);
        tracing::debug!(scale, "zoom");
        scale
    }

    /// `zoom_to(current_scale + delta)`.
    pub fn zoom_by(&mut self, delta: f64, now: f64) -> f64 {
        let next = tidy(self.current_scale() + delta);
        self.zoom_to(next, now)
    }

    pub fn zoom_in(&mut self, now: f64) -> f64 {
        self.zoom_by(self.limits.step, now)
    }

    pub fn zoom_out(&mut self, now: f64) -> f64 {
        self.zoom_by(-self.limits.step, now)
    }

    /// Animate back to the identity transform.
    pub fn reset_zoom(&mut self, now: f64) {
        self.animate_to(ViewTransform::IDENTITY, self.timings.reset_ms, now);
    }

    /// Drag gesture: move by a screen-space delta immediately.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transition = None;
        self.current.translate_x += dx;
        self.current.translate_y += dy;
        self.target = self.current;
    }

    /// Pinch gesture: multiply the scale by `factor` keeping `(cx, cy)` fixed.
    /// Returns the resulting scale.
    pub fn pinch(&mut self, factor: f64, cx: f64, cy: f64) -> f64 {
        if !(factor.is_finite() && factor > 0.0) {
            return self.current.scale;
        }
        self.transition = None;
        let scale = self.limits.clamp(self.current.scale * factor);
        self.current = self.current.scaled_about(scale, cx, cy);
        self.target = self.current;
        scale
    }

    /// Advance any running transition. Returns `true` while more frames are needed.
    pub fn tick(&mut self, now: f64) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };
        match transition.sample(now) {
            Some(t) => {
                self.current = t;
                true
            }
            None => {
                self.current = transition.to;
                self.transition = None;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ViewportController {
        let mut c =
            ViewportController::new(ZoomLimits::default(), TransitionTimings::default(), 1.0);
        c.set_viewport_size(800.0, 600.0);
        c
    }

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual} (diff: {diff})");
    }

    #[test]
    fn zoom_to_clamps_to_limits() {
        let mut c = controller();
        assert_eq!(c.zoom_to(0.1, 0.0), 0.4);
        assert_eq!(c.current_scale(), 0.4);
        assert_eq!(c.zoom_to(9.0, 0.0), 4.0);
        assert_eq!(c.current_scale(), 4.0);
        assert_eq!(c.zoom_to(0.4, 0.0), 0.4);
        assert_eq!(c.zoom_to(4.0, 0.0), 4.0);
    }

    #[test]
    fn zoom_by_steps_and_saturates_at_max() {
        let mut c = controller();
        assert_eq!(c.zoom_by(0.2, 0.0), 1.2);
        for _ in 0..30 {
            c.zoom_by(0.2, 0.0);
        }
        assert_eq!(c.current_scale(), 4.0);
        assert_eq!(c.zoom_by(0.2, 0.0), 4.0);
    }

    #[test]
    fn zoom_out_saturates_at_min() {
        let mut c = controller();
        for _ in 0..10 {
            c.zoom_out(0.0);
        }
        assert_eq!(c.current_scale(), 0.4);
    }

    #[test]
    fn zoom_keeps_viewport_center_fixed() {
        let mut c = controller();
        c.zoom_to(2.0, 0.0);
        while c.tick(1_000.0) {}
        let t = c.transform();
        assert_eq!(t.scale, 2.0);
        let (mx, my) = t.invert(400.0, 300.0);
        assert_close(mx, 400.0);
        assert_close(my, 300.0);
    }

    #[test]
    fn transition_eases_and_finishes_on_target() {
        let mut c = controller();
        c.zoom_to(2.0, 100.0);
        assert!(c.is_animating());

        assert!(c.tick(250.0));
        let mid = c.transform().scale;
        assert!(mid > 1.0 && mid < 2.0, "mid-transition scale {mid}");

        assert!(!c.tick(400.0));
        assert_eq!(c.transform().scale, 2.0);
        assert!(!c.is_animating());
    }

    #[test]
    fn reset_returns_to_identity_over_longer_duration() {
        let mut c = controller();
        c.pan_by(30.0, -12.0);
        c.zoom_to(3.0, 0.0);
        while c.tick(500.0) {}
        c.reset_zoom(1_000.0);
        assert!(c.tick(1_500.0));
        assert!(!c.tick(2_000.0));
        assert_eq!(c.transform(), ViewTransform::IDENTITY);
        assert_eq!(c.current_scale(), 1.0);
    }

    #[test]
    fn gestures_cancel_transitions_and_update_scale() {
        let mut c = controller();
        c.zoom_to(3.0, 0.0);
        c.pan_by(10.0, 5.0);
        assert!(!c.is_animating());
        assert_eq!(c.current_scale(), c.transform().scale);

        let scale = c.pinch(100.0, 0.0, 0.0);
        assert_eq!(scale, 4.0);
        assert_eq!(c.current_scale(), 4.0);
    }

    #[test]
    fn pinch_keeps_midpoint_fixed() {
        let mut c = controller();
        let before = c.transform().invert(120.0, 80.0);
        c.pinch(1.5, 120.0, 80.0);
        let after = c.transform().invert(120.0, 80.0);
        assert_close(before.0, after.0);
        assert_close(before.1, after.1);
    }

    #[test]
    fn initial_scale_is_clamped() {
        let c = ViewportController::new(ZoomLimits::default(), TransitionTimings::default(), 10.0);
        assert_eq!(c.current_scale(), 4.0);
        assert_eq!(c.transform().translate_x, 0.0);
    }

    #[test]
    fn svg_transform_string() {
        let t = ViewTransform {
            scale: 1.5,
            translate_x: -10.0,
            translate_y: 4.25,
        };
        assert_eq!(t.to_svg(), "translate(-10.000,4.250) scale(1.5000)");
    }
}
