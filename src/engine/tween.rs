use eframe::egui::Vec2;

pub trait Lerp: Clone {
    fn lerp(&self, to: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        *self + (*to - *self) * t
    }
}

impl<T: Lerp> Lerp for Vec<T> {
    /// Element-wise; extra elements on either side are taken from `to`.
    fn lerp(&self, to: &Self, t: f32) -> Self {
        to.iter()
            .enumerate()
            .map(|(i, end)| match self.get(i) {
                Some(start) => Lerp::lerp(start, end, t),
                None => end.clone(),
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Interpolation between two values over engine time.
#[derive(Clone, Debug)]
pub struct Tween<T> {
    pub start_time: f64,
    pub duration: f32,
    pub start_values: T,
    pub end_values: T,
    pub easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(start_time: f64, duration: f32, start_values: T, end_values: T) -> Self {
        Self {
            start_time,
            duration,
            start_values,
            end_values,
            easing: Easing::CubicOut,
        }
    }

    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now - self.start_time) / self.duration as f64) as f32).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: f64) -> T {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.end_values.clone();
        }
        let t = self.easing.apply(progress);
        Lerp::lerp(&self.start_values, &self.end_values, t)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}
