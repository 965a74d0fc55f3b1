use serde::Serialize;

use crate::config::ViewportConfig;

/// Pan and zoom applied to the whole scene. Both the connector layer and the
/// card layer are drawn with the same transform so they never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    /// Scene point to screen point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.pan_x, y * self.scale + self.pan_y)
    }

    /// Screen point back to scene coordinates.
    pub fn screen_to_scene(&self, x: f32, y: f32) -> (f32, f32) {
        let scale = if self.scale.abs() > f32::EPSILON {
            self.scale
        } else {
            1.0
        };
        ((x - self.pan_x) / scale, (y - self.pan_y) / scale)
    }

    pub fn to_svg(&self) -> String {
        format!(
            "translate({} {}) scale({})",
            fmt_num(self.pan_x),
            fmt_num(self.pan_y),
            fmt_num(self.scale)
        )
    }
}

fn fmt_num(value: f32) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        // Avoids "-0" in the output.
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer position minus pan at the moment the drag started.
    Dragging { start_x: f32, start_y: f32 },
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    transform: ViewTransform,
    state: DragState,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        let config = if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "invalid viewport config, using defaults");
            ViewportConfig::default()
        } else {
            config
        };
        Self {
            config,
            transform: ViewTransform::IDENTITY,
            state: DragState::Idle,
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging {
            start_x: x - self.transform.pan_x,
            start_y: y - self.transform.pan_y,
        };
    }

    /// Returns whether the pan changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let DragState::Dragging { start_x, start_y } = self.state else {
            return false;
        };
        let (pan_x, pan_y) = (x - start_x, y - start_y);
        if !pan_x.is_finite() || !pan_y.is_finite() {
            return false;
        }
        let changed = pan_x != self.transform.pan_x || pan_y != self.transform.pan_y;
        self.transform.pan_x = pan_x;
        self.transform.pan_y = pan_y;
        changed
    }

    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.transform.scale * self.config.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.transform.scale * self.config.zoom_out_factor)
    }

    /// Wheel zoom: scrolling down (positive delta) zooms out.
    pub fn wheel(&mut self, delta_y: f32) -> f32 {
        let factor = if delta_y > 0.0 {
            self.config.wheel_out_factor
        } else {
            self.config.wheel_in_factor
        };
        self.set_scale(self.transform.scale * factor)
    }

    pub fn set_scale(&mut self, scale: f32) -> f32 {
        if scale.is_finite() {
            self.transform.scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        }
        self.transform.scale
    }

    pub fn reset(&mut self) {
        self.transform = ViewTransform::IDENTITY;
        self.state = DragState::Idle;
    }

    pub fn set_pan(&mut self, pan_x: f32, pan_y: f32) {
        if pan_x.is_finite() && pan_y.is_finite() {
            self.transform.pan_x = pan_x;
            self.transform.pan_y = pan_y;
        }
    }
}
