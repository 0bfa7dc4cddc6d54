/// An axis-aligned face box in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
}

/// Square crop window in frame pixels. May extend past the frame edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropWindow {
    pub x: f64,
    pub y: f64,
    pub side: f64,
}

impl Region {
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Square window centered on the box, with side `scale * max(width, height)`.
    ///
    /// Landmark models are trained on crops with margin around the face,
    /// so the window is deliberately larger than the detector box.
    pub fn square_crop(&self, scale: f64) -> CropWindow {
        let (cx, cy) = self.center();
        let side = self.width.max(self.height) as f64 * scale;
        CropWindow {
            x: cx - side / 2.0,
            y: cy - side / 2.0,
            side,
        }
    }
}
