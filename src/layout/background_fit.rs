use crate::design::snapshot::ImageTransform;
use crate::foundation::core::{Affine, Rect};

/// Placement of a background image node on a target canvas.
///
/// The node is `width × height` in local units. A local point `p` maps to
/// `(x, y) + diag(scale_x, 1) * (p - (offset_x, offset_y))` on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// `1.0`, or `-1.0` when horizontally flipped.
    pub scale_x: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl CoverFit {
    /// Node exactly covering the target with no transform.
    pub fn identity(target_w: f64, target_h: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: target_w,
            height: target_h,
            scale_x: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Mirror about the vertical centre line of a `target_w` wide canvas. Applying it twice
    /// returns the original placement.
    pub fn mirrored(&self, target_w: f64) -> Self {
        Self {
            x: target_w - self.x,
            scale_x: -self.scale_x,
            ..*self
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.scale_x < 0.0
    }

    /// Canvas-space rectangle the image covers.
    pub fn covered_rect(&self) -> Rect {
        let x0 = if self.is_flipped() {
            self.x + self.offset_x - self.width
        } else {
            self.x - self.offset_x
        };
        let y0 = self.y - self.offset_y;
        Rect::new(x0, y0, x0 + self.width, y0 + self.height)
    }

    /// Node-local to canvas transform.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::scale_non_uniform(self.scale_x, 1.0)
            * Affine::translate((-self.offset_x, -self.offset_y))
    }

    /// Image-pixel to canvas transform for a bitmap of `image_w × image_h` pixels.
    pub fn image_affine(&self, image_w: f64, image_h: f64) -> Affine {
        if image_w <= 0.0 || image_h <= 0.0 {
            return self.to_affine();
        }
        self.to_affine() * Affine::scale_non_uniform(self.width / image_w, self.height / image_h)
    }
}

/// Cover-fit an image of natural size `image_w × image_h` onto a `target_w × target_h` canvas.
///
/// The image is scaled so it fills the target on both axes, multiplied by the user's zoom (never
/// below 1.0), and centred. The pan was authored against a `source_w × source_h` canvas and is
/// re-projected proportionally onto the target. An image without a natural size yet yields
/// [`CoverFit::identity`].
pub fn compute_fit(
    image_w: f64,
    image_h: f64,
    target_w: f64,
    target_h: f64,
    transform: &ImageTransform,
    source_w: f64,
    source_h: f64,
) -> CoverFit {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(image_w) || !usable(image_h) || !usable(target_w) || !usable(target_h) {
        return CoverFit::identity(target_w, target_h);
    }

    let image_ratio = image_w / image_h;
    let target_ratio = target_w / target_h;
    let cover = if image_ratio > target_ratio {
        target_h / image_h
    } else {
        target_w / image_w
    };

    let zoom = if transform.scale.is_finite() {
        transform.scale.max(1.0)
    } else {
        1.0
    };
    let width = image_w * cover * zoom;
    let height = image_h * cover * zoom;

    let reproject = |pos: f64, source: f64, target: f64| {
        if usable(source) && pos.is_finite() {
            pos / source * target
        } else {
            0.0
        }
    };

    let fit = CoverFit {
        x: reproject(transform.position_x, source_w, target_w),
        y: reproject(transform.position_y, source_h, target_h),
        width,
        height,
        scale_x: 1.0,
        offset_x: (width - target_w) / 2.0,
        offset_y: (height - target_h) / 2.0,
    };

    if transform.flip_x {
        fit.mirrored(target_w)
    } else {
        fit
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/background_fit.rs"]
mod tests;
