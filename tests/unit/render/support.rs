#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::design::snapshot::{BlendMode, DesignSnapshot};
use crate::foundation::core::{Affine, Point, Rect, Rgba8};
use crate::foundation::error::{FormatizerError, FormatizerResult};
use crate::render::batch::CancelToken;
use crate::render::host::{ExportSettings, ExportedBitmap, PreviewHandle, RenderHost, SceneSurface};
use crate::text::fonts::ShapedLine;
use crate::text::measure::{FixedAdvanceMeasurer, FontSpec, TextMeasurer};

/// Everything the fake host and its surfaces were asked to do.
#[derive(Debug, Default)]
pub struct Recorder {
    pub fonts_ready: Vec<usize>,
    pub shaped: Vec<String>,
    pub surfaces_created: usize,
    pub surfaces_released: usize,
    pub rects: usize,
    pub rounded_rects: usize,
    pub images: usize,
    pub layers: usize,
    pub glyph_runs: usize,
    pub exports: usize,
}

/// Host that measures with a fixed advance and records draw calls instead of painting.
pub struct FakeHost {
    pub log: Rc<RefCell<Recorder>>,
    measurer: FixedAdvanceMeasurer,
    pub export_none: bool,
    pub fail_fonts: bool,
    pub trip_on_fonts_ready: Option<CancelToken>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            log: Rc::default(),
            measurer: FixedAdvanceMeasurer::new(0.5),
            export_none: false,
            fail_fonts: false,
            trip_on_fonts_ready: None,
        }
    }

    pub fn log(&self) -> std::cell::Ref<'_, Recorder> {
        self.log.borrow()
    }
}

impl TextMeasurer for FakeHost {
    fn line_width(&mut self, text: &str, font: &FontSpec) -> f32 {
        self.measurer.line_width(text, font)
    }
}

impl RenderHost for FakeHost {
    type Surface = FakeSurface;

    fn fonts_ready(&mut self, fonts: &[FontSpec]) -> FormatizerResult<()> {
        self.log.borrow_mut().fonts_ready.push(fonts.len());
        if let Some(token) = &self.trip_on_fonts_ready {
            token.cancel();
        }
        if self.fail_fonts && !fonts.is_empty() {
            return Err(FormatizerError::asset("fonts unavailable"));
        }
        Ok(())
    }

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
        pixel_ratio: f64,
    ) -> FormatizerResult<FakeSurface> {
        self.log.borrow_mut().surfaces_created += 1;
        Ok(FakeSurface {
            width,
            height,
            pixel_ratio,
            export_none: self.export_none,
            log: Rc::clone(&self.log),
        })
    }

    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FormatizerResult<ShapedLine> {
        self.log.borrow_mut().shaped.push(text.to_string());
        let advance = font.size_px * self.measurer.advance_em();
        let glyphs = text
            .chars()
            .enumerate()
            .map(|(i, _)| vello_cpu::Glyph {
                id: 0,
                x: i as f32 * advance,
                y: 0.0,
            })
            .collect::<Vec<_>>();
        Ok(ShapedLine {
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(Vec::<u8>::new()),
                0,
            ),
            font_size: font.size_px,
            width: self.measurer.line_width(text, font),
            glyphs,
            ascent: font.size_px * 0.8,
            descent: font.size_px * 0.2,
        })
    }
}

pub struct FakeSurface {
    width: u32,
    height: u32,
    pixel_ratio: f64,
    export_none: bool,
    log: Rc<RefCell<Recorder>>,
}

impl Drop for FakeSurface {
    fn drop(&mut self) {
        self.log.borrow_mut().surfaces_released += 1;
    }
}

impl SceneSurface for FakeSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) -> FormatizerResult<()> {
        self.log.borrow_mut().rects += 1;
        Ok(())
    }

    fn fill_rounded_rect(&mut self, _rect: Rect, _radius: f64, _color: Rgba8) -> FormatizerResult<()> {
        self.log.borrow_mut().rounded_rects += 1;
        Ok(())
    }

    fn draw_image(&mut self, _image: &DecodedImage, _transform: Affine) -> FormatizerResult<()> {
        self.log.borrow_mut().images += 1;
        Ok(())
    }

    fn layer_size(&self) -> (u32, u32) {
        (4, 4)
    }

    fn composite_layer(
        &mut self,
        rgba8_premul: &[u8],
        _blend: BlendMode,
        _opacity: f32,
    ) -> FormatizerResult<()> {
        assert_eq!(rgba8_premul.len(), 4 * 4 * 4);
        self.log.borrow_mut().layers += 1;
        Ok(())
    }

    fn fill_glyphs(
        &mut self,
        _line: &ShapedLine,
        _baseline_origin: Point,
        _color: Rgba8,
    ) -> FormatizerResult<()> {
        self.log.borrow_mut().glyph_runs += 1;
        Ok(())
    }

    fn export(&mut self, settings: &ExportSettings) -> FormatizerResult<Option<ExportedBitmap>> {
        self.log.borrow_mut().exports += 1;
        if self.export_none {
            return Ok(None);
        }
        Ok(Some(ExportedBitmap {
            bytes: vec![0xAB; 8],
            width: (f64::from(self.width) * self.pixel_ratio) as u32,
            height: (f64::from(self.height) * self.pixel_ratio) as u32,
            format: settings.format,
        }))
    }

    fn preview(&mut self, max_edge: u32) -> FormatizerResult<Option<PreviewHandle>> {
        if max_edge == 0 {
            return Ok(None);
        }
        Ok(Some(PreviewHandle {
            width: 1,
            height: 1,
            rgba8: Arc::new(vec![0, 0, 0, 255]),
        }))
    }
}

/// Copy with a tagline, a three-line headline, a long body and a button.
pub fn campaign_snapshot() -> DesignSnapshot {
    let mut s = DesignSnapshot::default();
    s.content.tagline = "NEW SEASON".into();
    s.content.headline =
        "Summer sale starts today across every single store nationwide tonight".into();
    s.content.body = vec!["wording"; 77].join(" ");
    s.content.button_text = "Shop now".into();
    s.content.show_button = true;
    s
}

/// 2x2 opaque PNG.
pub fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
