use super::*;

#[test]
fn surfaces_scale_by_pixel_ratio() {
    let mut host = CpuHost::default();
    let s = host.create_surface(40, 30, 2.0).unwrap();
    assert_eq!(s.size(), (40, 30));
    assert_eq!(s.layer_size(), (80, 60));
    assert_eq!(s.pixel_ratio(), 2.0);
}

#[test]
fn created_and_released_are_counted() {
    let mut host = CpuHost::default();
    {
        let _a = host.create_surface(8, 8, 1.0).unwrap();
        let _b = host.create_surface(8, 8, 1.0).unwrap();
        assert_eq!(host.stats().live(), 2);
    }
    assert_eq!(
        host.stats(),
        SurfaceStats {
            created: 2,
            released: 2
        }
    );
}

#[test]
fn rejected_surfaces_are_not_counted() {
    let mut host = CpuHost::default();
    assert!(host.create_surface(0, 8, 1.0).is_err());
    assert!(host.create_surface(8, 8, f64::NAN).is_err());
    assert!(host.create_surface(70_000, 8, 1.0).is_err());
    assert_eq!(host.stats(), SurfaceStats::default());
}

#[test]
fn fill_rect_paints_in_layout_units() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(10, 10, 2.0).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8::WHITE).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 5.0, 10.0), Rgba8::rgb(255, 0, 0))
        .unwrap();
    assert_eq!(s.pixel(2, 10).unwrap(), [255, 0, 0, 255]);
    assert_eq!(s.pixel(15, 10).unwrap(), [255, 255, 255, 255]);
    assert!(s.pixel(20, 0).is_err());
}

#[test]
fn rounded_rect_leaves_corners_clear() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(20, 20, 1.0).unwrap();
    s.fill_rounded_rect(Rect::new(0.0, 0.0, 20.0, 20.0), 8.0, Rgba8::BLACK)
        .unwrap();
    assert_eq!(s.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(s.pixel(10, 10).unwrap(), [0, 0, 0, 255]);
}

#[test]
fn composite_layer_applies_after_pending_draws() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(2, 2, 1.0).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Rgba8::WHITE).unwrap();
    let layer = [0u8, 0, 0, 128].repeat(4);
    s.composite_layer(&layer, BlendMode::Normal, 1.0).unwrap();
    let px = s.pixel(1, 1).unwrap();
    assert_eq!(px[3], 255);
    assert!((126..=128).contains(&px[0]));

    assert!(s.composite_layer(&[0u8; 4], BlendMode::Normal, 1.0).is_err());
}

#[test]
fn draw_image_stretches_to_transform() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(8, 8, 1.0).unwrap();
    let img = DecodedImage::from_premul(1, 1, vec![0, 0, 255, 255]).unwrap();
    s.draw_image(&img, Affine::scale(8.0)).unwrap();
    assert_eq!(s.pixel(4, 4).unwrap(), [0, 0, 255, 255]);
}

#[test]
fn export_png_round_trips_dimensions() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(6, 4, 2.0).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 6.0, 4.0), Rgba8::rgb(0, 128, 0))
        .unwrap();
    let settings = ExportSettings {
        format: ExportFormat::Png,
        ..ExportSettings::default()
    };
    let out = s.export(&settings).unwrap().unwrap();
    assert_eq!((out.width, out.height), (12, 8));
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (12, 8));
    assert_eq!(decoded.get_pixel(3, 3).0, [0, 128, 0, 255]);
}

#[test]
fn export_jpeg_has_jpeg_magic() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(16, 16, 1.0).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 16.0, 16.0), Rgba8::WHITE).unwrap();
    let out = s.export(&ExportSettings::default()).unwrap().unwrap();
    assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(out.format, ExportFormat::Jpeg);
}

#[test]
fn preview_is_bounded_thumbnail() {
    let mut host = CpuHost::default();
    let mut s = host.create_surface(400, 200, 2.0).unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 400.0, 200.0), Rgba8::WHITE).unwrap();
    let p = s.preview(100).unwrap().unwrap();
    assert_eq!((p.width, p.height), (100, 50));
    assert_eq!(p.rgba8.len(), 100 * 50 * 4);
    assert!(s.preview(0).unwrap().is_none());
}

#[test]
fn fonts_ready_requires_fonts_only_for_text() {
    let mut host = CpuHost::default();
    host.fonts_ready(&[]).unwrap();
    assert!(
        host.fonts_ready(&[FontSpec::new("Inter", 400, 16.0)])
            .is_err()
    );
}
