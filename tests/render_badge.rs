use std::path::PathBuf;

use mkflag::{ColorSet, DesignMetrics, FlagSpec, MetricsBackend, RenderOptions, render_flag_set};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn system_font_available() -> bool {
    mkflag::load_font(&DesignMetrics::default().font_family, None).is_ok()
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "mkflag_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn test_spec(prefix: &std::path::Path) -> FlagSpec {
    FlagSpec {
        text: "OK".to_string(),
        scale: 1.0,
        colors: ColorSet::parse("FFFFFFFF,FF0000FF,FF000000").unwrap(),
        file_prefix: prefix.to_string_lossy().into_owned(),
        logo_path: None,
    }
}

#[test]
fn batch_writes_all_thirteen_styles() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_batch");
    std::fs::create_dir_all(&tmp).unwrap();

    let spec = test_spec(&tmp.join("flag"));
    let report = render_flag_set(&spec, &RenderOptions::default()).unwrap();

    assert_eq!(report.written.len(), 13, "skipped: {:?}", report.skipped);
    assert!(report.skipped.is_empty());
    for path in &report.written {
        assert!(path.exists(), "missing {}", path.display());
    }
    assert!(tmp.join("flag_none_1.0.png").exists());
    assert!(tmp.join("flag_tc_1.0.png").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn plain_badge_has_fill_border_text_and_transparent_corners() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_pixels");
    std::fs::create_dir_all(&tmp).unwrap();

    let spec = test_spec(&tmp.join("flag"));
    render_flag_set(&spec, &RenderOptions::default()).unwrap();

    let img = image::open(tmp.join("flag_none_1.0.png")).unwrap().to_rgba8();
    let (w, h) = img.dimensions();

    // The rounded corners leave the canvas corners fully transparent.
    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        assert_eq!(img.get_pixel(x, y).0[3], 0, "corner ({x},{y})");
    }

    let pixels: Vec<[u8; 4]> = img.pixels().map(|p| p.0).collect();
    // Flag fill: opaque blue.
    assert!(pixels.iter().any(|p| *p == [0, 0, 255, 255]));
    // Border stroke: opaque black.
    assert!(
        pixels
            .iter()
            .any(|p| p[0] < 10 && p[1] < 10 && p[2] < 10 && p[3] == 255)
    );
    // Label: white text over the blue fill.
    assert!(
        pixels
            .iter()
            .any(|p| p[0] >= 180 && p[1] >= 180 && p[3] == 255)
    );

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn tab_styles_grow_the_exported_canvas() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_dims");
    std::fs::create_dir_all(&tmp).unwrap();

    let spec = test_spec(&tmp.join("flag"));
    render_flag_set(&spec, &RenderOptions::default()).unwrap();

    let dims = |tag: &str| {
        let img = image::open(tmp.join(format!("flag_{tag}_1.0.png")))
            .unwrap()
            .to_rgba8();
        img.dimensions()
    };

    let none = dims("none");
    let tc = dims("tc");
    let lt = dims("lt");

    assert_eq!(tc.0, none.0);
    assert!(tc.1 > none.1, "top tab must add height");
    assert_eq!(lt.1, none.1);
    assert!(lt.0 > none.0, "left tab must add width");

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn renders_are_deterministic_across_runs() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_determinism");
    std::fs::create_dir_all(&tmp).unwrap();

    let spec_a = test_spec(&tmp.join("a"));
    let spec_b = test_spec(&tmp.join("b"));
    render_flag_set(&spec_a, &RenderOptions::default()).unwrap();
    render_flag_set(&spec_b, &RenderOptions::default()).unwrap();

    for tag in ["none", "tc", "bl"] {
        let a = std::fs::read(tmp.join(format!("a_{tag}_1.0.png"))).unwrap();
        let b = std::fs::read(tmp.join(format!("b_{tag}_1.0.png"))).unwrap();
        assert_eq!(digest_u64(&a), digest_u64(&b), "tag {tag}");
    }

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn missing_logo_file_matches_the_no_logo_output() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_missing_logo");
    std::fs::create_dir_all(&tmp).unwrap();

    let plain = test_spec(&tmp.join("plain"));
    let mut with_bad_logo = test_spec(&tmp.join("logo"));
    with_bad_logo.logo_path = Some(PathBuf::from("/nonexistent/logo.png"));

    render_flag_set(&plain, &RenderOptions::default()).unwrap();
    let report = render_flag_set(&with_bad_logo, &RenderOptions::default()).unwrap();
    assert_eq!(report.written.len(), 13);

    let a = std::fs::read(tmp.join("plain_none_1.0.png")).unwrap();
    let b = std::fs::read(tmp.join("logo_none_1.0.png")).unwrap();
    assert_eq!(a, b);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn fontdue_backend_renders_the_full_batch() {
    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_fontdue");
    std::fs::create_dir_all(&tmp).unwrap();

    let spec = test_spec(&tmp.join("flag"));
    let opts = RenderOptions {
        backend: MetricsBackend::Fontdue,
        ..RenderOptions::default()
    };
    let report = render_flag_set(&spec, &opts).unwrap();
    assert_eq!(report.written.len(), 13, "skipped: {:?}", report.skipped);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn logo_badge_is_wider_than_the_plain_one() {
    use std::io::Cursor;

    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_logo_width");
    std::fs::create_dir_all(&tmp).unwrap();

    let logo_path = tmp.join("logo.png");
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 128, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&logo_path, &buf).unwrap();

    let plain = test_spec(&tmp.join("plain"));
    let mut with_logo = test_spec(&tmp.join("logo"));
    with_logo.logo_path = Some(logo_path);

    render_flag_set(&plain, &RenderOptions::default()).unwrap();
    render_flag_set(&with_logo, &RenderOptions::default()).unwrap();

    let plain_img = image::open(tmp.join("plain_none_1.0.png")).unwrap().to_rgba8();
    let logo_img = image::open(tmp.join("logo_none_1.0.png")).unwrap().to_rgba8();
    assert!(logo_img.dimensions().0 > plain_img.dimensions().0);
    assert_eq!(logo_img.dimensions().1, plain_img.dimensions().1);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn unpaintable_logo_degrades_to_text_only() {
    use std::io::Cursor;

    if !system_font_available() {
        return;
    }
    let tmp = temp_dir("render_banner_logo");
    std::fs::create_dir_all(&tmp).unwrap();

    // An 8000:1 banner decodes fine, but sized to the device slot height its
    // bitmap is wider than the rasterizer's u16 limit, so the paint
    // conversion fails after the decode. The batch must fall back to
    // text-only badges instead of aborting.
    let logo_path = tmp.join("banner.png");
    let img = image::RgbaImage::from_pixel(8000, 1, image::Rgba([0, 128, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&logo_path, &buf).unwrap();

    let plain = test_spec(&tmp.join("plain"));
    let mut with_banner = test_spec(&tmp.join("banner"));
    with_banner.logo_path = Some(logo_path);

    render_flag_set(&plain, &RenderOptions::default()).unwrap();
    let report = render_flag_set(&with_banner, &RenderOptions::default()).unwrap();
    assert_eq!(report.written.len(), 13, "skipped: {:?}", report.skipped);

    let a = std::fs::read(tmp.join("plain_none_1.0.png")).unwrap();
    let b = std::fs::read(tmp.join("banner_none_1.0.png")).unwrap();
    assert_eq!(a, b);

    std::fs::remove_dir_all(&tmp).ok();
}
