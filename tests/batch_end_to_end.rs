//! End-to-end runs of each batch job against real files on disk.
//!
//! Goes through the same path as the CLI: stock config → scan → run → report.

use casepics::config::BatchConfig;
use casepics::imaging::color::modulate;
use casepics::process::{self, Job, JobKind};
use casepics::scan::{ScanOptions, find_images};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn noisy_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = x.wrapping_mul(31) ^ y.wrapping_mul(17);
        Rgb([(v & 0xff) as u8, (x & 0xff) as u8, (y & 0xff) as u8])
    })
}

/// Format follows the extension.
fn write_image(path: &Path, width: u32, height: u32) {
    noisy_rgb(width, height).save(path).unwrap();
}

fn mid_gray(path: &Path) {
    RgbImage::from_pixel(32, 32, Rgb([100, 100, 100]))
        .save(path)
        .unwrap();
}

fn pixel(path: &Path) -> Rgb<u8> {
    *image::open(path).unwrap().to_rgb8().get_pixel(16, 16)
}

#[test]
fn crop_job_rewrites_cases_to_target_size() {
    let tmp = TempDir::new().unwrap();
    write_image(&tmp.path().join("wide.png"), 400, 200);
    write_image(&tmp.path().join("tall.png"), 200, 400);
    write_image(&tmp.path().join("photo.jpg"), 400, 200);

    let mut config = BatchConfig::stock();
    config.crop.target_width = 140;
    config.crop.target_height = 90;

    let files = find_images(tmp.path(), &ScanOptions::flat(&config.crop.extensions)).unwrap();
    assert_eq!(files.len(), 2, "crop only picks up png files");

    let job = Job::Crop {
        config: config.crop.to_crop_config(),
        dry_run: false,
    };
    let report = process::run(&files, &job, None);

    assert_eq!(report.job, JobKind::Crop);
    assert_eq!(report.succeeded, 2);
    assert!(report.failures.is_empty());
    for name in ["wide.png", "tall.png"] {
        assert_eq!(
            image::image_dimensions(tmp.path().join(name)).unwrap(),
            (140, 90)
        );
    }
    assert_eq!(
        image::image_dimensions(tmp.path().join("photo.jpg")).unwrap(),
        (400, 200)
    );
}

#[test]
fn crop_dry_run_leaves_files_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wide.png");
    write_image(&path, 400, 200);
    let before = fs::read(&path).unwrap();

    let job = Job::Crop {
        config: BatchConfig::stock().crop.to_crop_config(),
        dry_run: true,
    };
    let report = process::run(&[path.clone()], &job, None);

    assert!(report.dry_run);
    assert_eq!(report.succeeded, 1);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn brighten_lightens_and_honors_skip_list() {
    let tmp = TempDir::new().unwrap();
    mid_gray(&tmp.path().join("dark.png"));
    mid_gray(&tmp.path().join("light.png"));

    let mut config = BatchConfig::stock();
    config.brighten.skip_files = vec!["light.png".to_string()];
    let options =
        ScanOptions::flat(&config.brighten.extensions).skipping(&config.brighten.skip_files);
    let files = find_images(tmp.path(), &options).unwrap();
    assert_eq!(files, vec![tmp.path().join("dark.png")]);

    let job = Job::Adjust {
        kind: JobKind::Brighten,
        config: config.brighten.to_adjust_config(),
    };
    let report = process::run(&files, &job, None);
    assert_eq!(report.succeeded, 1);

    assert!(pixel(&tmp.path().join("dark.png"))[0] > 100);
    assert_eq!(pixel(&tmp.path().join("light.png")), Rgb([100, 100, 100]));
}

#[test]
fn fix_colors_darkens_and_keeps_alpha() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("case.png");
    RgbaImage::from_pixel(16, 16, Rgba([180, 120, 90, 128]))
        .save(&path)
        .unwrap();

    let job = Job::Adjust {
        kind: JobKind::FixColors,
        config: BatchConfig::stock().fix_colors.to_adjust_config(),
    };
    let report = process::run(&[path.clone()], &job, None);
    assert_eq!(report.succeeded, 1);

    let img = image::open(&path).unwrap();
    assert!(img.color().has_alpha());
    let px = img.to_rgba8().get_pixel(8, 8).0;
    assert_eq!(px[3], 128);
    let luma_before = 180u32 + 120 + 90;
    let luma_after = px[0] as u32 + px[1] as u32 + px[2] as u32;
    assert!(luma_after < luma_before, "{px:?} should be darker");
}

#[test]
fn stock_adjust_jobs_apply_modulation_alone() {
    let tmp = TempDir::new().unwrap();
    let stock = BatchConfig::stock();

    for (kind, section) in [
        (JobKind::Brighten, &stock.brighten),
        (JobKind::FixColors, &stock.fix_colors),
    ] {
        let path = tmp.path().join(format!("{kind}.png"));
        mid_gray(&path);
        let config = section.to_adjust_config();
        let expected = modulate([100, 100, 100], &config.modulation);

        let report = process::run(&[path.clone()], &Job::Adjust { kind, config }, None);
        assert_eq!(report.succeeded, 1);
        assert_eq!(pixel(&path).0, expected, "{kind}");
    }
}

#[test]
fn gamma_lift_brightens_beyond_modulation() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("case.png");
    mid_gray(&path);

    let mut section = BatchConfig::stock().fix_colors;
    section.gamma_lift = true;
    let config = section.to_adjust_config();
    let modulated = modulate([100, 100, 100], &config.modulation);

    let job = Job::Adjust {
        kind: JobKind::FixColors,
        config,
    };
    process::run(&[path.clone()], &job, None);
    assert!(pixel(&path)[0] > modulated[0]);
}

#[test]
fn compress_keeps_png_pixels() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("hero.png");
    write_image(&path, 64, 48);
    let before = image::open(&path).unwrap().to_rgb8();

    let job = Job::Compress {
        encode: BatchConfig::stock().compress.encode_settings(),
    };
    let report = process::run(&[path.clone()], &job, None);

    assert_eq!(report.succeeded, 1);
    assert_eq!(image::open(&path).unwrap().to_rgb8(), before);
}

#[test]
fn compress_walks_tree_and_isolates_failures() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("casesPics/archive");
    fs::create_dir_all(&nested).unwrap();
    write_image(&tmp.path().join("hero.png"), 64, 64);
    write_image(&nested.join("old.jpg"), 64, 64);
    fs::write(tmp.path().join("casesPics/corrupt.png"), b"garbage").unwrap();

    let config = BatchConfig::stock();
    let files = find_images(tmp.path(), &ScanOptions::recursive(&config.compress.extensions))
        .unwrap();
    assert_eq!(files.len(), 3);

    let job = Job::Compress {
        encode: config.compress.encode_settings(),
    };
    let report = process::run(&files, &job, None);

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("casesPics/corrupt.png"));
    assert!(report.original_bytes > 0);
    assert!(report.new_bytes > 0);
    assert_eq!(fs::read(tmp.path().join("casesPics/corrupt.png")).unwrap(), b"garbage");

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["job"], "compress");
    assert_eq!(json["succeeded"], 2);
}

#[test]
fn no_temp_files_are_left_behind() {
    let tmp = TempDir::new().unwrap();
    write_image(&tmp.path().join("a.png"), 50, 50);
    fs::write(tmp.path().join("b.png"), b"broken").unwrap();

    let config = BatchConfig::stock();
    let files = find_images(tmp.path(), &ScanOptions::flat(&config.crop.extensions)).unwrap();
    let job = Job::Compress {
        encode: config.compress.encode_settings(),
    };
    process::run(&files, &job, None);

    let mut names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.png"]);
}

#[test]
fn missing_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let result = find_images(
        &tmp.path().join("does-not-exist"),
        &ScanOptions::flat(&["png".to_string()]),
    );
    assert!(result.is_err());
}
