use super::*;
use crate::cube::MsiCube;
use crate::image::ImageF32;
use nalgebra::Vector2;

/// Two anisotropic blobs, so rotation and translation are both observable.
fn pattern(x: f64, y: f64) -> f32 {
    let a = (-((x - 20.0).powi(2) / 50.0 + (y - 22.0).powi(2) / 18.0)).exp();
    let b = 0.6 * (-((x - 30.0).powi(2) + (y - 30.0).powi(2)) / 20.0).exp();
    (a + b) as f32
}

/// Fixed image samples the pattern directly; the moving image is rendered so
/// that `moving(truth(p)) == fixed(p)`.
fn pair(truth: &RigidTransform, size: usize) -> (ImageF32, ImageF32) {
    let mut fixed = ImageF32::new(size, size);
    let mut moving = ImageF32::new(size, size);
    let inv = truth.inverse();
    for y in 0..size {
        for x in 0..size {
            fixed.set(x, y, pattern(x as f64, y as f64));
            let p = inv.apply(Vector2::new(x as f64, y as f64));
            moving.set(x, y, pattern(p.x, p.y));
        }
    }
    (fixed, moving)
}

fn options(metric: MetricKind) -> RegistrationOptions {
    RegistrationOptions {
        metric,
        ..RegistrationOptions::default()
    }
}

#[test]
fn recovers_translation_with_mean_squares() {
    let _ = env_logger::builder().is_test(true).try_init();
    let center = Vector2::new(23.5, 23.5);
    let truth = RigidTransform::new(0.0, Vector2::new(3.0, -2.0), center);
    let (fixed, moving) = pair(&truth, 48);
    let result = Registrar::new(options(MetricKind::MeanSquares))
        .register(&fixed, &moving)
        .expect("registration");
    let t = result.transform.translation;
    assert!(
        (t - truth.translation).norm() < 0.3,
        "translation {t:?}, metric {}",
        result.metric
    );
    assert!(result.transform.angle.abs().to_degrees() < 1.0);
    assert!(!result.levels.is_empty());
}

#[test]
fn recovers_rotation_with_correlation() {
    let center = Vector2::new(23.5, 23.5);
    let truth = RigidTransform::new(8f64.to_radians(), Vector2::new(1.0, 1.5), center);
    let (fixed, moving) = pair(&truth, 48);
    let result = Registrar::new(options(MetricKind::NormalizedCorrelation))
        .register(&fixed, &moving)
        .expect("registration");
    let angle = result.transform.angle.to_degrees();
    assert!((angle - 8.0).abs() < 1.0, "angle {angle}");
    let err = (result.transform.apply(center) - truth.apply(center)).norm();
    assert!(err < 0.5, "centre error {err}");
}

#[test]
fn warp_brings_moving_onto_fixed() {
    let truth = RigidTransform::new(0.0, Vector2::new(2.0, 1.0), Vector2::new(15.5, 15.5));
    let (fixed, moving) = pair(&truth, 32);
    let result = RegistrationResult {
        transform: truth,
        metric_kind: MetricKind::MeanSquares,
        metric: 0.0,
        iterations: 0,
        stop_reason: StopReason::StepTooSmall,
        start_angle_deg: 0.0,
        levels: Vec::new(),
        resize_scale: [1.0, 1.0],
        fixed_size: [32, 32],
    };
    let warped = result.warp(&moving);
    for (x, y) in [(10, 12), (20, 22), (16, 8)] {
        assert!(
            (warped.get(x, y) - fixed.get(x, y)).abs() < 1e-2,
            "({x}, {y}): {} vs {}",
            warped.get(x, y),
            fixed.get(x, y)
        );
    }
}

#[test]
fn resized_moving_maps_back_to_original_grid() {
    let fixed = ImageF32::filled(40, 20, 1.0);
    let moving = ImageF32::filled(20, 10, 1.0);
    let result = Registrar::new(options(MetricKind::MeanSquares))
        .register(&fixed, &moving)
        .expect("registration");
    assert_eq!(result.resize_scale, [2.0, 2.0]);
    let mask = vec![true; 20 * 10];
    let warped = result.warp_mask(&mask, 20, 10);
    assert_eq!(warped.len(), 40 * 20);
    assert_eq!(dice_coefficient(&warped, &vec![true; 40 * 20]), 1.0);
}

#[test]
fn warp_cube_keeps_the_mz_axis() {
    let truth = RigidTransform::new(0.0, Vector2::new(1.0, 0.0), Vector2::new(7.5, 7.5));
    let (a, b) = pair(&truth, 16);
    let cube = MsiCube::from_ion_images(vec![100.0, 200.0], &[a, b]).unwrap();
    let result = RegistrationResult {
        transform: truth,
        metric_kind: MetricKind::MeanSquares,
        metric: 0.0,
        iterations: 0,
        stop_reason: StopReason::StepTooSmall,
        start_angle_deg: 0.0,
        levels: Vec::new(),
        resize_scale: [1.0, 1.0],
        fixed_size: [16, 16],
    };
    let warped = warp_cube(&cube, &result, 16, 16).unwrap();
    assert_eq!(warped.mzs(), &[100.0, 200.0]);
    assert_eq!((warped.width(), warped.height()), (16, 16));
}

#[test]
fn empty_images_are_rejected() {
    let empty = ImageF32::new(0, 0);
    let img = ImageF32::filled(8, 8, 1.0);
    let registrar = Registrar::default();
    assert_eq!(
        registrar.register(&empty, &img).unwrap_err(),
        RegistrationError::EmptyImage { which: "fixed" }
    );
    assert_eq!(
        registrar.register(&img, &empty).unwrap_err(),
        RegistrationError::EmptyImage { which: "moving" }
    );
}

#[test]
fn moments_initialisation_aligns_centroids() {
    let mut fixed = ImageF32::new(20, 20);
    let mut moving = ImageF32::new(20, 20);
    fixed.set(5, 5, 1.0);
    moving.set(12, 9, 1.0);
    let t = initialize_transform(&fixed, &moving, InitMode::Moments);
    let q = t.apply(Vector2::new(5.0, 5.0));
    assert!((q - Vector2::new(12.0, 9.0)).norm() < 1e-9, "{q:?}");
}

#[test]
fn full_overlap_requirement_fails_for_rotated_starts() {
    let center = Vector2::new(15.5, 15.5);
    let (fixed, moving) = pair(&RigidTransform::new(0.0, Vector2::zeros(), center), 32);
    let registrar = Registrar::new(RegistrationOptions {
        min_overlap: 1.0,
        initial_angles_deg: vec![45.0],
        ..RegistrationOptions::default()
    });
    assert_eq!(
        registrar.register(&fixed, &moving).unwrap_err(),
        RegistrationError::NoOverlap
    );
}
