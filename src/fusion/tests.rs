use super::*;
use crate::image::ImageF32;

/// Three spatial patterns; ion images are non-negative mixtures of them.
fn patterns(w: usize, h: usize) -> [ImageF32; 3] {
    let mut left = ImageF32::new(w, h);
    let mut top = ImageF32::new(w, h);
    let mut ring = ImageF32::new(w, h);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    for y in 0..h {
        for x in 0..w {
            left.set(x, y, if x < w / 2 { 1.0 } else { 0.1 });
            top.set(x, y, if y < h / 3 { 1.0 } else { 0.0 });
            let r = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            ring.set(x, y, if (4.0..7.0).contains(&r) { 1.0 } else { 0.0 });
        }
    }
    [left, top, ring]
}

fn mix(p: &[ImageF32; 3], a: f32, b: f32, c: f32) -> ImageF32 {
    let mut out = ImageF32::new(p[0].w, p[0].h);
    for i in 0..out.len() {
        out.data[i] = a * p[0].data[i] + b * p[1].data[i] + c * p[2].data[i];
    }
    out
}

fn stack() -> (Vec<ImageF32>, Vec<f64>, ImageF32) {
    let p = patterns(20, 20);
    let images = vec![
        mix(&p, 1.0, 0.0, 0.0),
        mix(&p, 0.0, 1.0, 0.0),
        mix(&p, 0.0, 0.0, 1.0),
        mix(&p, 0.2, 0.9, 0.0),
        mix(&p, 0.1, 0.0, 0.8),
        mix(&p, 0.9, 0.1, 0.1),
    ];
    let mzs = vec![100.0, 200.0, 300.0, 400.0, 500.0, 600.0];
    let reference = mix(&p, 0.0, 0.0, 1.0);
    (images, mzs, reference)
}

#[test]
fn nmf_fusion_ranks_the_matching_ion_first() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (images, mzs, reference) = stack();
    let mask = vec![true; 400];
    let fusion = Fusion::new(FusionOptions {
        nmf: NmfOptions {
            n_components: 3,
            max_iterations: 500,
            tolerance: 1e-6,
        },
        top_n: 3,
        ..FusionOptions::default()
    });
    let result = fusion.fuse(&images, &reference, &mask, &mzs).unwrap();
    assert_eq!(result.ranking.len(), 3);
    assert_eq!(result.ranking[0].mz, 300.0, "{:?}", result.ranking);
    assert_eq!(result.component_images.len(), 3);
    assert_eq!(result.coordinates.len(), 6);
    match result.quality {
        FusionQuality::ReconstructionError { relative_error, .. } => {
            assert!(relative_error < 0.1, "relative error {relative_error}")
        }
        other => panic!("unexpected quality {other:?}"),
    }
}

#[test]
fn pca_fusion_ranks_the_matching_ion_first() {
    let (images, mzs, reference) = stack();
    let mask = vec![true; 400];
    let fusion = Fusion::new(FusionOptions {
        method: FusionMethod::Pca,
        nmf: NmfOptions {
            n_components: 3,
            ..NmfOptions::default()
        },
        ..FusionOptions::default()
    });
    let result = fusion.fuse(&images, &reference, &mask, &mzs).unwrap();
    assert_eq!(result.ranking[0].index, 2);
    assert!(result.ranking[0].score < 1e-6, "{:?}", result.ranking[0]);
    let FusionQuality::ExplainedVariance { ratios } = &result.quality else {
        panic!("PCA reports explained variance");
    };
    assert!(ratios.iter().sum::<f64>() > 0.99);
}

#[test]
fn correlation_baseline_agrees() {
    let (images, mzs, reference) = stack();
    let ranked = rank_by_correlation(&images, &reference, &vec![true; 400], &mzs);
    assert_eq!(ranked[0].index, 2);
}

#[test]
fn mismatched_labels_and_empty_masks_fail() {
    let (images, mzs, reference) = stack();
    let fusion = Fusion::default();
    assert!(matches!(
        fusion.fuse(&images, &reference, &vec![true; 400], &mzs[..2]),
        Err(DecompositionError::ShapeMismatch { .. })
    ));
    assert_eq!(
        fusion
            .fuse(&images, &reference, &vec![false; 400], &mzs)
            .unwrap_err(),
        DecompositionError::EmptyMask
    );
}
