//! Properties of the chroma-key policy over synthetic solid-color textures.
//!
//! The fragment shader mirrors `composite_pixel` exactly, so these CPU
//! tests pin the per-pixel contract without needing a GPU.

use chromix::compositor::{chroma_distance, composite_pixel};

/// A synthetic texture is just a grid of solid-color pixels.
fn solid(color: [f32; 4], w: usize, h: usize) -> Vec<[f32; 4]> {
    vec![color; w * h]
}

fn composite_textures(
    video: &[[f32; 4]],
    background: &[[f32; 4]],
    key: [f32; 3],
    threshold: f32,
) -> Vec<[f32; 4]> {
    video
        .iter()
        .zip(background.iter())
        .map(|(&v, &b)| composite_pixel(v, b, key, threshold))
        .collect()
}

#[test]
fn keyed_pixels_show_background_others_show_video() {
    let key = [0.0, 1.0, 0.0];
    let threshold = 0.3;
    let background = solid([0.1, 0.2, 0.3, 1.0], 8, 8);

    // Near-key video: every pixel replaced.
    let near_key = solid([0.05, 0.95, 0.05, 1.0], 8, 8);
    assert!(chroma_distance([0.05, 0.95, 0.05], key) < threshold);
    assert_eq!(
        composite_textures(&near_key, &background, key, threshold),
        background
    );

    // Far-from-key video: every pixel kept.
    let far = solid([1.0, 0.0, 0.0, 1.0], 8, 8);
    assert!(chroma_distance([1.0, 0.0, 0.0], key) >= threshold);
    assert_eq!(composite_textures(&far, &background, key, threshold), far);
}

#[test]
fn mixed_texture_splits_exactly_along_the_policy() {
    let key = [0.0, 0.0, 1.0];
    let threshold = 0.5;
    let background = solid([0.0; 4], 4, 4);
    let mut video = solid([0.1, 0.1, 0.9, 1.0], 4, 4);
    // Poke in some pixels far from the key.
    video[3] = [1.0, 1.0, 0.0, 1.0];
    video[9] = [0.9, 0.9, 0.1, 1.0];

    let out = composite_textures(&video, &background, key, threshold);
    for (i, (&v, &o)) in video.iter().zip(out.iter()).enumerate() {
        let d = chroma_distance([v[0], v[1], v[2]], key);
        if d < threshold {
            assert_eq!(o, background[i], "pixel {i} should be background");
        } else {
            assert_eq!(o, v, "pixel {i} should be video");
        }
    }
}

#[test]
fn zero_threshold_with_green_key_leaves_video_untouched() {
    // Even a texture containing pure green is kept: distance 0 is not < 0.
    let key = [0.0, 1.0, 0.0];
    let mut video = solid([0.2, 0.8, 0.2, 1.0], 4, 4);
    video[5] = [0.0, 1.0, 0.0, 1.0];
    let background = solid([1.0; 4], 4, 4);

    assert_eq!(composite_textures(&video, &background, key, 0.0), video);
}

#[test]
fn threshold_one_replaces_everything_below_maximal_distance() {
    // The normalized metric reaches 1.0 only between diagonally opposite
    // corners of the RGB cube; every other pair is strictly below it.
    let key = [1.0, 1.0, 1.0];
    let background = solid([0.5, 0.5, 0.5, 1.0], 4, 4);

    for color in [
        [0.0, 0.0, 0.1],
        [0.9, 0.9, 0.9],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 1.0],
        [0.01, 0.01, 0.01],
    ] {
        let video = solid([color[0], color[1], color[2], 1.0], 4, 4);
        assert!(chroma_distance(color, key) < 1.0);
        assert_eq!(
            composite_textures(&video, &background, key, 1.0),
            background,
            "color {color:?} should be fully replaced at threshold 1"
        );
    }
}

#[test]
fn exactly_opposite_corner_survives_threshold_one() {
    // Documented corner case of the normalized Euclidean metric: black
    // against a white key sits at distance exactly 1.0, which is not < 1.0.
    let key = [1.0, 1.0, 1.0];
    let video = [0.0, 0.0, 0.0, 1.0];
    let background = [0.3, 0.3, 0.3, 1.0];
    assert_eq!(composite_pixel(video, background, key, 1.0), video);
}

#[test]
fn policy_is_deterministic_across_frames() {
    // No flicker for a static input: the same inputs give the same output
    // on every evaluation, including at the exact boundary.
    let key = [0.0, 1.0, 0.0];
    let video = [0.5, 0.5, 0.5, 1.0];
    let background = [0.0, 0.0, 0.0, 1.0];
    let threshold = chroma_distance([0.5, 0.5, 0.5], key);

    let first = composite_pixel(video, background, key, threshold);
    for _ in 0..100 {
        assert_eq!(composite_pixel(video, background, key, threshold), first);
    }
}
