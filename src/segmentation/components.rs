//! Connected-component labelling and hole filling on binary masks.

use crate::image::LabelImage;

pub(crate) const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds 8-neighbours of pixel `idx`.
#[inline]
pub(crate) fn neighbors(idx: usize, width: usize, height: usize) -> impl Iterator<Item = usize> {
    let x = (idx % width) as isize;
    let y = (idx / width) as isize;
    NEIGH_OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let xn = x + dx;
        let yn = y + dy;
        if xn < 0 || yn < 0 || xn >= width as isize || yn >= height as isize {
            None
        } else {
            Some(yn as usize * width + xn as usize)
        }
    })
}

/// Label the 8-connected components of `mask`. Labels start at 1; the size of
/// component `l` is `sizes[l - 1]`.
pub fn connected_components(mask: &[bool], width: usize, height: usize) -> (LabelImage, Vec<usize>) {
    let mut labels = LabelImage::new(width, height);
    let mut sizes = Vec::new();
    let mut stack = Vec::with_capacity(64);
    for seed in 0..(width * height).min(mask.len()) {
        if !mask[seed] || labels.data[seed] != 0 {
            continue;
        }
        let label = sizes.len() as u32 + 1;
        let mut size = 0usize;
        labels.data[seed] = label;
        stack.push(seed);
        while let Some(idx) = stack.pop() {
            size += 1;
            for n in neighbors(idx, width, height) {
                if mask[n] && labels.data[n] == 0 {
                    labels.data[n] = label;
                    stack.push(n);
                }
            }
        }
        sizes.push(size);
    }
    (labels, sizes)
}

/// Size of the largest 8-connected component, 0 for an empty mask.
pub fn largest_component_size(mask: &[bool], width: usize, height: usize) -> usize {
    connected_components(mask, width, height)
        .1
        .into_iter()
        .max()
        .unwrap_or(0)
}

/// Set background pixels that are not 4-connected to the image border.
pub fn fill_holes(mask: &[bool], width: usize, height: usize) -> Vec<bool> {
    let n = width * height;
    if n == 0 {
        return Vec::new();
    }
    let mut outside = vec![false; n];
    let mut stack = Vec::new();
    let visit = |idx: usize, outside: &mut Vec<bool>, stack: &mut Vec<usize>| {
        if !mask[idx] && !outside[idx] {
            outside[idx] = true;
            stack.push(idx);
        }
    };
    for x in 0..width {
        visit(x, &mut outside, &mut stack);
        visit((height - 1) * width + x, &mut outside, &mut stack);
    }
    for y in 0..height {
        visit(y * width, &mut outside, &mut stack);
        visit(y * width + width - 1, &mut outside, &mut stack);
    }
    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % width, idx / width);
        if x > 0 {
            visit(idx - 1, &mut outside, &mut stack);
        }
        if x + 1 < width {
            visit(idx + 1, &mut outside, &mut stack);
        }
        if y > 0 {
            visit(idx - width, &mut outside, &mut stack);
        }
        if y + 1 < height {
            visit(idx + width, &mut outside, &mut stack);
        }
    }
    outside.into_iter().map(|o| !o).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rows: &[&str]) -> (Vec<bool>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let mask = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        (mask, w, h)
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let (mask, w, h) = parse(&["#...", ".#..", "...#", "...#"]);
        let (labels, sizes) = connected_components(&mask, w, h);
        assert_eq!(sizes, vec![2, 2]);
        assert_eq!(labels.get(0, 0), labels.get(1, 1));
        assert_ne!(labels.get(0, 0), labels.get(3, 3));
        assert_eq!(largest_component_size(&mask, w, h), 2);
    }

    #[test]
    fn fill_holes_closes_interior_pockets_only() {
        let (mask, w, h) = parse(&["#####.", "#..#..", "#####.", "......"]);
        let filled = fill_holes(&mask, w, h);
        assert!(filled[w + 1] && filled[w + 2], "interior pocket filled");
        assert!(!filled[w + 4], "pocket open to the border stays background");
        assert!(!filled[3 * w]);
    }

    #[test]
    fn empty_mask_has_no_components() {
        let (labels, sizes) = connected_components(&[false; 6], 3, 2);
        assert!(sizes.is_empty());
        assert_eq!(labels.max_label(), 0);
    }
}
