//! Contour extraction with hierarchy.
//!
//! Wraps `imageproc`'s border-following tracer and rebuilds the
//! parent/child structure the card and symbol filters navigate: card
//! candidates are bright regions whose holes are the printed symbols.

use image::GrayImage;
use imageproc::contours::find_contours;

use crate::shared::geometry::Point;

/// Traced contours plus their nesting relationships.
///
/// Indices are stable: `parents[i]` and `children[i]` refer to positions
/// in `outlines`. Outer borders are discovered before the borders they
/// enclose, so a parent index is always smaller than its children's.
#[derive(Clone, Debug, Default)]
pub struct ContourForest {
    outlines: Vec<Vec<Point>>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl ContourForest {
    /// Traces all borders of a binary image (nonzero = foreground).
    pub fn trace(binary: &GrayImage) -> Self {
        let traced = find_contours::<i32>(binary);

        let mut outlines = Vec::with_capacity(traced.len());
        let mut parents = Vec::with_capacity(traced.len());
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); traced.len()];

        for (index, contour) in traced.into_iter().enumerate() {
            if let Some(parent) = contour.parent {
                children[parent].push(index);
            }
            parents.push(contour.parent);
            outlines.push(
                contour
                    .points
                    .into_iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect(),
            );
        }

        Self {
            outlines,
            parents,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    pub fn outline(&self, index: usize) -> &[Point] {
        &self.outlines[index]
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents[index]
    }

    pub fn first_child(&self, index: usize) -> Option<usize> {
        self.children[index].first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geometry::{bounding_rect, polygon_area};

    /// White rectangle with an optional dark hole on a black background.
    fn rect_image(hole: bool) -> GrayImage {
        let mut img = GrayImage::new(120, 100);
        for y in 20..80 {
            for x in 20..100 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
        if hole {
            for y in 40..60 {
                for x in 50..70 {
                    img.put_pixel(x, y, image::Luma([0]));
                }
            }
        }
        img
    }

    #[test]
    fn test_solid_rect_yields_single_root_contour() {
        let forest = ContourForest::trace(&rect_image(false));
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.parent(0), None);
        assert_eq!(forest.first_child(0), None);
    }

    #[test]
    fn test_hole_becomes_child_of_outer_border() {
        let forest = ContourForest::trace(&rect_image(true));
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.parent(0), None);
        assert_eq!(forest.parent(1), Some(0));
        assert_eq!(forest.first_child(0), Some(1));
    }

    #[test]
    fn test_outer_border_bounds_match_region() {
        let forest = ContourForest::trace(&rect_image(false));
        let rect = bounding_rect(forest.outline(0)).unwrap();
        assert_eq!((rect.x, rect.y), (20, 20));
        assert_eq!((rect.width, rect.height), (80, 60));
    }

    #[test]
    fn test_hole_area_close_to_region_size() {
        let forest = ContourForest::trace(&rect_image(true));
        let hole_area = polygon_area(forest.outline(1));
        // 20x20 hole; border tracing lands within a pixel of the edge
        assert!((300.0..=500.0).contains(&hole_area), "got {hole_area}");
    }

    #[test]
    fn test_empty_image_has_no_contours() {
        let forest = ContourForest::trace(&GrayImage::new(50, 50));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_two_separate_regions_are_both_roots() {
        let mut img = GrayImage::new(100, 50);
        for y in 10..40 {
            for x in 10..30 {
                img.put_pixel(x, y, image::Luma([255]));
            }
            for x in 60..90 {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
        let forest = ContourForest::trace(&img);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest.parent(0), None);
        assert_eq!(forest.parent(1), None);
    }
}
