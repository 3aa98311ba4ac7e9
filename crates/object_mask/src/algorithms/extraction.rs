use std::collections::HashSet;

use geo::Area;
use geo_types::{Coord, LineString, Polygon};
use image::{GrayImage, Luma, imageops};
use imageproc::{
    contours::{BorderType, Contour, find_contours},
    point::Point,
    region_labelling::{Connectivity, connected_components},
};
use crate::types::{BACKGROUND, FOREGROUND};

/// Outer borders of the foreground regions in a binary image.
///
/// Outer borders nested inside holes are included; they can never enclose
/// more area than the border around them.
pub fn outer_contours(binary: &GrayImage) -> Vec<Contour<i32>> {
    // The border follower treats a region starting at column 0 as a hole, so
    // trace inside a one pixel background frame and shift the points back.
    let (width, height) = binary.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, binary, 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && !contour.points.is_empty())
        .map(|contour| Contour {
            points: contour
                .points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect(),
            ..contour
        })
        .collect()
}

/// Enclosed (shoelace) area of a contour
pub fn contour_area(contour: &Contour<i32>) -> f64 {
    let coords: Vec<Coord<f64>> = contour
        .points
        .iter()
        .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
        .collect();

    Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

/// Contour with the largest enclosed area; the first one wins ties
pub fn largest_contour(contours: &[Contour<i32>]) -> Option<&Contour<i32>> {
    let mut best: Option<(&Contour<i32>, f64)> = None;
    for contour in contours {
        let area = contour_area(contour);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour, area)),
        }
    }
    best.map(|(contour, _)| contour)
}

/// Solid rasterization of the region bounded by `contour`.
///
/// The region is the 8-connected component the contour traces plus every
/// background pixel it encloses, so the result is one component without holes.
pub fn fill_contour(binary: &GrayImage, contour: &Contour<i32>) -> GrayImage {
    let (width, height) = binary.dimensions();
    let Some(seed) = contour.points.first() else {
        return GrayImage::new(width, height);
    };

    let labels = connected_components(binary, Connectivity::Eight, Luma([BACKGROUND]));
    let target = labels.get_pixel(seed.x as u32, seed.y as u32)[0];

    // Everything except the traced component, labelled 4-connected so that
    // diagonal gaps in an 8-connected border do not leak.
    let outside_component = GrayImage::from_fn(width, height, |x, y| {
        if labels.get_pixel(x, y)[0] == target {
            Luma([BACKGROUND])
        } else {
            Luma([FOREGROUND])
        }
    });
    let regions = connected_components(&outside_component, Connectivity::Four, Luma([BACKGROUND]));

    let mut exterior: HashSet<u32> = HashSet::new();
    for x in 0..width {
        exterior.insert(regions.get_pixel(x, 0)[0]);
        exterior.insert(regions.get_pixel(x, height - 1)[0]);
    }
    for y in 0..height {
        exterior.insert(regions.get_pixel(0, y)[0]);
        exterior.insert(regions.get_pixel(width - 1, y)[0]);
    }
    exterior.remove(&0);

    GrayImage::from_fn(width, height, |x, y| {
        if exterior.contains(&regions.get_pixel(x, y)[0]) {
            Luma([BACKGROUND])
        } else {
            Luma([FOREGROUND])
        }
    })
}

/// Keep only the largest outer contour of `binary`, filled solid.
///
/// Returns `None` when the image has no foreground at all.
pub fn fill_largest_contour(binary: &GrayImage) -> Option<GrayImage> {
    let contours = outer_contours(binary);
    largest_contour(&contours).map(|contour| fill_contour(binary, contour))
}
