//! Full-covariance Gaussian mixtures over RGB colours.

use nalgebra::{Matrix3, Vector3};

pub type Color = [f64; 3];

/// Added to the covariance diagonal when it is (nearly) singular.
const VARIANCE_FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Component {
    weight: f64,
    mean: Vector3<f64>,
    inverse: Matrix3<f64>,
    determinant: f64,
}

impl Default for Component {
    fn default() -> Self {
        Self {
            weight: 0.0,
            mean: Vector3::zeros(),
            inverse: Matrix3::zeros(),
            determinant: 1.0,
        }
    }
}

impl Component {
    /// Maximum-likelihood component of `n` samples from their sum and sum of outer products
    fn from_moments(weight: f64, n: f64, sum: &Vector3<f64>, products: &Matrix3<f64>) -> Self {
        let mean = sum / n;
        let mut covariance = products / n - mean * mean.transpose();

        if covariance.determinant() <= f64::EPSILON {
            covariance += Matrix3::identity() * VARIANCE_FLOOR;
        }
        match covariance.try_inverse() {
            Some(inverse) => Self {
                weight,
                mean,
                inverse,
                determinant: covariance.determinant(),
            },
            None => Self::default(),
        }
    }

    /// Unnormalized density: the constant (2 pi)^(-3/2) cancels out of every comparison.
    fn density(&self, color: &Color) -> f64 {
        if self.weight <= 0.0 || self.determinant <= 0.0 {
            return 0.0;
        }
        let diff = Vector3::from(*color) - self.mean;
        let mahalanobis = diff.dot(&(self.inverse * diff));
        (-0.5 * mahalanobis).exp() / self.determinant.sqrt()
    }
}

/// Colour model of one class (foreground or background)
#[derive(Debug, Clone)]
pub struct ColorModel {
    components: Vec<Component>,
}

impl ColorModel {
    /// Maximum-likelihood fit given a component assignment for every sample.
    ///
    /// Components without samples get zero weight.
    pub fn fit(samples: &[Color], assignment: &[usize], component_count: usize) -> Self {
        let mut sums = vec![Vector3::<f64>::zeros(); component_count];
        let mut products = vec![Matrix3::<f64>::zeros(); component_count];
        let mut counts = vec![0usize; component_count];

        for (color, &k) in samples.iter().zip(assignment) {
            let x = Vector3::from(*color);
            counts[k] += 1;
            sums[k] += x;
            products[k] += x * x.transpose();
        }

        let total = samples.len().max(1) as f64;
        let components = (0..component_count)
            .map(|k| match counts[k] {
                0 => Component::default(),
                n => {
                    let n = n as f64;
                    Component::from_moments(n / total, n, &sums[k], &products[k])
                }
            })
            .collect();

        Self { components }
    }

    /// Mixture density of `color`
    pub fn likelihood(&self, color: &Color) -> f64 {
        self.components
            .iter()
            .map(|c| c.weight * c.density(color))
            .sum()
    }

    /// Index of the component explaining `color` best
    pub fn most_likely_component(&self, color: &Color) -> usize {
        let mut best = 0;
        let mut best_density = 0.0;
        for (k, component) in self.components.iter().enumerate() {
            let density = component.density(color);
            if density > best_density {
                best = k;
                best_density = density;
            }
        }
        best
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

fn squared_distance(a: &Color, b: &Color) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Deterministic k-means: farthest-point seeding followed by Lloyd iterations.
///
/// Returns the cluster index of every sample. `samples` must not be empty.
pub fn kmeans(samples: &[Color], k: usize, iterations: usize) -> Vec<usize> {
    let k = k.max(1);
    let mut centers: Vec<Color> = Vec::with_capacity(k);
    centers.push(samples[0]);
    let mut nearest: Vec<f64> = samples.iter().map(|s| squared_distance(s, &samples[0])).collect();

    while centers.len() < k {
        let mut farthest = 0;
        for (i, &d) in nearest.iter().enumerate() {
            if d > nearest[farthest] {
                farthest = i;
            }
        }
        let center = samples[farthest];
        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(squared_distance(s, &center));
        }
        centers.push(center);
    }

    let mut labels = vec![usize::MAX; samples.len()];
    for _ in 0..iterations.max(1) {
        let mut changed = false;
        for (label, sample) in labels.iter_mut().zip(samples) {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (c, center) in centers.iter().enumerate() {
                let d = squared_distance(sample, center);
                if d < best_distance {
                    best = c;
                    best_distance = d;
                }
            }
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![[0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (sample, &label) in samples.iter().zip(&labels) {
            counts[label] += 1;
            for i in 0..3 {
                sums[label][i] += sample[i];
            }
        }
        for (c, center) in centers.iter_mut().enumerate() {
            if counts[c] > 0 {
                let n = counts[c] as f64;
                *center = [sums[c][0] / n, sums[c][1] / n, sums[c][2] / n];
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmeans_separates_two_clusters() {
        let mut samples = vec![[10.0, 10.0, 10.0]; 20];
        samples.extend(vec![[200.0, 50.0, 50.0]; 20]);
        samples.push([12.0, 9.0, 11.0]);

        let labels = kmeans(&samples, 2, 10);
        assert!(labels[..20].iter().all(|&l| l == labels[0]));
        assert!(labels[20..40].iter().all(|&l| l == labels[20]));
        assert_ne!(labels[0], labels[20]);
        assert_eq!(labels[40], labels[0]);
    }

    #[test]
    fn test_fit_and_likelihood() {
        let samples: Vec<Color> = (0..50)
            .map(|i| [100.0 + (i % 5) as f64, 20.0 + (i % 3) as f64, 30.0 + (i % 7) as f64])
            .chain((0..50).map(|i| [10.0 + (i % 3) as f64, 200.0 + (i % 5) as f64, 60.0 + (i % 2) as f64]))
            .collect();
        let assignment: Vec<usize> = (0..100).map(|i| if i < 50 { 0 } else { 1 }).collect();

        let model = ColorModel::fit(&samples, &assignment, 3);
        assert_eq!(model.component_count(), 3);
        assert_eq!(model.most_likely_component(&[102.0, 21.0, 33.0]), 0);
        assert_eq!(model.most_likely_component(&[11.0, 202.0, 60.0]), 1);
        assert!(model.likelihood(&[102.0, 21.0, 33.0]) > model.likelihood(&[250.0, 250.0, 250.0]));
    }

    #[test]
    fn test_constant_colour_gets_variance_floor() {
        let samples = vec![[0.0, 0.0, 0.0]; 10];
        let model = ColorModel::fit(&samples, &[0; 10], 1);
        let density = model.likelihood(&[0.0, 0.0, 0.0]);
        assert!(density.is_finite() && density > 0.0);
    }

    #[test]
    fn test_collinear_colours_stay_invertible() {
        // grey ramp: every sample lies on the r = g = b line, a rank-1 covariance
        let samples: Vec<Color> = (0..30).map(|i| [i as f64 * 8.0; 3]).collect();
        let model = ColorModel::fit(&samples, &[0; 30], 1);

        let on_line = model.likelihood(&[120.0, 120.0, 120.0]);
        let off_line = model.likelihood(&[120.0, 60.0, 180.0]);
        assert!(on_line.is_finite() && on_line > 0.0);
        assert!(off_line < on_line);
    }

    #[test]
    fn test_component_matches_sample_covariance() {
        let samples: Vec<Color> = vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 6.0]];
        let model = ColorModel::fit(&samples, &[0; 4], 1);
        let component = model.components[0];

        assert!((component.mean - Vector3::new(0.5, 1.0, 1.5)).norm() < 1e-12);
        let covariance = component
            .inverse
            .try_inverse()
            .expect("Inverse of a covariance is invertible");
        assert!((covariance[(0, 0)] - 0.75).abs() < 1e-9);
        assert!((covariance[(0, 1)] + 0.5).abs() < 1e-9);
        assert!((component.determinant - covariance.determinant()).abs() < 1e-9);
    }
}
