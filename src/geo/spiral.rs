//! Square-spiral sampling around a center coordinate
//!
//! The walk keeps integer grid offsets `(x, y)`, a direction `d` (+1/-1)
//! and a ring counter `m`. It extends along x while `2*x*d < m`, then along
//! y while `2*y*d < m`, then flips `d` and grows `m`. `x` scales latitude,
//! `y` scales longitude. Every step counts toward `step_limit`, the start
//! point included.
//!
//! Every point after the start is emitted twice in a row. The pair shares
//! one jitter draw.

use super::Coordinate;
use rand::Rng;

/// Default jitter bound in degrees on each axis
pub const DEFAULT_JITTER_MAX: f64 = 0.0005;

/// Spiral walk parameters; cheap to copy, every call to `samples` restarts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralSampler {
    start: Coordinate,
    step_size: f64,
    step_limit: usize,
    jitter_max: f64,
}

impl SpiralSampler {
    pub fn new(start: Coordinate, step_size: f64, step_limit: usize) -> Self {
        Self {
            start,
            step_size,
            step_limit,
            jitter_max: DEFAULT_JITTER_MAX,
        }
    }

    pub fn with_jitter(mut self, jitter_max: f64) -> Self {
        self.jitter_max = jitter_max;
        self
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Pre-jitter grid offsets in emission order, duplicates included
    pub fn skeleton(&self) -> impl Iterator<Item = (i64, i64)> {
        SpiralOffsets::new(self.step_limit).flat_map(|(offset, repeat)| {
            std::iter::repeat(offset).take(repeat)
        })
    }

    /// Jittered sample coordinates in emission order
    pub fn samples<'r, R: Rng>(&self, rng: &'r mut R) -> Samples<'r, R> {
        Samples {
            sampler: *self,
            offsets: SpiralOffsets::new(self.step_limit),
            pending: None,
            rng,
        }
    }

    /// Number of coordinates `samples` yields
    pub fn sample_count(&self) -> usize {
        match self.step_limit {
            0 => 0,
            limit => 1 + 2 * (limit - 1),
        }
    }

    fn jitter<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.jitter_max > 0.0 {
            rng.gen_range(0.0..self.jitter_max)
        } else {
            0.0
        }
    }
}

/// Lazily walks the spiral; yields each grid offset with its repeat count
struct SpiralOffsets {
    steps: usize,
    step_limit: usize,
    x: i64,
    y: i64,
    d: i64,
    m: i64,
    axis: Axis,
    started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
}

impl SpiralOffsets {
    fn new(step_limit: usize) -> Self {
        Self {
            steps: 1,
            step_limit,
            x: 0,
            y: 0,
            d: 1,
            m: 1,
            axis: Axis::X,
            started: false,
        }
    }
}

impl Iterator for SpiralOffsets {
    type Item = ((i64, i64), usize);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return if self.step_limit == 0 { None } else { Some(((0, 0), 1)) };
        }

        // A flipped direction always admits the next extension, so this
        // terminates within one ring change.
        while self.steps < self.step_limit {
            match self.axis {
                Axis::X if 2 * self.x * self.d < self.m => {
                    self.x += self.d;
                    self.steps += 1;
                    return Some(((self.x, self.y), 2));
                }
                Axis::X => self.axis = Axis::Y,
                Axis::Y if 2 * self.y * self.d < self.m => {
                    self.y += self.d;
                    self.steps += 1;
                    return Some(((self.x, self.y), 2));
                }
                Axis::Y => {
                    self.d = -self.d;
                    self.m += 1;
                    self.axis = Axis::X;
                }
            }
        }
        None
    }
}

/// Iterator over jittered sample coordinates
pub struct Samples<'r, R> {
    sampler: SpiralSampler,
    offsets: SpiralOffsets,
    pending: Option<Coordinate>,
    rng: &'r mut R,
}

impl<R: Rng> Iterator for Samples<'_, R> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        if let Some(twin) = self.pending.take() {
            return Some(twin);
        }

        let ((x, y), repeat) = self.offsets.next()?;
        if repeat == 1 {
            return Some(self.sampler.start);
        }

        let step = self.sampler.step_size;
        let dlat = x as f64 * step + self.sampler.jitter(self.rng);
        let dlng = y as f64 * step + self.sampler.jitter(self.rng);
        let point = self.sampler.start.offset(dlat, dlng);
        self.pending = Some(point);
        Some(point)
    }
}

/// Static-map URL tracing the walk, for debug logs
pub fn static_map_path(points: &[Coordinate]) -> String {
    let path: Vec<String> = points
        .iter()
        .map(|p| format!("{},{}", p.lat, p.lng))
        .collect();
    format!(
        "http://maps.googleapis.com/maps/api/staticmap?size=400x400&path={}",
        path.join("|")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn center() -> Coordinate {
        Coordinate::new(37.0, -122.0).unwrap()
    }

    #[test]
    fn test_first_sample_is_start() {
        let sampler = SpiralSampler::new(center(), 0.001, 49);
        let mut rng = StdRng::seed_from_u64(7);
        let first = sampler.samples(&mut rng).next().unwrap();
        assert_eq!(first, center());
    }

    #[test]
    fn test_skeleton_is_stable_and_follows_spiral() {
        let sampler = SpiralSampler::new(center(), 0.001, 9);
        let a: Vec<_> = sampler.skeleton().collect();
        let b: Vec<_> = sampler.skeleton().collect();
        assert_eq!(a, b);

        let expected = vec![
            (0, 0),
            (1, 0), (1, 0),
            (1, 1), (1, 1),
            (0, 1), (0, 1),
            (-1, 1), (-1, 1),
            (-1, 0), (-1, 0),
            (-1, -1), (-1, -1),
            (0, -1), (0, -1),
            (1, -1), (1, -1),
        ];
        assert_eq!(a, expected);
    }

    #[test]
    fn test_interior_points_come_in_pairs() {
        let sampler = SpiralSampler::new(center(), 0.001, 49);
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<_> = sampler.samples(&mut rng).collect();

        assert_eq!(points.len(), 97);
        assert_eq!(points.len(), sampler.sample_count());
        for pair in points[1..].chunks(2) {
            assert_eq!(pair.len(), 2);
            assert_eq!(pair[0], pair[1]);
        }
        // Consecutive pairs are distinct grid points
        assert_ne!(points[1], points[3]);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let sampler = SpiralSampler::new(center(), 0.001, 49).with_jitter(0.0005);
        let skeleton: Vec<_> = sampler.skeleton().collect();
        let mut rng = StdRng::seed_from_u64(3);
        let points: Vec<_> = sampler.samples(&mut rng).collect();

        for ((x, y), point) in skeleton.iter().zip(points.iter()).skip(1) {
            let dlat = point.lat - (center().lat + *x as f64 * 0.001);
            let dlng = point.lng - (center().lng + *y as f64 * 0.001);
            assert!((-1e-9..0.0005 + 1e-9).contains(&dlat), "lat jitter {}", dlat);
            assert!((-1e-9..0.0005 + 1e-9).contains(&dlng), "lng jitter {}", dlng);
        }
    }

    #[test]
    fn test_single_step_yields_only_start() {
        let sampler = SpiralSampler::new(center(), 0.001, 1);
        let mut rng = StdRng::seed_from_u64(1);
        let points: Vec<_> = sampler.samples(&mut rng).collect();
        assert_eq!(points, vec![center()]);
        assert_eq!(sampler.sample_count(), 1);
    }

    #[test]
    fn test_zero_jitter_lands_on_grid() {
        let sampler = SpiralSampler::new(center(), 0.01, 3).with_jitter(0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let points: Vec<_> = sampler.samples(&mut rng).collect();
        assert_eq!(points.len(), 5);
        assert!((points[1].lat - 37.01).abs() < 1e-9);
        assert!((points[1].lng - -122.0).abs() < 1e-9);
        assert!((points[3].lat - 37.01).abs() < 1e-9);
        assert!((points[3].lng - -121.99).abs() < 1e-9);
    }

    #[test]
    fn test_static_map_path_lists_points() {
        let points = [
            Coordinate { lat: 1.0, lng: 2.0 },
            Coordinate { lat: 3.5, lng: -4.0 },
        ];
        assert_eq!(
            static_map_path(&points),
            "http://maps.googleapis.com/maps/api/staticmap?size=400x400&path=1,2|3.5,-4"
        );
    }
}
