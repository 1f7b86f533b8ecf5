//! Trajetórias em passos inteiros
//!
//! Os extremos viram índices inteiros (`índice = ângulo / resolução`,
//! truncado) e cada índice volta a ângulo com `índice * resolução`. Isso fixa
//! o número de comandos PWM independentemente de erro de ponto flutuante.
//!
//! O índice final é sempre `índice(dst) + 1` (exclusivo), nos dois sentidos.
//! No sentido reverso a trajetória termina então um passo antes de `dst`.

use serde::{Deserialize, Serialize};

use crate::error::{ActuatorError, ActuatorResult};
use crate::types::{Direction, MIN_STEP_RESOLUTION};

/// Gerador de trajetórias com resolução fixa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    resolution: f64,
}

impl Trajectory {
    pub fn new(resolution: f64) -> ActuatorResult<Self> {
        if !resolution.is_finite() || resolution < MIN_STEP_RESOLUTION {
            return Err(ActuatorError::InvalidConfig(format!(
                "step resolution must be a finite number >= {}, got {}",
                MIN_STEP_RESOLUTION, resolution
            )));
        }
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Índice inteiro (truncado em direção a zero) de um ângulo
    pub fn index_of(&self, angle: f64) -> i64 {
        (angle / self.resolution).trunc() as i64
    }

    /// Sequência de ângulos de `src` até `dst`
    pub fn steps(&self, src: f64, dst: f64, direction: Direction) -> Steps {
        Steps {
            next: self.index_of(src),
            end: self.index_of(dst).saturating_add(1),
            step: direction.step(),
            resolution: self.resolution,
        }
    }

    pub fn segment_steps(&self, segment: Segment) -> Steps {
        self.steps(segment.src, segment.dst, segment.direction)
    }

    /// Os três segmentos de uma varredura completa
    pub fn sweep(&self, center: f64, min: f64, max: f64, pattern: SweepPattern) -> [Segment; 3] {
        match pattern {
            SweepPattern::MaxFirst => [
                Segment::new(center, max, Direction::Forward),
                Segment::new(max, min, Direction::Reverse),
                Segment::new(min, center, Direction::Forward),
            ],
            SweepPattern::MinFirst => [
                Segment::new(center, min, Direction::Reverse),
                Segment::new(min, max, Direction::Forward),
                Segment::new(max, center, Direction::Reverse),
            ],
        }
    }
}

/// Trecho de uma varredura
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub src: f64,
    pub dst: f64,
    pub direction: Direction,
}

impl Segment {
    pub fn new(src: f64, dst: f64, direction: Direction) -> Self {
        Self { src, dst, direction }
    }
}

/// Ordem dos extremos numa varredura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPattern {
    /// centro → máximo → mínimo → centro
    #[default]
    MaxFirst,
    /// centro → mínimo → máximo → centro
    MinFirst,
}

/// Iterador de ângulos de uma trajetória
#[derive(Debug, Clone)]
pub struct Steps {
    next: i64,
    end: i64,
    step: i64,
    resolution: f64,
}

impl Iterator for Steps {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let in_range = if self.step > 0 {
            self.next < self.end
        } else {
            self.next > self.end
        };
        if !in_range {
            return None;
        }
        let angle = self.next as f64 * self.resolution;
        self.next += self.step;
        Some(angle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.step > 0 {
            self.end.saturating_sub(self.next).max(0)
        } else {
            self.next.saturating_sub(self.end).max(0)
        } as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Steps {}

/// Pontos de um círculo de raio `radius` (graus), para uso com
/// `position(x, y)`. Começa em `(radius, 0)` e fecha no ponto inicial.
pub fn circle_path(radius: f64, points: usize) -> impl Iterator<Item = (f64, f64)> {
    let points = points.max(1);
    (0..=points).map(move |i| {
        let theta = std::f64::consts::TAU * i as f64 / points as f64;
        (radius * theta.cos(), radius * theta.sin())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn traj() -> Trajectory {
        Trajectory::new(0.3).unwrap()
    }

    #[test]
    fn test_full_range_step_count() {
        let steps: Vec<f64> = traj().steps(-90.0, 90.0, Direction::Forward).collect();
        assert_eq!(steps.len(), 601);
        assert!(steps.windows(2).all(|w| w[1] > w[0]));
        assert!((steps[0] + 90.0).abs() < 1e-9);
        assert!((steps[600] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_size() {
        let steps = traj().steps(-90.0, 90.0, Direction::Forward);
        assert_eq!(steps.len(), 601);
        let reverse = traj().steps(90.0, -90.0, Direction::Reverse);
        assert_eq!(reverse.len(), 599);
        assert_eq!(reverse.count(), 599);
    }

    #[test]
    fn test_reverse_stops_one_step_short() {
        let steps: Vec<f64> = traj().steps(90.0, -90.0, Direction::Reverse).collect();
        assert!((steps[0] - 90.0).abs() < 1e-9);
        let last = *steps.last().unwrap();
        assert!((last - (-298.0 * 0.3)).abs() < 1e-9);
        assert!(steps.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_direction_disagreement_is_empty() {
        assert_eq!(traj().steps(0.0, 90.0, Direction::Reverse).count(), 0);
        assert_eq!(traj().steps(90.0, 0.0, Direction::Forward).count(), 0);
    }

    #[test]
    fn test_truncation_toward_zero() {
        let t = traj();
        assert_eq!(t.index_of(1.0), 3);
        assert_eq!(t.index_of(-1.0), -3);
        assert_eq!(t.index_of(0.29), 0);
    }

    #[test]
    fn test_angles_are_multiples_of_resolution() {
        for angle in traj().steps(-10.0, 10.0, Direction::Forward) {
            let idx = (angle / 0.3).round();
            assert!((idx * 0.3 - angle).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(Trajectory::new(0.0).is_err());
        assert!(Trajectory::new(-0.3).is_err());
        assert!(Trajectory::new(f64::NAN).is_err());
    }

    #[test]
    fn test_sweep_patterns() {
        let t = traj();
        let max_first = t.sweep(0.0, -90.0, 90.0, SweepPattern::MaxFirst);
        assert_eq!(max_first[0], Segment::new(0.0, 90.0, Direction::Forward));
        assert_eq!(max_first[1], Segment::new(90.0, -90.0, Direction::Reverse));
        assert_eq!(max_first[2], Segment::new(-90.0, 0.0, Direction::Forward));

        let min_first = t.sweep(0.0, -90.0, 90.0, SweepPattern::MinFirst);
        assert_eq!(min_first[0].direction, Direction::Reverse);
        assert_eq!(min_first[1], Segment::new(-90.0, 90.0, Direction::Forward));
    }

    #[test]
    fn test_resolution_lower_bound() {
        assert!(Trajectory::new(MIN_STEP_RESOLUTION).is_ok());
        assert!(Trajectory::new(1e-300).is_err());
        assert!(Trajectory::new(f64::NAN).is_err());
        assert!(Trajectory::new(-0.3).is_err());
    }

    #[test]
    fn test_huge_endpoints_saturate() {
        let t = traj();
        let steps = t.steps(0.0, f64::MAX, Direction::Forward);
        assert_eq!(steps.len(), i64::MAX as usize);
        let mut reverse = t.steps(f64::MIN, 0.0, Direction::Reverse);
        assert_eq!(reverse.len(), 0);
        assert_eq!(reverse.next(), None);
    }

    #[test]
    fn test_circle_path_closes() {
        let points: Vec<(f64, f64)> = circle_path(30.0, 8).collect();
        assert_eq!(points.len(), 9);
        let (x0, y0) = points[0];
        let (xn, yn) = points[8];
        assert!((x0 - 30.0).abs() < 1e-9 && y0.abs() < 1e-9);
        assert!((xn - x0).abs() < 1e-9 && (yn - y0).abs() < 1e-9);
        for (x, y) in points {
            assert!(((x * x + y * y).sqrt() - 30.0).abs() < 1e-9);
        }
    }
}
