use crate::geometry::{Point, lerp};

const QUADRATIC_STEPS: usize = 16;
const CUBIC_STEPS: usize = 24;

/// The current path of a surface, already flattened into polylines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    subpaths: Vec<Vec<Point>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.subpaths.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|s| s.len() < 2)
    }

    pub fn subpaths(&self) -> &[Vec<Point>] {
        &self.subpaths
    }

    fn current_point(&self) -> Option<Point> {
        self.subpaths.last().and_then(|s| s.last().copied())
    }

    pub fn move_to(&mut self, point: Point) {
        self.subpaths.push(vec![point]);
    }

    /// Without a current point this starts a new subpath, as `move_to` would
    pub fn line_to(&mut self, point: Point) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push(point),
            None => self.move_to(point),
        }
    }

    pub fn quadratic_curve_to(&mut self, control: Point, to: Point) {
        let from = match self.current_point() {
            Some(p) => p,
            None => {
                self.move_to(control);
                control
            }
        };
        for i in 1..=QUADRATIC_STEPS {
            let t = i as f32 / QUADRATIC_STEPS as f32;
            let a = lerp(from, control, t);
            let b = lerp(control, to, t);
            self.line_to(lerp(a, b, t));
        }
    }

    pub fn bezier_curve_to(&mut self, control1: Point, control2: Point, to: Point) {
        let from = match self.current_point() {
            Some(p) => p,
            None => {
                self.move_to(control1);
                control1
            }
        };
        for i in 1..=CUBIC_STEPS {
            let t = i as f32 / CUBIC_STEPS as f32;
            let a = lerp(from, control1, t);
            let b = lerp(control1, control2, t);
            let c = lerp(control2, to, t);
            let ab = lerp(a, b, t);
            let bc = lerp(b, c, t);
            self.line_to(lerp(ab, bc, t));
        }
    }

    /// Every drawable segment of the path
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.subpaths
            .iter()
            .flat_map(|subpath| subpath.windows(2).map(|w| (w[0], w[1])))
    }
}
