use serde::{Deserialize, Serialize};

use super::types::{Category, Point};

/// Bow of the arc drawn for each category, as a fraction of the endpoint
/// distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveProfile {
    #[serde(default = "default_blood")]
    pub blood: f64,
    #[serde(default = "default_marriage")]
    pub marriage: f64,
    #[serde(default = "default_friendship")]
    pub friendship: f64,
    #[serde(default = "default_community")]
    pub community: f64,
}

fn default_blood() -> f64 {
    0.4
}
fn default_marriage() -> f64 {
    0.35
}
fn default_friendship() -> f64 {
    0.25
}
fn default_community() -> f64 {
    0.2
}

impl Default for CurveProfile {
    fn default() -> Self {
        Self::vivid()
    }
}

impl CurveProfile {
    /// Stronger bonds bow further.
    pub fn vivid() -> Self {
        Self {
            blood: default_blood(),
            marriage: default_marriage(),
            friendship: default_friendship(),
            community: default_community(),
        }
    }

    /// One gentle arc for every category.
    pub fn classic() -> Self {
        Self::uniform(0.3)
    }

    pub fn uniform(factor: f64) -> Self {
        Self {
            blood: factor,
            marriage: factor,
            friendship: factor,
            community: factor,
        }
    }

    pub fn factor(&self, category: Category) -> f64 {
        match category {
            Category::Blood => self.blood,
            Category::Marriage => self.marriage,
            Category::Friendship => self.friendship,
            Category::Community => self.community,
        }
    }
}

/// Quadratic Bezier path: start, one control point, end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCurve {
    pub start: Point,
    pub control: Point,
    pub end: Point,
}

/// Arc from `start` to `end` whose control point sits on the perpendicular
/// through the midpoint, `distance * factor(category)` away.
///
/// Coincident endpoints give a zero-length curve with the control point on
/// the endpoints.
pub fn curve(start: Point, end: Point, category: Category, profile: &CurveProfile) -> QuadCurve {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let distance = dx.hypot(dy);

    if !distance.is_finite() || distance < f64::EPSILON {
        return QuadCurve {
            start,
            control: start,
            end,
        };
    }

    let offset = distance * profile.factor(category);
    let (perp_x, perp_y) = (-dy / distance, dx / distance);
    let mid = start.midpoint(end);

    QuadCurve {
        start,
        control: Point::new(mid.x + perp_x * offset, mid.y + perp_y * offset),
        end,
    }
}

impl QuadCurve {
    /// Point at parameter `t`, clamped to [0, 1].
    pub fn point_at(&self, t: f64) -> Point {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let u = 1.0 - t;
        Point::new(
            u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
            u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
        )
    }

    /// `n` points at `t = i / n` for `i` in `0..n`.
    pub fn sample(&self, n: usize) -> Vec<Point> {
        (0..n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }

    /// Polyline estimate of the arc length.
    pub fn length(&self) -> f64 {
        const SEGMENTS: usize = 32;
        let mut total = 0.0;
        let mut prev = self.start;
        for i in 1..=SEGMENTS {
            let p = self.point_at(i as f64 / SEGMENTS as f64);
            total += prev.distance(p);
            prev = p;
        }
        total
    }

    pub fn is_degenerate(&self) -> bool {
        self.start.distance(self.end) < f64::EPSILON
    }

    /// Distance of the control point from the chord's midpoint.
    pub fn bow(&self) -> f64 {
        self.start.midpoint(self.end).distance(self.control)
    }

    pub fn svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const A: Point = Point::new(0.0, 0.0);
    const B: Point = Point::new(100.0, 0.0);

    #[test]
    fn horizontal_friendship_bows_perpendicular() {
        let c = curve(A, B, Category::Friendship, &CurveProfile::vivid());
        // perp of (100, 0) is (0, 1); offset 100 * 0.25.
        assert!((c.control.x - 50.0).abs() < 1e-9);
        assert!((c.control.y - 25.0).abs() < 1e-9);
        assert!(c.bow() > 0.0);
    }

    #[test]
    fn blood_bows_more_than_community() {
        let p = CurveProfile::vivid();
        let blood = curve(A, B, Category::Blood, &p);
        let community = curve(A, B, Category::Community, &p);
        assert!(blood.bow() > community.bow());
    }

    #[test]
    fn coincident_endpoints_give_a_zero_length_curve() {
        let p = Point::new(42.0, 17.0);
        for category in Category::ALL {
            let c = curve(p, p, category, &CurveProfile::vivid());
            assert!(c.is_degenerate());
            assert!(c.control.is_finite());
            assert_eq!(c.control, p);
            assert!(c.point_at(0.5).is_finite());
            assert_eq!(c.length(), 0.0);
            assert!(!c.svg_path().contains("NaN"));
        }
    }

    #[test]
    fn endpoints_are_interpolated() {
        let c = curve(A, B, Category::Marriage, &CurveProfile::vivid());
        assert_eq!(c.point_at(0.0), A);
        assert_eq!(c.point_at(1.0), B);
        assert_eq!(c.point_at(7.0), B);
    }

    #[test]
    fn arc_is_longer_than_chord() {
        let c = curve(A, B, Category::Blood, &CurveProfile::vivid());
        assert!(c.length() > 100.0);
    }

    #[test]
    fn sample_starts_at_start_and_excludes_end() {
        let c = curve(A, B, Category::Blood, &CurveProfile::vivid());
        let pts = c.sample(4);
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0], A);
        assert!(pts.iter().all(|p| *p != B));
    }

    #[test]
    fn svg_path_is_move_then_quadratic() {
        let c = curve(A, B, Category::Friendship, &CurveProfile::vivid());
        assert_eq!(c.svg_path(), "M 0.00 0.00 Q 50.00 25.00 100.00 0.00");
    }

    proptest! {
        #[test]
        fn curves_are_deterministic(
            x1 in -1000.0f64..1000.0, y1 in -1000.0f64..1000.0,
            x2 in -1000.0f64..1000.0, y2 in -1000.0f64..1000.0,
            idx in 0usize..4,
        ) {
            let category = Category::ALL[idx];
            let profile = CurveProfile::vivid();
            let a = curve(Point::new(x1, y1), Point::new(x2, y2), category, &profile);
            let b = curve(Point::new(x1, y1), Point::new(x2, y2), category, &profile);
            prop_assert_eq!(a, b);
            prop_assert!(a.control.is_finite());
        }

        #[test]
        fn control_point_is_equidistant_from_endpoints(
            x2 in 1.0f64..500.0, y2 in -500.0f64..500.0, idx in 0usize..4,
        ) {
            let c = curve(A, Point::new(x2, y2), Category::ALL[idx], &CurveProfile::vivid());
            let da = c.control.distance(c.start);
            let db = c.control.distance(c.end);
            prop_assert!((da - db).abs() < 1e-6 * da.max(1.0));
        }
    }
}
