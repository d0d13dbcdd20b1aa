//! Integer points and rectangles shared by capture, selection and cropping.

/// A point in virtual-screen or canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Clamps into `[bounds.x, bounds.right()] × [bounds.y, bounds.bottom()]`.
    /// The right and bottom edges are inclusive so a corner can sit on them.
    pub fn clamp_to(self, bounds: Rect) -> Point {
        Point {
            x: self.x.clamp(bounds.x, bounds.right()),
            y: self.y.clamp(bounds.y, bounds.bottom()),
        }
    }
}

/// Axis-aligned rectangle. `w`/`h` may be zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Rect { x, y, w, h }
    }

    /// Builds the normalized rectangle spanned by two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (x0, x1) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (y0, y1) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        Rect {
            x: x0,
            y: y0,
            w: x0.abs_diff(x1),
            h: y0.abs_diff(y1),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            Point::new(self.x.min(other.x), self.y.min(other.y)),
            Point::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    /// Clamps both corners into `bounds`. The result always lies inside
    /// `bounds`, possibly with zero width or height.
    pub fn clamp_to(&self, bounds: Rect) -> Rect {
        Rect::from_corners(
            self.origin().clamp_to(bounds),
            Point::new(self.right(), self.bottom()).clamp_to(bounds),
        )
    }

    /// Same rectangle expressed relative to `origin`.
    pub fn offset_from(&self, origin: Point) -> Rect {
        Rect::new(self.x - origin.x, self.y - origin.y, self.w, self.h)
    }
}

/// Union of a sequence of rectangles, `None` when the sequence is empty.
pub fn union_all<'a, I>(rects: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Rect>,
{
    rects.into_iter().fold(None, |acc: Option<Rect>, r| match acc {
        Some(u) => Some(u.union(r)),
        None => Some(*r),
    })
}
