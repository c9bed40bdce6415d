//! Layout system - percent geometry, pixel rectangles and layout strategies

/// Pixel rectangle (origin + size)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Check if point is inside rectangle (all four edges inclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x2() && y >= self.y && y <= self.y2()
    }

    /// Rectangle moved by `(dx, dy)`
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Rectangle grown by `amount` on every side
    pub fn outset(&self, amount: f64) -> Self {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Overlapping area of two rectangles (zero-sized when disjoint)
    pub fn intersect(&self, other: &Rect) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());
        Rect::new(x, y, (x2 - x).max(0.0), (y2 - y).max(0.0))
    }
}

/// Geometry expressed as percentages (intended 0-100) of the parent's pixel rect
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    /// Create percent geometry
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        PercentRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Cover the whole parent
    pub const fn full() -> Self {
        PercentRect::new(0.0, 0.0, 100.0, 100.0)
    }

    /// Resolve against a reference frame:
    /// `pixel = percent / 100 * parent_dimension + parent_origin`
    pub fn resolve(&self, parent: Rect) -> Rect {
        Rect {
            x: self.x / 100.0 * parent.width + parent.x,
            y: self.y / 100.0 * parent.height + parent.y,
            width: self.width / 100.0 * parent.width,
            height: self.height / 100.0 * parent.height,
        }
    }
}

/// Scaled resolution of the host surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl Viewport {
    /// Create a viewport with scale factor 1
    pub const fn new(width: f64, height: f64) -> Self {
        Viewport {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Set the scale factor
    pub const fn with_scale(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// The viewport as the root's reference frame
    pub fn frame(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(0.0, 0.0)
    }
}

/// Post-layout repositioning of a node's children
///
/// Called after the children's own geometry was recomputed. Returns one
/// `(dx, dy)` offset per child, applied before grandchildren are laid out.
pub trait LayoutStrategy {
    fn arrange(&mut self, parent: Rect, children: &[Rect]) -> Vec<(f64, f64)>;
}

/// Flows children left-to-right into a fixed number of columns
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    columns: usize,
    x_padding: f64,
    y_padding: f64,
}

impl GridLayout {
    /// Create a grid with default padding (10 horizontal, 5 vertical)
    pub fn new(columns: usize) -> Self {
        GridLayout {
            columns: columns.max(1),
            x_padding: 10.0,
            y_padding: 5.0,
        }
    }

    /// Set horizontal padding between columns
    pub fn with_x_padding(mut self, padding: f64) -> Self {
        self.x_padding = padding;
        self
    }

    /// Set vertical padding between rows
    pub fn with_y_padding(mut self, padding: f64) -> Self {
        self.y_padding = padding;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl LayoutStrategy for GridLayout {
    fn arrange(&mut self, parent: Rect, children: &[Rect]) -> Vec<(f64, f64)> {
        let column_width = parent.width / self.columns as f64 - self.x_padding;
        let mut row_height = 0.0f64;
        let mut column = 0usize;
        let mut y_offset = 0.0f64;

        let mut offsets = Vec::with_capacity(children.len());
        for child in children {
            if column >= self.columns {
                y_offset = (y_offset + row_height + self.y_padding).min(parent.height);
                column = 0;
                row_height = 0.0;
            }

            offsets.push((column_width * column as f64, y_offset));
            row_height = row_height.max(child.height);
            column += 1;
        }

        offsets
    }
}
