//! Shapes that can take part in alignment snapping.
//!
//! The index never looks at concrete shape types. Anything that can report an
//! axis-aligned bounding box, a position and whether it may be dragged can be
//! registered through the [`Alignable`] trait.

mod ellipse;
mod rectangle;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Capability set the alignment index needs from a shape.
pub trait Alignable {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the axis-aligned bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Get the position the host moves when the shape is dragged.
    fn position(&self) -> Point;

    /// Whether the host allows this shape to be dragged.
    fn is_draggable(&self) -> bool {
        true
    }

    /// Offset from the position to the top-left corner of the bounding box.
    fn box_offset(&self) -> Vec2 {
        self.bounds().origin() - self.position()
    }
}

/// Enum wrapper for the shape types shipped with the crate (for serialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
}

impl Shape {
    /// Move the shape so that its position becomes `position`.
    pub fn set_position(&mut self, position: Point) {
        match self {
            Shape::Rectangle(r) => r.position = position,
            Shape::Ellipse(e) => e.center = position,
        }
    }

    /// Set the bounding box size, keeping the position.
    pub fn set_size(&mut self, width: f64, height: f64) {
        match self {
            Shape::Rectangle(r) => {
                r.width = width;
                r.height = height;
            }
            Shape::Ellipse(e) => {
                e.radius_x = width / 2.0;
                e.radius_y = height / 2.0;
            }
        }
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        match self {
            Shape::Rectangle(r) => r.draggable = draggable,
            Shape::Ellipse(e) => e.draggable = draggable,
        }
    }
}

impl Alignable for Shape {
    fn id(&self) -> ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Ellipse(s) => s.id(),
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
        }
    }

    fn position(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.position(),
            Shape::Ellipse(s) => s.position(),
        }
    }

    fn is_draggable(&self) -> bool {
        match self {
            Shape::Rectangle(s) => s.is_draggable(),
            Shape::Ellipse(s) => s.is_draggable(),
        }
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Shape::Rectangle(rect)
    }
}

impl From<Ellipse> for Shape {
    fn from(ellipse: Ellipse) -> Self {
        Shape::Ellipse(ellipse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_box_offset_is_zero() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 30.0, 40.0);
        assert_eq!(rect.box_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_ellipse_box_offset_is_negative_radius() {
        let ellipse = Ellipse::new(Point::new(50.0, 50.0), 10.0, 5.0);
        assert_eq!(ellipse.box_offset(), Vec2::new(-10.0, -5.0));
    }

    #[test]
    fn test_shape_set_size() {
        let mut shape: Shape = Ellipse::new(Point::new(0.0, 0.0), 10.0, 10.0).into();
        shape.set_size(40.0, 20.0);
        assert_eq!(shape.bounds(), Rect::new(-20.0, -10.0, 20.0, 10.0));
    }

    #[test]
    fn test_shape_serde_roundtrip_keeps_id() {
        let shape: Shape = Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0).into();
        let json = serde_json::to_string(&shape).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), shape.id());
        assert_eq!(back.bounds(), shape.bounds());
    }
}
