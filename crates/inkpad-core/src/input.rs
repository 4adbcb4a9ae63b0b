//! Input events delivered to a drawing surface.
//!
//! Mouse and touch input are unified into [`PointerEvent`]; the host is
//! responsible for picking the relevant touch point.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are viewport (client) coordinates in CSS pixels, paired with
/// the surface's on-screen origin at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Mouse down or touch start.
    Down {
        position: Point,
        surface_origin: Point,
    },
    /// Mouse or touch move.
    Move {
        position: Point,
        surface_origin: Point,
    },
    /// Mouse up or touch end.
    Up,
    /// The pointer left the surface bounds.
    Leave,
}

impl PointerEvent {
    /// Position relative to the surface's top-left corner, if the event has
    /// one.
    pub fn local_position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Down {
                position,
                surface_origin,
            }
            | PointerEvent::Move {
                position,
                surface_origin,
            } => Some(to_local(position, surface_origin)),
            PointerEvent::Up | PointerEvent::Leave => None,
        }
    }
}

/// Translate a viewport position into surface-local coordinates.
pub fn to_local(position: Point, surface_origin: Point) -> Point {
    (position - surface_origin).to_point()
}

/// A key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    /// The key value as reported by the host (e.g. `"z"`, `"Escape"`).
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A key pressed with Ctrl held.
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self::new(
            key,
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_position_subtracts_origin() {
        let event = PointerEvent::Down {
            position: Point::new(150.0, 120.0),
            surface_origin: Point::new(100.0, 100.0),
        };
        assert_eq!(event.local_position(), Some(Point::new(50.0, 20.0)));
    }

    #[test]
    fn test_up_and_leave_have_no_position() {
        assert_eq!(PointerEvent::Up.local_position(), None);
        assert_eq!(PointerEvent::Leave.local_position(), None);
    }

    #[test]
    fn test_negative_local_position() {
        let p = to_local(Point::new(5.0, 5.0), Point::new(10.0, 20.0));
        assert_eq!(p, Point::new(-5.0, -15.0));
    }

    #[test]
    fn test_command_modifier() {
        assert!(!Modifiers::default().command());
        assert!(KeyPress::ctrl("z").modifiers.command());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert!(meta.command());
    }
}
