//! Native payload decoding
//!
//! Pure functions turning GLFW-style buttons, actions and offsets into the
//! toolkit's event ids and coordinate convention.

use crate::platform::{Action, Modifiers, MouseButton};
use crate::toolkit::EventId;

/// Modifier flags as `(control, shift, alt)`
pub const fn split_modifiers(mods: Modifiers) -> (bool, bool, bool) {
    (
        mods.contains(Modifiers::CONTROL),
        mods.contains(Modifiers::SHIFT),
        mods.contains(Modifiers::ALT),
    )
}

/// Event raised by a mouse button transition
///
/// Exactly one event per transition; buttons beyond the first three and
/// repeat actions raise nothing.
pub const fn button_event(button: MouseButton, action: Action) -> Option<EventId> {
    let event = match (action, button) {
        (Action::Press, MouseButton::Left) => EventId::LeftButtonPress,
        (Action::Press, MouseButton::Middle) => EventId::MiddleButtonPress,
        (Action::Press, MouseButton::Right) => EventId::RightButtonPress,
        (Action::Release, MouseButton::Left) => EventId::LeftButtonRelease,
        (Action::Release, MouseButton::Middle) => EventId::MiddleButtonRelease,
        (Action::Release, MouseButton::Right) => EventId::RightButtonRelease,
        _ => return None,
    };
    Some(event)
}

/// Event raised by a scroll offset
///
/// Vertical motion wins; horizontal motion only counts when there is no
/// vertical component. No motion raises nothing.
pub fn scroll_event(dx: f64, dy: f64) -> Option<EventId> {
    if dy > 0.0 {
        Some(EventId::MouseWheelForward)
    } else if dy < 0.0 {
        Some(EventId::MouseWheelBackward)
    } else if dx > 0.0 {
        Some(EventId::MouseWheelRight)
    } else if dx < 0.0 {
        Some(EventId::MouseWheelLeft)
    } else {
        None
    }
}

/// Event raised by a key transition
pub const fn key_event(action: Action) -> EventId {
    match action {
        Action::Release => EventId::KeyRelease,
        Action::Press | Action::Repeat => EventId::KeyPress,
    }
}

/// Convert a native (top-left origin) position to the toolkit's bottom-left origin
#[allow(clippy::cast_possible_truncation)]
pub fn flip_y(x: f64, y: f64, height: i32) -> (i32, i32) {
    (x as i32, height - y as i32 - 1)
}

/// Character for a key symbol, when the symbol is a single character
pub fn key_code_from_symbol(symbol: Option<&str>) -> Option<char> {
    let mut chars = symbol?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_button_maps_to_one_event() {
        assert_eq!(button_event(MouseButton::Left, Action::Press), Some(EventId::LeftButtonPress));
        assert_eq!(button_event(MouseButton::Middle, Action::Press), Some(EventId::MiddleButtonPress));
        assert_eq!(button_event(MouseButton::Right, Action::Press), Some(EventId::RightButtonPress));
        assert_eq!(button_event(MouseButton::Left, Action::Release), Some(EventId::LeftButtonRelease));
        assert_eq!(button_event(MouseButton::Middle, Action::Release), Some(EventId::MiddleButtonRelease));
        assert_eq!(button_event(MouseButton::Right, Action::Release), Some(EventId::RightButtonRelease));
    }

    #[test]
    fn test_unhandled_buttons() {
        assert_eq!(button_event(MouseButton::Other(4), Action::Press), None);
        assert_eq!(button_event(MouseButton::Left, Action::Repeat), None);
    }

    #[test]
    fn test_scroll_direction() {
        assert_eq!(scroll_event(0.0, 1.0), Some(EventId::MouseWheelForward));
        assert_eq!(scroll_event(3.0, -0.5), Some(EventId::MouseWheelBackward));
        assert_eq!(scroll_event(1.0, 0.0), Some(EventId::MouseWheelRight));
        assert_eq!(scroll_event(-1.0, 0.0), Some(EventId::MouseWheelLeft));
        assert_eq!(scroll_event(0.0, 0.0), None);
    }

    #[test]
    fn test_key_event() {
        assert_eq!(key_event(Action::Press), EventId::KeyPress);
        assert_eq!(key_event(Action::Repeat), EventId::KeyPress);
        assert_eq!(key_event(Action::Release), EventId::KeyRelease);
    }

    #[test]
    fn test_flip_y() {
        assert_eq!(flip_y(10.0, 0.0, 300), (10, 299));
        assert_eq!(flip_y(10.7, 299.0, 300), (10, 0));
    }

    #[test]
    fn test_split_modifiers() {
        assert_eq!(split_modifiers(Modifiers::CONTROL | Modifiers::ALT), (true, false, true));
        assert_eq!(split_modifiers(Modifiers::empty()), (false, false, false));
    }

    #[test]
    fn test_key_code_from_symbol() {
        assert_eq!(key_code_from_symbol(Some("a")), Some('a'));
        assert_eq!(key_code_from_symbol(Some("Escape")), None);
        assert_eq!(key_code_from_symbol(None), None);
    }
}
