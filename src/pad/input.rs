use crate::pad::model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub client_x: f32,
    pub client_y: f32,
}

/// Raw device input as delivered by the host window.
///
/// Touch events carry one touch point each; a multi-finger gesture shows
/// up as several events with distinct ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    MouseDown { client_x: f32, client_y: f32 },
    MouseMove { client_x: f32, client_y: f32 },
    MouseUp,
    MouseLeave,
    TouchStart(TouchPoint),
    TouchMove(TouchPoint),
    TouchEnd { id: u64 },
    TouchCancel { id: u64 },
}

impl DeviceEvent {
    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            DeviceEvent::TouchStart(_)
                | DeviceEvent::TouchMove(_)
                | DeviceEvent::TouchEnd { .. }
                | DeviceEvent::TouchCancel { .. }
        )
    }
}

/// Canonical pointer stream consumed by the capture surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadEvent {
    Begin(Point),
    Extend(Point),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub event: Option<PadEvent>,
    /// Touch input over the pad must not scroll or zoom the host.
    pub prevent_default: bool,
}

impl Normalized {
    fn pass(event: Option<PadEvent>, prevent_default: bool) -> Self {
        Self {
            event,
            prevent_default,
        }
    }
}

/// Folds mouse and single-finger touch input into one [`PadEvent`] stream.
///
/// Only the first touch of a gesture is followed. While a touch gesture is
/// live, mouse events are dropped so emulated pointer events from the
/// platform cannot open a second stroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputNormalizer {
    origin: Point,
    mouse_down: bool,
    active_touch: Option<u64>,
}

impl InputNormalizer {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Update the surface origin, e.g. after the host layout moved the pad.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn active_touch(&self) -> Option<u64> {
        self.active_touch
    }

    fn local(&self, client_x: f32, client_y: f32) -> Point {
        Point::new(client_x - self.origin.x, client_y - self.origin.y)
    }

    pub fn normalize(&mut self, event: DeviceEvent) -> Normalized {
        let prevent_default = event.is_touch();
        let pad_event = match event {
            DeviceEvent::MouseDown { client_x, client_y } => {
                if self.active_touch.is_some() {
                    None
                } else {
                    self.mouse_down = true;
                    Some(PadEvent::Begin(self.local(client_x, client_y)))
                }
            }
            DeviceEvent::MouseMove { client_x, client_y } => {
                if self.mouse_down && self.active_touch.is_none() {
                    Some(PadEvent::Extend(self.local(client_x, client_y)))
                } else {
                    None
                }
            }
            DeviceEvent::MouseUp | DeviceEvent::MouseLeave => {
                if std::mem::take(&mut self.mouse_down) && self.active_touch.is_none() {
                    Some(PadEvent::End)
                } else {
                    None
                }
            }
            DeviceEvent::TouchStart(touch) => {
                if self.active_touch.is_some() {
                    None
                } else {
                    self.active_touch = Some(touch.id);
                    self.mouse_down = false;
                    Some(PadEvent::Begin(self.local(touch.client_x, touch.client_y)))
                }
            }
            DeviceEvent::TouchMove(touch) => {
                if self.active_touch == Some(touch.id) {
                    Some(PadEvent::Extend(self.local(touch.client_x, touch.client_y)))
                } else {
                    None
                }
            }
            DeviceEvent::TouchEnd { id } | DeviceEvent::TouchCancel { id } => {
                if self.active_touch == Some(id) {
                    self.active_touch = None;
                    Some(PadEvent::End)
                } else {
                    None
                }
            }
        };
        Normalized::pass(pad_event, prevent_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint {
            id,
            client_x: x,
            client_y: y,
        }
    }

    #[test]
    fn mouse_coordinates_are_made_surface_local() {
        let mut input = InputNormalizer::new(Point::new(100.0, 50.0));
        let out = input.normalize(DeviceEvent::MouseDown {
            client_x: 110.0,
            client_y: 70.0,
        });
        assert_eq!(out.event, Some(PadEvent::Begin(Point::new(10.0, 20.0))));
        assert!(!out.prevent_default);
    }

    #[test]
    fn hover_without_press_produces_nothing() {
        let mut input = InputNormalizer::default();
        let out = input.normalize(DeviceEvent::MouseMove {
            client_x: 1.0,
            client_y: 1.0,
        });
        assert_eq!(out.event, None);
        assert_eq!(input.normalize(DeviceEvent::MouseUp).event, None);
    }

    #[test]
    fn mouse_leave_ends_the_stroke() {
        let mut input = InputNormalizer::default();
        input.normalize(DeviceEvent::MouseDown {
            client_x: 1.0,
            client_y: 1.0,
        });
        assert_eq!(
            input.normalize(DeviceEvent::MouseLeave).event,
            Some(PadEvent::End)
        );
    }

    #[test]
    fn second_touch_is_ignored() {
        let mut input = InputNormalizer::default();
        assert!(matches!(
            input.normalize(DeviceEvent::TouchStart(touch(1, 5.0, 5.0))).event,
            Some(PadEvent::Begin(_))
        ));
        let second = input.normalize(DeviceEvent::TouchStart(touch(2, 50.0, 50.0)));
        assert_eq!(second.event, None);
        assert!(second.prevent_default);
        assert_eq!(
            input
                .normalize(DeviceEvent::TouchMove(touch(2, 60.0, 60.0)))
                .event,
            None
        );
        assert_eq!(input.normalize(DeviceEvent::TouchEnd { id: 2 }).event, None);
        assert_eq!(input.active_touch(), Some(1));
        assert_eq!(
            input.normalize(DeviceEvent::TouchEnd { id: 1 }).event,
            Some(PadEvent::End)
        );
    }

    #[test]
    fn emulated_mouse_events_are_dropped_during_touch() {
        let mut input = InputNormalizer::default();
        input.normalize(DeviceEvent::TouchStart(touch(7, 5.0, 5.0)));
        let emulated = input.normalize(DeviceEvent::MouseDown {
            client_x: 5.0,
            client_y: 5.0,
        });
        assert_eq!(emulated.event, None);
        assert_eq!(
            input.normalize(DeviceEvent::TouchCancel { id: 7 }).event,
            Some(PadEvent::End)
        );
        assert_eq!(input.normalize(DeviceEvent::MouseUp).event, None);
    }
}
