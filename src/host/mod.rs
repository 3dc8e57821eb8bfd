//! Host Capabilities
//!
//! Everything the widget consumes from the page it is mounted on: a
//! surface to listen on and draw layers over, a frame clock, a style sink
//! and an optional narration engine. The widget never touches host
//! content directly; it only goes through these traits.

pub mod headless;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::overlay::{LayerPaint, OverlayKind};

/// A point in surface coordinates (CSS pixels, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether the point lies inside (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

macro_rules! host_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub u64);
    };
}

host_id!(
    /// Content element on the host surface
    ElementId
);
host_id!(
    /// Overlay layer mounted by the widget
    LayerId
);
host_id!(
    /// Registered event listener
    ListenerId
);
host_id!(
    /// Pending next-frame request
    FrameId
);
host_id!(
    /// Utterance submitted to the narration engine
    UtteranceId
);

static NEXT_UTTERANCE: AtomicU64 = AtomicU64::new(1);

impl UtteranceId {
    /// Allocate a process-unique utterance id
    pub fn next() -> Self {
        UtteranceId(NEXT_UTTERANCE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Host event types a listener can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EventType {
    PointerMove,
    TouchMove,
    PointerLeave,
    SelectionChange,
}

/// Which part of the widget a listener belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ListenerOwner {
    Overlay(OverlayKind),
    SelectionReader,
}

/// Listener registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerSpec {
    pub owner: ListenerOwner,
    pub event: EventType,
}

/// Pointer or touch input delivered to a listener
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer or touch moved. `over_layer` is set when the event target is
    /// one of the widget's own layers rather than host content.
    Move {
        position: Point,
        over_layer: Option<LayerId>,
    },
    /// Pointer left the tracked surface
    Leave,
}

/// Events the host loop delivers to [`crate::Widget::handle_event`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// Input for a pointer/touch listener
    Pointer {
        listener: ListenerId,
        event: PointerEvent,
    },
    /// Text selection changed; `text` is the selection at event time
    Selection { listener: ListenerId, text: String },
    /// A requested frame is due
    Frame(FrameId),
}

/// Opaque deep copy of an element's rendered subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSnapshot {
    /// Element the copy was taken from
    pub source: ElementId,
    /// Serialized markup of the copy
    pub markup: String,
}

/// Global style variables and injected stylesheets
pub trait StyleSink: Send + Sync {
    /// Set a root style variable
    fn set_var(&self, name: &str, value: &str);
    /// Remove a root style variable
    fn clear_var(&self, name: &str);
    /// Inject (or replace) a stylesheet under `id`
    fn inject_stylesheet(&self, id: &str, css: &str);
    /// Remove the stylesheet registered under `id`
    fn remove_stylesheet(&self, id: &str);
}

/// The root surface the widget is mounted over
pub trait Surface: Send + Sync {
    /// Register a listener; events arrive as [`HostEvent`]s tagged with the id
    fn add_listener(&self, spec: ListenerSpec) -> ListenerId;
    /// Detach a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Create a non-interactive layer above host content
    fn mount_layer(&self, kind: OverlayKind) -> LayerId;
    /// Replace a layer's paint
    fn paint_layer(&self, id: LayerId, paint: &LayerPaint);
    /// Remove a layer. Unknown ids are ignored.
    fn remove_layer(&self, id: LayerId);

    /// Topmost content element under `point`. Widget layers are never hit.
    fn hit_test(&self, point: Point) -> Option<ElementId>;
    /// Bounding box of an element
    fn element_bounds(&self, id: ElementId) -> Option<Rect>;
    /// Deep copy of an element's rendered subtree
    fn clone_subtree(&self, id: ElementId) -> Option<ContentSnapshot>;

    /// Current text selection, if any
    fn selected_text(&self) -> Option<String>;
    /// Text of designated content regions, excluding the widget's own UI
    fn content_region_text(&self) -> Vec<String>;
    /// Readable text of the whole surface, excluding the widget's own UI
    fn surface_text(&self) -> String;
    /// User language tag (e.g. `en-US`)
    fn language(&self) -> Option<String>;
}

/// Schedules callbacks for the next rendering tick
pub trait FrameClock: Send + Sync {
    /// Request a frame; the host later delivers `HostEvent::Frame(id)`
    fn request_frame(&self) -> FrameId;
    /// Cancel a pending request. A cancelled frame is never delivered.
    fn cancel_frame(&self, id: FrameId);
}

/// A narration voice offered by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One utterance submitted to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    /// `None` leaves voice choice to the engine
    pub voice: Option<Voice>,
}

/// Lifecycle callback kinds reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationEventKind {
    Started,
    Ended,
    Failed(String),
}

/// Lifecycle callback for a submitted utterance
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationEvent {
    pub utterance: UtteranceId,
    pub kind: NarrationEventKind,
}

/// Text-to-speech capability.
///
/// `speak` returns immediately; progress is reported through the
/// [`NarrationSender`] the engine was built with. `cancel` must silence the
/// engine before returning.
pub trait NarrationEngine: Send + Sync {
    fn voices(&self) -> Vec<Voice>;
    fn speak(&self, request: UtteranceRequest);
    fn cancel(&self);
}

pub type NarrationSender = Sender<NarrationEvent>;
pub type NarrationReceiver = Receiver<NarrationEvent>;

/// Channel pair connecting an engine to the widget
pub fn narration_channel() -> (NarrationSender, NarrationReceiver) {
    unbounded()
}

/// A narration engine together with the receiving end of its event channel
#[derive(Clone)]
pub struct NarrationLink {
    pub engine: Arc<dyn NarrationEngine>,
    pub events: NarrationReceiver,
}

/// All host capabilities handed to the widget at mount
#[derive(Clone)]
pub struct Host {
    pub surface: Arc<dyn Surface>,
    pub frames: Arc<dyn FrameClock>,
    pub styles: Arc<dyn StyleSink>,
    /// `None` when the host has no speech support
    pub narration: Option<NarrationLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(110.0, 70.0)));
        assert!(!rect.contains(Point::new(9.9, 20.0)));
        assert!(!rect.contains(Point::new(50.0, 70.1)));
    }

    #[test]
    fn test_utterance_ids_are_unique() {
        let a = UtteranceId::next();
        let b = UtteranceId::next();
        assert_ne!(a, b);
    }
}
