//! Headless in-memory host
//!
//! Implements every host capability without a real page: listeners, layers,
//! style variables and frame requests are recorded so they can be
//! inspected, and helper methods synthesize the events a browser would
//! deliver. Used by the demo binary and throughout the tests.

use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

use crate::host::{
    ContentSnapshot, ElementId, EventType, FrameClock, FrameId, HostEvent, LayerId, ListenerId,
    ListenerOwner, ListenerSpec, NarrationEngine, NarrationEvent, NarrationEventKind,
    NarrationSender, Point, PointerEvent, Rect, StyleSink, Surface, UtteranceId,
    UtteranceRequest, Voice,
};
use crate::overlay::{LayerPaint, OverlayKind};

#[derive(Debug, Clone)]
struct HeadlessElement {
    id: ElementId,
    bounds: Rect,
    markup: String,
}

#[derive(Debug, Clone)]
struct HeadlessLayer {
    kind: OverlayKind,
    paint: Option<LayerPaint>,
}

#[derive(Debug, Default)]
struct HostState {
    next_id: u64,
    listeners: BTreeMap<ListenerId, ListenerSpec>,
    layers: BTreeMap<LayerId, HeadlessLayer>,
    elements: Vec<HeadlessElement>,
    frames: BTreeSet<FrameId>,
    vars: BTreeMap<String, String>,
    stylesheets: BTreeMap<String, String>,
    selection: Option<String>,
    regions: Vec<String>,
    body_text: String,
    language: Option<String>,
}

impl HostState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory surface, frame clock and style sink
#[derive(Debug, Default)]
pub struct HeadlessHost {
    state: Mutex<HostState>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content element on top of the existing ones
    pub fn add_element(&self, bounds: Rect, markup: impl Into<String>) -> ElementId {
        let mut state = self.state.lock();
        let id = ElementId(state.allocate());
        state.elements.push(HeadlessElement {
            id,
            bounds,
            markup: markup.into(),
        });
        id
    }

    pub fn set_selection(&self, text: Option<&str>) {
        self.state.lock().selection = text.map(str::to_string);
    }

    pub fn set_content_regions(&self, regions: &[&str]) {
        self.state.lock().regions = regions.iter().map(|r| r.to_string()).collect();
    }

    pub fn set_body_text(&self, text: &str) {
        self.state.lock().body_text = text.to_string();
    }

    pub fn set_language(&self, language: Option<&str>) {
        self.state.lock().language = language.map(str::to_string);
    }

    /// Listener ids registered for `owner` and `event`
    pub fn listeners(&self, owner: ListenerOwner, event: EventType) -> Vec<ListenerId> {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(_, spec)| spec.owner == owner && spec.event == event)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn listener_count(&self, owner: ListenerOwner, event: EventType) -> usize {
        self.listeners(owner, event).len()
    }

    pub fn total_listeners(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn layers(&self, kind: OverlayKind) -> Vec<LayerId> {
        self.state
            .lock()
            .layers
            .iter()
            .filter(|(_, layer)| layer.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn layer_count(&self, kind: OverlayKind) -> usize {
        self.layers(kind).len()
    }

    pub fn total_layers(&self) -> usize {
        self.state.lock().layers.len()
    }

    /// Paint of the first layer of `kind`
    pub fn layer_paint(&self, kind: OverlayKind) -> Option<LayerPaint> {
        self.state
            .lock()
            .layers
            .values()
            .find(|layer| layer.kind == kind)
            .and_then(|layer| layer.paint.clone())
    }

    pub fn style_var(&self, name: &str) -> Option<String> {
        self.state.lock().vars.get(name).cloned()
    }

    pub fn has_stylesheet(&self, id: &str) -> bool {
        self.state.lock().stylesheets.contains_key(id)
    }

    pub fn pending_frames(&self) -> Vec<FrameId> {
        self.state.lock().frames.iter().copied().collect()
    }

    /// Drain pending frame requests, as a rendering tick would
    pub fn take_frames(&self) -> Vec<FrameId> {
        std::mem::take(&mut self.state.lock().frames)
            .into_iter()
            .collect()
    }

    /// Frame events for one rendering tick
    pub fn tick(&self) -> Vec<HostEvent> {
        self.take_frames().into_iter().map(HostEvent::Frame).collect()
    }

    fn pointer_events(&self, event: PointerEvent, types: &[EventType]) -> Vec<HostEvent> {
        self.state
            .lock()
            .listeners
            .iter()
            .filter(|(_, spec)| types.contains(&spec.event))
            .map(|(id, _)| HostEvent::Pointer {
                listener: *id,
                event,
            })
            .collect()
    }

    /// Events a mouse move to `position` delivers
    pub fn pointer_move(&self, position: Point) -> Vec<HostEvent> {
        self.pointer_events(
            PointerEvent::Move {
                position,
                over_layer: None,
            },
            &[EventType::PointerMove],
        )
    }

    /// Events a mouse move onto one of the widget's layers delivers
    pub fn pointer_move_over(&self, position: Point, layer: LayerId) -> Vec<HostEvent> {
        self.pointer_events(
            PointerEvent::Move {
                position,
                over_layer: Some(layer),
            },
            &[EventType::PointerMove],
        )
    }

    /// Events a touch drag to `position` delivers
    pub fn touch_move(&self, position: Point) -> Vec<HostEvent> {
        self.pointer_events(
            PointerEvent::Move {
                position,
                over_layer: None,
            },
            &[EventType::TouchMove],
        )
    }

    /// Events the pointer leaving the surface delivers
    pub fn pointer_leave(&self) -> Vec<HostEvent> {
        self.pointer_events(PointerEvent::Leave, &[EventType::PointerLeave])
    }

    /// Select `text` and return the resulting selection events
    pub fn select(&self, text: &str) -> Vec<HostEvent> {
        let mut state = self.state.lock();
        state.selection = Some(text.to_string());
        state
            .listeners
            .iter()
            .filter(|(_, spec)| spec.event == EventType::SelectionChange)
            .map(|(id, _)| HostEvent::Selection {
                listener: *id,
                text: text.to_string(),
            })
            .collect()
    }
}

impl Surface for HeadlessHost {
    fn add_listener(&self, spec: ListenerSpec) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.allocate());
        state.listeners.insert(id, spec);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state.lock().listeners.remove(&id);
    }

    fn mount_layer(&self, kind: OverlayKind) -> LayerId {
        let mut state = self.state.lock();
        let id = LayerId(state.allocate());
        state.layers.insert(id, HeadlessLayer { kind, paint: None });
        id
    }

    fn paint_layer(&self, id: LayerId, paint: &LayerPaint) {
        if let Some(layer) = self.state.lock().layers.get_mut(&id) {
            layer.paint = Some(paint.clone());
        }
    }

    fn remove_layer(&self, id: LayerId) {
        self.state.lock().layers.remove(&id);
    }

    fn hit_test(&self, point: Point) -> Option<ElementId> {
        self.state
            .lock()
            .elements
            .iter()
            .rev()
            .find(|element| element.bounds.contains(point))
            .map(|element| element.id)
    }

    fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        self.state
            .lock()
            .elements
            .iter()
            .find(|element| element.id == id)
            .map(|element| element.bounds)
    }

    fn clone_subtree(&self, id: ElementId) -> Option<ContentSnapshot> {
        self.state
            .lock()
            .elements
            .iter()
            .find(|element| element.id == id)
            .map(|element| ContentSnapshot {
                source: element.id,
                markup: element.markup.clone(),
            })
    }

    fn selected_text(&self) -> Option<String> {
        self.state.lock().selection.clone()
    }

    fn content_region_text(&self) -> Vec<String> {
        self.state.lock().regions.clone()
    }

    fn surface_text(&self) -> String {
        self.state.lock().body_text.clone()
    }

    fn language(&self) -> Option<String> {
        self.state.lock().language.clone()
    }
}

impl FrameClock for HeadlessHost {
    fn request_frame(&self) -> FrameId {
        let mut state = self.state.lock();
        let id = FrameId(state.allocate());
        state.frames.insert(id);
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.state.lock().frames.remove(&id);
    }
}

impl StyleSink for HeadlessHost {
    fn set_var(&self, name: &str, value: &str) {
        self.state
            .lock()
            .vars
            .insert(name.to_string(), value.to_string());
    }

    fn clear_var(&self, name: &str) {
        self.state.lock().vars.remove(name);
    }

    fn inject_stylesheet(&self, id: &str, css: &str) {
        self.state
            .lock()
            .stylesheets
            .insert(id.to_string(), css.to_string());
    }

    fn remove_stylesheet(&self, id: &str) {
        self.state.lock().stylesheets.remove(id);
    }
}

#[derive(Debug, Default)]
struct NarratorState {
    voices: Vec<Voice>,
    spoken: Vec<UtteranceRequest>,
    active: Option<UtteranceId>,
    cancels: usize,
    auto_complete: bool,
}

/// In-memory narration engine.
///
/// By default utterances stay active until the caller drives them with
/// [`start`](Self::start), [`finish`](Self::finish) or [`fail`](Self::fail).
/// With [`auto_complete`](Self::auto_complete) every utterance reports
/// start and end as soon as it is submitted.
pub struct HeadlessNarrator {
    events: NarrationSender,
    state: Mutex<NarratorState>,
}

impl HeadlessNarrator {
    pub fn new(events: NarrationSender) -> Self {
        Self {
            events,
            state: Mutex::new(NarratorState::default()),
        }
    }

    pub fn with_voices(self, voices: Vec<Voice>) -> Self {
        self.state.lock().voices = voices;
        self
    }

    pub fn auto_complete(self) -> Self {
        self.state.lock().auto_complete = true;
        self
    }

    /// Every request submitted so far, in order
    pub fn spoken(&self) -> Vec<UtteranceRequest> {
        self.state.lock().spoken.clone()
    }

    pub fn last_request(&self) -> Option<UtteranceRequest> {
        self.state.lock().spoken.last().cloned()
    }

    /// Utterance currently playing
    pub fn active(&self) -> Option<UtteranceId> {
        self.state.lock().active
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().cancels
    }

    fn emit(&self, utterance: UtteranceId, kind: NarrationEventKind) {
        // The widget may already be gone; a closed channel is not an error here
        let _ = self.events.send(NarrationEvent { utterance, kind });
    }

    /// Report that `id` started playing
    pub fn start(&self, id: UtteranceId) {
        self.emit(id, NarrationEventKind::Started);
    }

    /// Report that `id` finished
    pub fn finish(&self, id: UtteranceId) {
        {
            let mut state = self.state.lock();
            if state.active == Some(id) {
                state.active = None;
            }
        }
        self.emit(id, NarrationEventKind::Ended);
    }

    /// Report that `id` failed
    pub fn fail(&self, id: UtteranceId, message: &str) {
        {
            let mut state = self.state.lock();
            if state.active == Some(id) {
                state.active = None;
            }
        }
        self.emit(id, NarrationEventKind::Failed(message.to_string()));
    }
}

impl NarrationEngine for HeadlessNarrator {
    fn voices(&self) -> Vec<Voice> {
        self.state.lock().voices.clone()
    }

    fn speak(&self, request: UtteranceRequest) {
        let id = request.id;
        let auto_complete = {
            let mut state = self.state.lock();
            state.spoken.push(request);
            state.active = Some(id);
            state.auto_complete
        };
        if auto_complete {
            self.start(id);
            self.finish(id);
        }
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        state.active = None;
        state.cancels += 1;
    }
}
