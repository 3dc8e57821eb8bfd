//! Overlay Presentation Layer
//!
//! Pointer-synced reading aids drawn above host content: the reading mask,
//! the reading guide and the magnifier lens, plus the stop-animations style
//! injection. Every mounted overlay lives in a per-kind slot and owns the
//! listeners, layers and frame requests it created, so teardown removes
//! exactly what mount added.

pub mod animations;
pub mod guide;
pub mod magnifier;
pub mod mask;
pub mod paint;
pub mod scheduler;

pub use paint::{GuidePaint, LayerPaint, LensPaint, MaskPaint, Rgba};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::OverlaySettings;
use crate::host::{
    EventType, FrameClock, FrameId, ListenerId, ListenerOwner, ListenerSpec, PointerEvent,
    StyleSink, Surface,
};

use animations::AnimationSuppression;
use guide::ReadingGuide;
use magnifier::Magnifier;
use mask::ReadingMask;

/// Kinds of overlay effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayKind {
    ReadingMask,
    ReadingGuide,
    Magnifier,
    StopAnimations,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 4] = [
        OverlayKind::ReadingMask,
        OverlayKind::ReadingGuide,
        OverlayKind::Magnifier,
        OverlayKind::StopAnimations,
    ];

    fn slot(self) -> usize {
        match self {
            OverlayKind::ReadingMask => 0,
            OverlayKind::ReadingGuide => 1,
            OverlayKind::Magnifier => 2,
            OverlayKind::StopAnimations => 3,
        }
    }
}

/// Host capabilities an overlay may touch
#[derive(Clone, Copy)]
pub struct OverlayContext<'a> {
    pub surface: &'a dyn Surface,
    pub frames: &'a dyn FrameClock,
    pub styles: &'a dyn StyleSink,
}

/// Listener ids registered by one overlay
#[derive(Debug, Default)]
pub struct Subscriptions {
    ids: Vec<ListenerId>,
}

impl Subscriptions {
    /// Register one listener per event type for `owner`
    pub fn subscribe(surface: &dyn Surface, owner: ListenerOwner, events: &[EventType]) -> Self {
        let ids = events
            .iter()
            .map(|&event| surface.add_listener(ListenerSpec { owner, event }))
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.ids.contains(&id)
    }

    /// Detach every listener
    pub fn release(&mut self, surface: &dyn Surface) {
        for id in self.ids.drain(..) {
            surface.remove_listener(id);
        }
    }
}

/// A mounted overlay. Created by mount, consumed by teardown.
pub trait OverlayEffect: Send {
    fn kind(&self) -> OverlayKind;

    /// Whether `listener` was registered by this overlay
    fn owns_listener(&self, listener: ListenerId) -> bool;

    /// Handle input from one of this overlay's listeners
    fn on_pointer(&mut self, event: &PointerEvent, ctx: OverlayContext<'_>);

    /// Handle a frame tick. Returns true if the frame was ours.
    fn on_frame(&mut self, frame: FrameId, ctx: OverlayContext<'_>) -> bool;

    /// Cancel pending frames and remove everything mount added
    fn teardown(self: Box<Self>, ctx: OverlayContext<'_>);
}

fn mount_effect(kind: OverlayKind, settings: &OverlaySettings, ctx: OverlayContext<'_>) -> Box<dyn OverlayEffect> {
    match kind {
        OverlayKind::ReadingMask => Box::new(ReadingMask::mount(settings, ctx)),
        OverlayKind::ReadingGuide => Box::new(ReadingGuide::mount(settings, ctx)),
        OverlayKind::Magnifier => Box::new(Magnifier::mount(settings, ctx)),
        OverlayKind::StopAnimations => Box::new(AnimationSuppression::mount(ctx)),
    }
}

/// Overlay manager: one slot per overlay kind
pub struct OverlayManager {
    surface: Arc<dyn Surface>,
    frames: Arc<dyn FrameClock>,
    styles: Arc<dyn StyleSink>,
    settings: OverlaySettings,
    slots: [Option<Box<dyn OverlayEffect>>; 4],
}

impl OverlayManager {
    pub fn new(
        surface: Arc<dyn Surface>,
        frames: Arc<dyn FrameClock>,
        styles: Arc<dyn StyleSink>,
        settings: OverlaySettings,
    ) -> Self {
        Self {
            surface,
            frames,
            styles,
            settings,
            slots: [None, None, None, None],
        }
    }

    fn context(&self) -> OverlayContext<'_> {
        OverlayContext {
            surface: self.surface.as_ref(),
            frames: self.frames.as_ref(),
            styles: self.styles.as_ref(),
        }
    }

    /// Mount an overlay. An existing overlay of the same kind is torn down first.
    pub fn mount(&mut self, kind: OverlayKind) {
        self.unmount(kind);
        let effect = mount_effect(kind, &self.settings, self.context());
        self.slots[kind.slot()] = Some(effect);
        info!("Mounted {:?} overlay", kind);
    }

    /// Tear down an overlay. Returns false if it was not mounted.
    pub fn unmount(&mut self, kind: OverlayKind) -> bool {
        let Some(effect) = self.slots[kind.slot()].take() else {
            return false;
        };
        effect.teardown(self.context());
        info!("Unmounted {:?} overlay", kind);
        true
    }

    /// Tear down every mounted overlay
    pub fn unmount_all(&mut self) {
        for kind in OverlayKind::ALL {
            self.unmount(kind);
        }
    }

    pub fn is_mounted(&self, kind: OverlayKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    /// Kinds currently mounted
    pub fn mounted(&self) -> Vec<OverlayKind> {
        OverlayKind::ALL
            .into_iter()
            .filter(|k| self.is_mounted(*k))
            .collect()
    }

    /// Route pointer input to the overlay owning `listener`.
    /// Returns false for listeners no live overlay owns.
    pub fn dispatch_pointer(&mut self, listener: ListenerId, event: &PointerEvent) -> bool {
        let ctx = OverlayContext {
            surface: self.surface.as_ref(),
            frames: self.frames.as_ref(),
            styles: self.styles.as_ref(),
        };
        match self
            .slots
            .iter_mut()
            .flatten()
            .find(|effect| effect.owns_listener(listener))
        {
            Some(effect) => {
                effect.on_pointer(event, ctx);
                true
            }
            None => {
                debug!("Ignoring pointer event for stale listener {:?}", listener);
                false
            }
        }
    }

    /// Deliver a frame tick. Returns true if an overlay consumed it.
    pub fn dispatch_frame(&mut self, frame: FrameId) -> bool {
        let ctx = OverlayContext {
            surface: self.surface.as_ref(),
            frames: self.frames.as_ref(),
            styles: self.styles.as_ref(),
        };
        self.slots
            .iter_mut()
            .flatten()
            .any(|effect| effect.on_frame(frame, ctx))
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.unmount_all();
    }
}
