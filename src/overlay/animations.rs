//! Stop-animations style injection

use crate::host::{FrameId, ListenerId, PointerEvent};
use crate::overlay::{OverlayContext, OverlayEffect, OverlayKind};

pub const STOP_ANIMATIONS_SHEET: &str = "a11y-stop-animations";

const STOP_ANIMATIONS_CSS: &str = "*, *::before, *::after {\
 animation: none !important;\
 transition: none !important;\
 scroll-behavior: auto !important;\
}";

/// Injected stylesheet suppressing transitions and animations
pub struct AnimationSuppression;

impl AnimationSuppression {
    pub fn mount(ctx: OverlayContext<'_>) -> Self {
        ctx.styles.inject_stylesheet(STOP_ANIMATIONS_SHEET, STOP_ANIMATIONS_CSS);
        Self
    }
}

impl OverlayEffect for AnimationSuppression {
    fn kind(&self) -> OverlayKind {
        OverlayKind::StopAnimations
    }

    fn owns_listener(&self, _listener: ListenerId) -> bool {
        false
    }

    fn on_pointer(&mut self, _event: &PointerEvent, _ctx: OverlayContext<'_>) {}

    fn on_frame(&mut self, _frame: FrameId, _ctx: OverlayContext<'_>) -> bool {
        false
    }

    fn teardown(self: Box<Self>, ctx: OverlayContext<'_>) {
        ctx.styles.remove_stylesheet(STOP_ANIMATIONS_SHEET);
    }
}
