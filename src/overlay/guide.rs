//! Reading guide
//!
//! A thin line pinned to the pointer's vertical coordinate. Repainted on
//! every move with no threshold and no frame delay.

use crate::config::OverlaySettings;
use crate::host::{EventType, FrameId, LayerId, ListenerId, ListenerOwner, PointerEvent};
use crate::overlay::{GuidePaint, LayerPaint, OverlayContext, OverlayEffect, OverlayKind, Rgba, Subscriptions};

pub struct ReadingGuide {
    layer: LayerId,
    subscriptions: Subscriptions,
    thickness: f32,
    color: Rgba,
    rendered_y: Option<f32>,
}

impl ReadingGuide {
    pub fn mount(settings: &OverlaySettings, ctx: OverlayContext<'_>) -> Self {
        let layer = ctx.surface.mount_layer(OverlayKind::ReadingGuide);
        let subscriptions = Subscriptions::subscribe(
            ctx.surface,
            ListenerOwner::Overlay(OverlayKind::ReadingGuide),
            &[EventType::PointerMove, EventType::TouchMove],
        );
        Self {
            layer,
            subscriptions,
            thickness: settings.guide_thickness,
            color: settings.guide_color,
            rendered_y: None,
        }
    }

    pub fn rendered_y(&self) -> Option<f32> {
        self.rendered_y
    }
}

impl OverlayEffect for ReadingGuide {
    fn kind(&self) -> OverlayKind {
        OverlayKind::ReadingGuide
    }

    fn owns_listener(&self, listener: ListenerId) -> bool {
        self.subscriptions.contains(listener)
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: OverlayContext<'_>) {
        let PointerEvent::Move { position, .. } = *event else {
            return;
        };
        let paint = GuidePaint {
            y: position.y,
            thickness: self.thickness,
            color: self.color,
        };
        ctx.surface.paint_layer(self.layer, &LayerPaint::Guide(paint));
        self.rendered_y = Some(position.y);
    }

    // Never requests frames
    fn on_frame(&mut self, _frame: FrameId, _ctx: OverlayContext<'_>) -> bool {
        false
    }

    fn teardown(mut self: Box<Self>, ctx: OverlayContext<'_>) {
        self.subscriptions.release(ctx.surface);
        ctx.surface.remove_layer(self.layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;
    use crate::host::Point;

    fn ctx(host: &HeadlessHost) -> OverlayContext<'_> {
        OverlayContext {
            surface: host,
            frames: host,
            styles: host,
        }
    }

    #[test]
    fn test_guide_tracks_every_move_exactly() {
        let host = HeadlessHost::new();
        let mut guide = ReadingGuide::mount(&OverlaySettings::default(), ctx(&host));

        for y in [10.0, 10.5, 11.0, 300.25, 299.0] {
            guide.on_pointer(
                &PointerEvent::Move {
                    position: Point::new(0.0, y),
                    over_layer: None,
                },
                ctx(&host),
            );
            assert_eq!(guide.rendered_y(), Some(y));
            match host.layer_paint(OverlayKind::ReadingGuide) {
                Some(LayerPaint::Guide(paint)) => {
                    assert_eq!(paint.y, y);
                    assert_eq!(paint.thickness, 2.0);
                }
                other => panic!("Expected guide paint, got {:?}", other),
            }
        }
        assert!(host.pending_frames().is_empty());
    }
}
