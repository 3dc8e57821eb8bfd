//! Reading mask
//!
//! Shades the whole surface except a clear horizontal band that follows the
//! pointer vertically. Small movements are ignored and accepted ones are
//! painted on the next frame.

use tracing::debug;

use crate::config::OverlaySettings;
use crate::host::{EventType, FrameId, LayerId, ListenerId, ListenerOwner, PointerEvent};
use crate::overlay::scheduler::Coalescer;
use crate::overlay::{LayerPaint, MaskPaint, OverlayContext, OverlayEffect, OverlayKind, Rgba, Subscriptions};

pub struct ReadingMask {
    layer: LayerId,
    subscriptions: Subscriptions,
    band_height: f32,
    threshold: f32,
    shade: Rgba,
    /// Last vertical coordinate that passed the threshold
    last_y: Option<f32>,
    pending: Coalescer<f32>,
    rendered_y: Option<f32>,
}

impl ReadingMask {
    /// The layer starts unpainted; the band appears on the first accepted move.
    pub fn mount(settings: &OverlaySettings, ctx: OverlayContext<'_>) -> Self {
        let layer = ctx.surface.mount_layer(OverlayKind::ReadingMask);
        let subscriptions = Subscriptions::subscribe(
            ctx.surface,
            ListenerOwner::Overlay(OverlayKind::ReadingMask),
            &[EventType::PointerMove, EventType::TouchMove],
        );
        Self {
            layer,
            subscriptions,
            band_height: settings.mask_band_height,
            threshold: settings.mask_threshold,
            shade: Rgba::new(0, 0, 0, settings.mask_opacity),
            last_y: None,
            pending: Coalescer::new(),
            rendered_y: None,
        }
    }

    /// Band centre currently painted
    pub fn rendered_y(&self) -> Option<f32> {
        self.rendered_y
    }

    fn accepts(&self, y: f32) -> bool {
        self.last_y.map_or(true, |last| (y - last).abs() >= self.threshold)
    }
}

impl OverlayEffect for ReadingMask {
    fn kind(&self) -> OverlayKind {
        OverlayKind::ReadingMask
    }

    fn owns_listener(&self, listener: ListenerId) -> bool {
        self.subscriptions.contains(listener)
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: OverlayContext<'_>) {
        let PointerEvent::Move { position, .. } = *event else {
            return;
        };
        if !self.accepts(position.y) {
            return;
        }
        self.last_y = Some(position.y);
        self.pending.request(position.y, ctx.frames);
    }

    fn on_frame(&mut self, frame: FrameId, ctx: OverlayContext<'_>) -> bool {
        let Some(y) = self.pending.take(frame) else {
            return false;
        };
        let paint = MaskPaint::centered_on(y, self.band_height, self.shade);
        ctx.surface.paint_layer(self.layer, &LayerPaint::Mask(paint));
        self.rendered_y = Some(y);
        debug!("Reading mask band at y={}", y);
        true
    }

    fn teardown(mut self: Box<Self>, ctx: OverlayContext<'_>) {
        self.pending.cancel(ctx.frames);
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

    fn move_to(y: f32) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(50.0, y),
            over_layer: None,
        }
    }

    fn flush(mask: &mut ReadingMask, host: &HeadlessHost) {
        for frame in host.take_frames() {
            mask.on_frame(frame, ctx(host));
        }
    }

    #[test]
    fn test_first_move_paints_band() {
        let host = HeadlessHost::new();
        let mut mask = ReadingMask::mount(&OverlaySettings::default(), ctx(&host));

        mask.on_pointer(&move_to(300.0), ctx(&host));
        assert_eq!(mask.rendered_y(), None);
        flush(&mut mask, &host);

        assert_eq!(mask.rendered_y(), Some(300.0));
        match host.layer_paint(OverlayKind::ReadingMask) {
            Some(LayerPaint::Mask(paint)) => {
                assert_eq!(paint.band_top, 250.0);
                assert_eq!(paint.band_bottom, 350.0);
                assert!((paint.shade.a - 0.65).abs() < 0.001);
            }
            other => panic!("Expected mask paint, got {:?}", other),
        }
    }

    #[test]
    fn test_small_moves_are_ignored() {
        let host = HeadlessHost::new();
        let mut mask = ReadingMask::mount(&OverlaySettings::default(), ctx(&host));
        mask.on_pointer(&move_to(300.0), ctx(&host));
        flush(&mut mask, &host);

        mask.on_pointer(&move_to(304.0), ctx(&host));
        mask.on_pointer(&move_to(296.5), ctx(&host));
        assert!(host.pending_frames().is_empty());
        flush(&mut mask, &host);
        assert_eq!(mask.rendered_y(), Some(300.0));
    }

    #[test]
    fn test_moves_before_tick_keep_latest() {
        let host = HeadlessHost::new();
        let mut mask = ReadingMask::mount(&OverlaySettings::default(), ctx(&host));

        mask.on_pointer(&move_to(100.0), ctx(&host));
        mask.on_pointer(&move_to(120.0), ctx(&host));
        mask.on_pointer(&move_to(140.0), ctx(&host));
        assert_eq!(host.pending_frames().len(), 1);

        flush(&mut mask, &host);
        assert_eq!(mask.rendered_y(), Some(140.0));
    }

    #[test]
    fn test_threshold_measured_from_last_accepted() {
        let host = HeadlessHost::new();
        let mut mask = ReadingMask::mount(&OverlaySettings::default(), ctx(&host));
        mask.on_pointer(&move_to(100.0), ctx(&host));
        flush(&mut mask, &host);

        // Three 3px steps: the second crosses 5px from 100
        mask.on_pointer(&move_to(103.0), ctx(&host));
        mask.on_pointer(&move_to(106.0), ctx(&host));
        flush(&mut mask, &host);
        assert_eq!(mask.rendered_y(), Some(106.0));
    }

    #[test]
    fn test_teardown_removes_everything() {
        let host = HeadlessHost::new();
        let mut mask = ReadingMask::mount(&OverlaySettings::default(), ctx(&host));
        mask.on_pointer(&move_to(100.0), ctx(&host));

        Box::new(mask).teardown(ctx(&host));

        assert_eq!(host.total_listeners(), 0);
        assert_eq!(host.total_layers(), 0);
        assert!(host.pending_frames().is_empty());
    }
}
