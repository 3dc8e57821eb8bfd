//! Content magnifier
//!
//! A circular lens that follows the pointer and shows a scaled copy of the
//! element underneath it. The copy is translated so that the point under
//! the pointer sits exactly at the lens centre, whatever the element's size
//! or position:
//!
//! ```text
//! offset = -((pointer - element_origin) * scale) + lens_radius
//! ```
//!
//! The lens hides when the pointer leaves the surface, when an event
//! targets the lens itself, and when nothing is under the pointer.

use serde::Serialize;
use tracing::debug;

use crate::config::OverlaySettings;
use crate::host::{EventType, FrameId, LayerId, ListenerId, ListenerOwner, Point, PointerEvent};
use crate::overlay::scheduler::Coalescer;
use crate::overlay::{LayerPaint, LensPaint, OverlayContext, OverlayEffect, OverlayKind, Subscriptions};

/// Scale then translate, applied to element-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LensTransform {
    pub scale: f32,
    pub translate: Point,
}

impl LensTransform {
    /// Transform keeping `pointer` at the lens centre
    pub fn centered(pointer: Point, element_origin: Point, scale: f32, lens_radius: f32) -> Self {
        Self {
            scale,
            translate: Point::new(
                -((pointer.x - element_origin.x) * scale) + lens_radius,
                -((pointer.y - element_origin.y) * scale) + lens_radius,
            ),
        }
    }

    /// Map an element-local point into lens coordinates
    pub fn apply(&self, local: Point) -> Point {
        Point::new(
            local.x * self.scale + self.translate.x,
            local.y * self.scale + self.translate.y,
        )
    }
}

pub struct Magnifier {
    layer: LayerId,
    subscriptions: Subscriptions,
    diameter: f32,
    zoom: f32,
    threshold: f32,
    last: Option<Point>,
    pending: Coalescer<Point>,
    visible: bool,
    rendered_at: Option<Point>,
}

impl Magnifier {
    pub fn mount(settings: &OverlaySettings, ctx: OverlayContext<'_>) -> Self {
        let layer = ctx.surface.mount_layer(OverlayKind::Magnifier);
        let subscriptions = Subscriptions::subscribe(
            ctx.surface,
            ListenerOwner::Overlay(OverlayKind::Magnifier),
            &[EventType::PointerMove, EventType::TouchMove, EventType::PointerLeave],
        );
        ctx.surface
            .paint_layer(layer, &LayerPaint::Lens(LensPaint::hidden(settings.magnifier_diameter)));
        Self {
            layer,
            subscriptions,
            diameter: settings.magnifier_diameter,
            zoom: settings.magnifier_zoom,
            threshold: settings.magnifier_threshold,
            last: None,
            pending: Coalescer::new(),
            visible: false,
            rendered_at: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Pointer position of the last painted lens
    pub fn rendered_at(&self) -> Option<Point> {
        self.rendered_at
    }

    fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    fn accepts(&self, position: Point) -> bool {
        self.last.map_or(true, |last| {
            (position.x - last.x).abs() >= self.threshold
                || (position.y - last.y).abs() >= self.threshold
        })
    }

    /// Pointer left the surface or moved onto the lens
    fn hide(&mut self, ctx: OverlayContext<'_>) {
        self.pending.cancel(ctx.frames);
        // Re-entry should repaint immediately, not wait for the threshold
        self.last = None;
        self.conceal(ctx);
    }

    /// Stop drawing the lens. The threshold still applies from the last
    /// accepted position.
    fn conceal(&mut self, ctx: OverlayContext<'_>) {
        if self.visible {
            ctx.surface
                .paint_layer(self.layer, &LayerPaint::Lens(LensPaint::hidden(self.diameter)));
            self.visible = false;
            self.rendered_at = None;
        }
    }

    fn render(&mut self, pointer: Point, ctx: OverlayContext<'_>) {
        let target = ctx.surface.hit_test(pointer).and_then(|element| {
            let bounds = ctx.surface.element_bounds(element)?;
            let content = ctx.surface.clone_subtree(element)?;
            Some((bounds, content))
        });

        let Some((bounds, content)) = target else {
            debug!("Nothing under pointer at ({}, {}), hiding lens", pointer.x, pointer.y);
            self.conceal(ctx);
            return;
        };

        let transform = LensTransform::centered(pointer, bounds.origin(), self.zoom, self.radius());
        let paint = LensPaint {
            visible: true,
            center: pointer,
            diameter: self.diameter,
            content: Some(content),
            transform: Some(transform),
        };
        ctx.surface.paint_layer(self.layer, &LayerPaint::Lens(paint));
        self.visible = true;
        self.rendered_at = Some(pointer);
    }
}

impl OverlayEffect for Magnifier {
    fn kind(&self) -> OverlayKind {
        OverlayKind::Magnifier
    }

    fn owns_listener(&self, listener: ListenerId) -> bool {
        self.subscriptions.contains(listener)
    }

    fn on_pointer(&mut self, event: &PointerEvent, ctx: OverlayContext<'_>) {
        match *event {
            PointerEvent::Leave => self.hide(ctx),
            PointerEvent::Move { over_layer, .. } if over_layer == Some(self.layer) => {
                self.hide(ctx)
            }
            PointerEvent::Move { position, .. } => {
                if !self.accepts(position) {
                    return;
                }
                self.last = Some(position);
                self.pending.request(position, ctx.frames);
            }
        }
    }

    fn on_frame(&mut self, frame: FrameId, ctx: OverlayContext<'_>) -> bool {
        let Some(pointer) = self.pending.take(frame) else {
            return false;
        };
        self.render(pointer, ctx);
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
    use crate::host::Rect;

    fn ctx(host: &HeadlessHost) -> OverlayContext<'_> {
        OverlayContext {
            surface: host,
            frames: host,
            styles: host,
        }
    }

    fn move_to(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
            over_layer: None,
        }
    }

    fn flush(lens: &mut Magnifier, host: &HeadlessHost) {
        for frame in host.take_frames() {
            lens.on_frame(frame, ctx(host));
        }
    }

    fn lens_paint(host: &HeadlessHost) -> LensPaint {
        match host.layer_paint(OverlayKind::Magnifier) {
            Some(LayerPaint::Lens(paint)) => paint,
            other => panic!("Expected lens paint, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_keeps_pointer_centered() {
        let cases = [
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(120.0, 40.0), Point::new(100.0, 20.0)),
            (Point::new(731.5, 1204.25), Point::new(12.0, 980.0)),
            (Point::new(5.0, 5.0), Point::new(-300.0, -40.0)),
        ];
        for scale in [1.0, 1.5, 2.0, 3.25] {
            for (pointer, origin) in cases {
                let transform = LensTransform::centered(pointer, origin, scale, 100.0);
                let local = Point::new(pointer.x - origin.x, pointer.y - origin.y);
                let on_lens = transform.apply(local);
                assert!((on_lens.x - 100.0).abs() < 1e-3, "x drifted: {:?}", on_lens);
                assert!((on_lens.y - 100.0).abs() < 1e-3, "y drifted: {:?}", on_lens);
            }
        }
    }

    #[test]
    fn test_transform_formula() {
        let transform = LensTransform::centered(Point::new(150.0, 80.0), Point::new(100.0, 60.0), 1.5, 100.0);
        assert_eq!(transform.translate, Point::new(25.0, 70.0));
    }

    #[test]
    fn test_lens_shows_copy_of_element_under_pointer() {
        let host = HeadlessHost::new();
        host.add_element(Rect::new(0.0, 0.0, 800.0, 600.0), "<main>page</main>");
        let paragraph = host.add_element(Rect::new(100.0, 100.0, 300.0, 50.0), "<p>Hello</p>");
        let mut lens = Magnifier::mount(&OverlaySettings::default(), ctx(&host));

        lens.on_pointer(&move_to(150.0, 120.0), ctx(&host));
        flush(&mut lens, &host);

        let paint = lens_paint(&host);
        assert!(paint.visible);
        assert_eq!(paint.diameter, 200.0);
        assert_eq!(paint.center, Point::new(150.0, 120.0));
        let content = paint.content.unwrap();
        assert_eq!(content.source, paragraph);
        assert_eq!(content.markup, "<p>Hello</p>");
        let transform = paint.transform.unwrap();
        assert_eq!(transform.scale, 1.5);
        assert_eq!(transform.translate, Point::new(25.0, 70.0));
    }

    #[test]
    fn test_small_moves_leave_lens_in_place() {
        let host = HeadlessHost::new();
        host.add_element(Rect::new(0.0, 0.0, 800.0, 600.0), "<main/>");
        let mut lens = Magnifier::mount(&OverlaySettings::default(), ctx(&host));
        lens.on_pointer(&move_to(200.0, 200.0), ctx(&host));
        flush(&mut lens, &host);

        lens.on_pointer(&move_to(209.0, 191.0), ctx(&host));
        flush(&mut lens, &host);
        assert_eq!(lens.rendered_at(), Some(Point::new(200.0, 200.0)));

        lens.on_pointer(&move_to(210.0, 200.0), ctx(&host));
        flush(&mut lens, &host);
        assert_eq!(lens.rendered_at(), Some(Point::new(210.0, 200.0)));
    }

    #[test]
    fn test_empty_space_hides_lens() {
        let host = HeadlessHost::new();
        host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), "<div/>");
        let mut lens = Magnifier::mount(&OverlaySettings::default(), ctx(&host));
        lens.on_pointer(&move_to(50.0, 50.0), ctx(&host));
        flush(&mut lens, &host);
        assert!(lens.is_visible());

        lens.on_pointer(&move_to(500.0, 500.0), ctx(&host));
        flush(&mut lens, &host);

        assert!(!lens.is_visible());
        assert!(!lens_paint(&host).visible);
    }

    #[test]
    fn test_empty_space_keeps_threshold() {
        let host = HeadlessHost::new();
        host.add_element(Rect::new(0.0, 0.0, 100.0, 100.0), "<div/>");
        let mut lens = Magnifier::mount(&OverlaySettings::default(), ctx(&host));
        lens.on_pointer(&move_to(500.0, 500.0), ctx(&host));
        flush(&mut lens, &host);
        assert!(!lens.is_visible());

        // Sub-threshold wandering over empty space schedules no lookups
        for (x, y) in [(503.0, 501.0), (497.0, 506.0), (509.0, 491.0)] {
            lens.on_pointer(&move_to(x, y), ctx(&host));
            assert!(host.pending_frames().is_empty());
        }

        lens.on_pointer(&move_to(50.0, 50.0), ctx(&host));
        flush(&mut lens, &host);
        assert!(lens.is_visible());
    }

    #[test]
    fn test_leave_and_self_hover_hide_lens() {
        let host = HeadlessHost::new();
        host.add_element(Rect::new(0.0, 0.0, 800.0, 600.0), "<main/>");
        let mut lens = Magnifier::mount(&OverlaySettings::default(), ctx(&host));
        let layer = host.layers(OverlayKind::Magnifier)[0];

        lens.on_pointer(&move_to(100.0, 100.0), ctx(&host));
        flush(&mut lens, &host);
        assert!(lens.is_visible());

        lens.on_pointer(&PointerEvent::Leave, ctx(&host));
        assert!(!lens.is_visible());

        // Re-entry is accepted even within the threshold of the old position
        lens.on_pointer(&move_to(102.0, 101.0), ctx(&host));
        flush(&mut lens, &host);
        assert!(lens.is_visible());

        lens.on_pointer(
            &PointerEvent::Move {
                position: Point::new(300.0, 300.0),
                over_layer: Some(layer),
            },
            ctx(&host),
        );
        assert!(!lens.is_visible());
        assert!(host.pending_frames().is_empty());
    }
}
