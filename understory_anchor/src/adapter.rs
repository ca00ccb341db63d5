// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeps one floating element anchored to its reference while open.

use alloc::boxed::Box;
use core::fmt;

use kurbo::{Rect, Size};
use smallvec::SmallVec;
use understory_document::{Damage, Document, NodeId, NodeRef, ObserverId};

use crate::compute::{ComputePosition, FloatingPositioner, Position, PositionConfig};

/// The reference and floating elements of one primitive.
///
/// Either side may be empty at any time; floating content only exists while open.
#[derive(Clone, Debug, Default)]
pub struct AnchorPair {
    /// Element the floating content is positioned against.
    pub reference: NodeRef,
    /// The floating content.
    pub floating: NodeRef,
}

impl AnchorPair {
    /// Both elements, if both are set and alive.
    pub fn resolve(&self, doc: &Document) -> Option<(NodeId, NodeId)> {
        let reference = self.reference.get().filter(|&n| doc.is_alive(n))?;
        let floating = self.floating.get().filter(|&n| doc.is_alive(n))?;
        Some((reference, floating))
    }
}

/// Position engine adapter for one primitive.
///
/// While open and both elements are mounted, the adapter observes both of
/// them (and, through the document, the viewport) and recomputes on every
/// commit that reports one of its observers. The adapter owns the origin of
/// the floating element's bounds; the host owns its size.
pub struct PositionAdapter {
    pair: AnchorPair,
    config: PositionConfig,
    engine: Box<dyn ComputePosition>,
    position: Position,
    tracking: Option<(NodeId, NodeId)>,
    observers: SmallVec<[ObserverId; 2]>,
}

impl fmt::Debug for PositionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionAdapter")
            .field("pair", &self.pair)
            .field("config", &self.config)
            .field("position", &self.position)
            .field("tracking", &self.tracking)
            .finish_non_exhaustive()
    }
}

impl PositionAdapter {
    /// An adapter using [`FloatingPositioner`].
    pub fn new(pair: AnchorPair, config: PositionConfig) -> Self {
        Self::with_engine(pair, config, Box::new(FloatingPositioner))
    }

    /// An adapter using a custom engine.
    pub fn with_engine(
        pair: AnchorPair,
        config: PositionConfig,
        engine: Box<dyn ComputePosition>,
    ) -> Self {
        Self {
            position: Position::origin(&config),
            pair,
            config,
            engine,
            tracking: None,
            observers: SmallVec::new(),
        }
    }

    /// The anchored pair.
    pub fn pair(&self) -> &AnchorPair {
        &self.pair
    }

    /// Positioning options.
    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    /// Replace positioning options; takes effect on the next computation.
    pub fn set_config(&mut self, config: PositionConfig) {
        self.config = config;
    }

    /// Last computed position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the adapter currently observes its elements.
    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// Compute the position once from committed layout.
    ///
    /// Holds `{0, 0}` while no reference element is available.
    pub fn anchor(&mut self, doc: &Document) -> Position {
        let Some(reference) = self
            .pair
            .reference
            .get()
            .and_then(|r| doc.bounds(r))
        else {
            self.position = Position::origin(&self.config);
            return self.position;
        };
        let floating = self
            .pair
            .floating
            .get()
            .and_then(|f| doc.bounds(f))
            .map_or(Size::ZERO, |b| b.size());
        self.position = self
            .engine
            .compute(reference, floating, doc.viewport(), &self.config);
        self.position
    }

    /// Start or stop continuous tracking to match the primitive's state.
    ///
    /// Tracking runs while `open` is true and both elements are mounted. Any
    /// other state releases every observer.
    pub fn sync(&mut self, doc: &mut Document, open: bool) {
        let target = if open { self.pair.resolve(doc) } else { None };
        if target == self.tracking {
            return;
        }
        self.stop(doc);
        if let Some((reference, floating)) = target {
            self.observers.push(doc.observe(reference));
            self.observers.push(doc.observe(floating));
            self.tracking = Some((reference, floating));
            tracing::debug!(?reference, ?floating, "position tracking started");
            self.recompute(doc);
        }
    }

    /// React to a layout commit. Returns whether the position changed.
    pub fn on_layout(&mut self, doc: &mut Document, damage: &Damage) -> bool {
        let Some((reference, floating)) = self.tracking else {
            return false;
        };
        if !doc.is_alive(reference) || !doc.is_alive(floating) {
            self.stop(doc);
            return false;
        }
        if !self.observers.iter().any(|&o| damage.notifies(o)) {
            return false;
        }
        let before = self.position;
        self.recompute(doc);
        before != self.position
    }

    /// Release every observer.
    pub fn stop(&mut self, doc: &mut Document) {
        for o in self.observers.drain(..) {
            doc.unobserve(o);
        }
        if self.tracking.take().is_some() {
            tracing::debug!("position tracking stopped");
        }
    }

    fn recompute(&mut self, doc: &mut Document) {
        let position = self.anchor(doc);
        let Some((_, floating)) = self.tracking else {
            return;
        };
        let Some(bounds) = doc.bounds(floating) else {
            return;
        };
        let placed = Rect::from_origin_size(position.point(), bounds.size());
        if placed != bounds {
            doc.set_bounds(floating, placed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_document::Element;

    fn setup() -> (Document, AnchorPair, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.insert(
            Some(body),
            Element::button("t").with_bounds(Rect::new(100.0, 100.0, 200.0, 120.0)),
        );
        let panel = doc.mount_in_layer(Element::generic().with_bounds(Rect::new(0.0, 0.0, 60.0, 40.0)));
        let pair = AnchorPair::default();
        pair.reference.set(Some(trigger));
        pair.floating.set(Some(panel));
        (doc, pair, trigger, panel)
    }

    #[test]
    fn holds_origin_without_reference() {
        let doc = Document::new();
        let mut adapter = PositionAdapter::new(AnchorPair::default(), PositionConfig::default());
        let pos = adapter.anchor(&doc);
        assert_eq!((pos.x, pos.y), (0.0, 0.0));
    }

    #[test]
    fn tracks_while_open_and_releases_on_close() {
        let (mut doc, pair, trigger, panel) = setup();
        let mut adapter = PositionAdapter::new(pair, PositionConfig::default());

        adapter.sync(&mut doc, true);
        assert!(adapter.is_tracking());
        assert_eq!(doc.observer_count(), 2);
        doc.commit();
        assert_eq!(doc.bounds(panel), Some(Rect::new(120.0, 128.0, 180.0, 168.0)));

        // Moving the trigger moves the panel on the next commits.
        doc.set_bounds(trigger, Rect::new(100.0, 150.0, 200.0, 170.0));
        let damage = doc.commit();
        assert!(adapter.on_layout(&mut doc, &damage));
        doc.commit();
        assert_eq!(doc.bounds(panel).map(|b| b.y0), Some(178.0));

        adapter.sync(&mut doc, false);
        assert!(!adapter.is_tracking());
        assert_eq!(doc.observer_count(), 0);
    }

    #[test]
    fn resize_and_scroll_trigger_recompute() {
        let (mut doc, pair, _trigger, _panel) = setup();
        let mut adapter = PositionAdapter::new(pair, PositionConfig::default());
        adapter.sync(&mut doc, true);
        doc.commit();
        assert_eq!(adapter.position().placement.side, crate::Side::Bottom);

        // A short viewport leaves no room below the trigger: flip above.
        doc.set_viewport_size(Size::new(1024.0, 150.0));
        let damage = doc.commit();
        assert!(adapter.on_layout(&mut doc, &damage));
        assert_eq!(adapter.position().placement.side, crate::Side::Top);
        assert_eq!(adapter.position().y, 52.0);

        // Scrolling down makes room below again.
        doc.scroll_to(kurbo::Point::new(0.0, 60.0));
        let damage = doc.commit();
        assert!(adapter.on_layout(&mut doc, &damage));
        assert_eq!(adapter.position().placement.side, crate::Side::Bottom);
    }

    #[test]
    fn unmounting_either_element_stops_tracking() {
        let (mut doc, pair, trigger, _panel) = setup();
        let mut adapter = PositionAdapter::new(pair, PositionConfig::default());
        adapter.sync(&mut doc, true);
        doc.remove(trigger);
        let damage = doc.commit();
        assert!(!adapter.on_layout(&mut doc, &damage));
        assert_eq!(doc.observer_count(), 0);
    }
}
