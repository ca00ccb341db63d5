// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position computation: the `ComputePosition` seam and the default offset → flip → shift pipeline.

use kurbo::{Point, Rect, Size};

use crate::placement::{Alignment, Placement, Side};

/// Coordinate space of a computed position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Strategy {
    /// Document coordinates.
    #[default]
    Absolute,
    /// Viewport coordinates.
    Fixed,
}

/// Positioning options.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PositionConfig {
    /// Preferred placement.
    pub placement: Placement,
    /// Gap between reference and floating element.
    pub offset_px: f64,
    /// Minimum distance kept from the viewport edges.
    pub collision_padding: f64,
    /// Coordinate space of the result.
    pub strategy: Strategy,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            offset_px: 8.0,
            collision_padding: 8.0,
            strategy: Strategy::Absolute,
        }
    }
}

impl PositionConfig {
    /// Default options with the given placement.
    pub fn with_placement(placement: Placement) -> Self {
        Self {
            placement,
            ..Self::default()
        }
    }
}

/// A computed floating position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    /// Left edge of the floating element.
    pub x: f64,
    /// Top edge of the floating element.
    pub y: f64,
    /// Coordinate space of `x` and `y`.
    pub strategy: Strategy,
    /// Placement after collision avoidance.
    pub placement: Placement,
}

impl Position {
    /// The position held while no reference element is available.
    pub fn origin(config: &PositionConfig) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            strategy: config.strategy,
            placement: config.placement,
        }
    }

    /// Top-left corner as a point.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Computes where a floating element goes relative to its reference.
///
/// All rectangles are in document coordinates. Implement this to replace the
/// default [`FloatingPositioner`]; plain functions and closures with the
/// matching signature implement it too.
pub trait ComputePosition {
    /// Compute the floating element's position.
    fn compute(
        &self,
        reference: Rect,
        floating: Size,
        viewport: Rect,
        config: &PositionConfig,
    ) -> Position;
}

impl<F> ComputePosition for F
where
    F: Fn(Rect, Size, Rect, &PositionConfig) -> Position,
{
    fn compute(
        &self,
        reference: Rect,
        floating: Size,
        viewport: Rect,
        config: &PositionConfig,
    ) -> Position {
        self(reference, floating, viewport, config)
    }
}

/// The default pipeline: offset, then flip, then shift.
///
/// - **offset** places the floating element `offset_px` away from the chosen side.
/// - **flip** moves to the opposite side when the preferred side overflows the
///   padded viewport and the opposite side overflows less.
/// - **shift** clamps the cross axis into the padded viewport.
///
/// ```
/// use kurbo::{Rect, Size};
/// use understory_anchor::{ComputePosition, FloatingPositioner, Placement, PositionConfig, Side};
///
/// let viewport = Rect::new(0.0, 0.0, 400.0, 300.0);
/// let config = PositionConfig::with_placement(Placement::TOP);
///
/// // No room above a trigger at the top edge: flips below.
/// let trigger = Rect::new(100.0, 10.0, 180.0, 30.0);
/// let pos = FloatingPositioner.compute(trigger, Size::new(80.0, 50.0), viewport, &config);
/// assert_eq!(pos.placement.side, Side::Bottom);
/// assert_eq!(pos.y, 38.0);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct FloatingPositioner;

impl ComputePosition for FloatingPositioner {
    fn compute(
        &self,
        reference: Rect,
        floating: Size,
        viewport: Rect,
        config: &PositionConfig,
    ) -> Position {
        let bounds = padded(viewport, config.collision_padding);

        let mut placement = config.placement;
        let mut origin = place(reference, floating, placement, config.offset_px);
        let overflow = main_overflow(origin, floating, placement.side, bounds);
        if overflow > 0.0 {
            let flipped = placement.flipped();
            let alt = place(reference, floating, flipped, config.offset_px);
            if main_overflow(alt, floating, flipped.side, bounds) < overflow {
                tracing::trace!(from = %placement, to = %flipped, "flipped");
                placement = flipped;
                origin = alt;
            }
        }

        let origin = shift(origin, floating, placement.side, bounds);
        let origin = match config.strategy {
            Strategy::Absolute => origin,
            Strategy::Fixed => Point::new(origin.x - viewport.x0, origin.y - viewport.y0),
        };
        Position {
            x: origin.x,
            y: origin.y,
            strategy: config.strategy,
            placement,
        }
    }
}

fn padded(viewport: Rect, padding: f64) -> Rect {
    let inner = Rect::new(
        viewport.x0 + padding,
        viewport.y0 + padding,
        viewport.x1 - padding,
        viewport.y1 - padding,
    );
    // A padding larger than the viewport collapses to its center line.
    if inner.x0 > inner.x1 || inner.y0 > inner.y1 {
        let c = viewport.center();
        Rect::new(c.x, c.y, c.x, c.y)
    } else {
        inner
    }
}

fn place(reference: Rect, floating: Size, placement: Placement, offset: f64) -> Point {
    let cross = |start: f64, end: f64, len: f64| match placement.alignment {
        Alignment::Start => start,
        Alignment::Center => (start + end) / 2.0 - len / 2.0,
        Alignment::End => end - len,
    };
    match placement.side {
        Side::Top => Point::new(
            cross(reference.x0, reference.x1, floating.width),
            reference.y0 - floating.height - offset,
        ),
        Side::Bottom => Point::new(
            cross(reference.x0, reference.x1, floating.width),
            reference.y1 + offset,
        ),
        Side::Left => Point::new(
            reference.x0 - floating.width - offset,
            cross(reference.y0, reference.y1, floating.height),
        ),
        Side::Right => Point::new(
            reference.x1 + offset,
            cross(reference.y0, reference.y1, floating.height),
        ),
    }
}

/// How far the floating element sticks out of `bounds` past the outer edge of `side`.
fn main_overflow(origin: Point, floating: Size, side: Side, bounds: Rect) -> f64 {
    match side {
        Side::Top => bounds.y0 - origin.y,
        Side::Bottom => origin.y + floating.height - bounds.y1,
        Side::Left => bounds.x0 - origin.x,
        Side::Right => origin.x + floating.width - bounds.x1,
    }
}

fn shift(origin: Point, floating: Size, side: Side, bounds: Rect) -> Point {
    // The leading edge wins when the element is larger than the bounds.
    let clamp = |v: f64, lo: f64, len: f64, hi: f64| v.min(hi - len).max(lo);
    if side.is_vertical() {
        Point::new(
            clamp(origin.x, bounds.x0, floating.width, bounds.x1),
            origin.y,
        )
    } else {
        Point::new(
            origin.x,
            clamp(origin.y, bounds.y0, floating.height, bounds.y1),
        )
    }
}
