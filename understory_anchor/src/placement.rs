// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement vocabulary: sides, alignments, and the twelve compass placements.

use core::fmt;
use core::str::FromStr;

/// Side of the reference element the floating element is placed against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Side {
    /// Above the reference.
    Top,
    /// Right of the reference.
    Right,
    /// Below the reference.
    Bottom,
    /// Left of the reference.
    Left,
}

impl Side {
    /// The opposite side.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the floating element is stacked vertically against the reference.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Alignment along the cross axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Alignment {
    /// Align the leading edges.
    Start,
    /// Center on the reference.
    #[default]
    Center,
    /// Align the trailing edges.
    End,
}

/// One of the twelve compass placements (`side` or `side-start` / `side-end`).
///
/// Parses from and displays as the kebab-case name:
///
/// ```
/// use understory_anchor::{Alignment, Placement, Side};
///
/// let p: Placement = "bottom-start".parse().unwrap();
/// assert_eq!(p, Placement::new(Side::Bottom, Alignment::Start));
/// assert_eq!(p.to_string(), "bottom-start");
/// assert_eq!(Placement::TOP.to_string(), "top");
/// assert!("middle".parse::<Placement>().is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Side of the reference.
    pub side: Side,
    /// Cross-axis alignment.
    pub alignment: Alignment,
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM
    }
}

impl Placement {
    /// Centered above.
    pub const TOP: Self = Self::new(Side::Top, Alignment::Center);
    /// Centered to the right.
    pub const RIGHT: Self = Self::new(Side::Right, Alignment::Center);
    /// Centered below.
    pub const BOTTOM: Self = Self::new(Side::Bottom, Alignment::Center);
    /// Centered to the left.
    pub const LEFT: Self = Self::new(Side::Left, Alignment::Center);

    /// All twelve placements.
    pub const ALL: [Self; 12] = {
        let sides = [Side::Top, Side::Right, Side::Bottom, Side::Left];
        let aligns = [Alignment::Center, Alignment::Start, Alignment::End];
        let mut out = [Self::TOP; 12];
        let mut i = 0;
        while i < 12 {
            out[i] = Self::new(sides[i / 3], aligns[i % 3]);
            i += 1;
        }
        out
    };

    /// A placement from its parts.
    pub const fn new(side: Side, alignment: Alignment) -> Self {
        Self { side, alignment }
    }

    /// The same alignment on the opposite side.
    pub const fn flipped(self) -> Self {
        Self::new(self.side.opposite(), self.alignment)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side.name())?;
        match self.alignment {
            Alignment::Center => Ok(()),
            Alignment::Start => f.write_str("-start"),
            Alignment::End => f.write_str("-end"),
        }
    }
}

/// Error returned when parsing an unknown placement name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement `{name}`")]
pub struct ParsePlacementError {
    name: alloc::string::String,
}

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, align) = match s.split_once('-') {
            Some((side, align)) => (side, Some(align)),
            None => (s, None),
        };
        let side = match side {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            _ => return Err(ParsePlacementError { name: s.into() }),
        };
        let alignment = match align {
            None => Alignment::Center,
            Some("start") => Alignment::Start,
            Some("end") => Alignment::End,
            Some(_) => return Err(ParsePlacementError { name: s.into() }),
        };
        Ok(Self::new(side, alignment))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Placement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Placement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <alloc::string::String as serde::Deserialize>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
