// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document: node identifiers, element data, and accessibility attributes.

use alloc::string::String;
use kurbo::Rect;

/// Identifier for an element in the [`Document`](crate::Document) (generational).
///
/// Identifiers of removed elements become stale: they never alias an element
/// inserted later into the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Element state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is rendered (participates in hit testing and focus).
        const VISIBLE     = 0b0000_0001;
        /// Element is disabled: never focusable, never a dismissal target.
        const DISABLED    = 0b0000_0010;
        /// Element and its subtree are hidden from assistive technology.
        const ARIA_HIDDEN = 0b0000_0100;
        /// Element requests initial focus when its containing overlay opens.
        const AUTOFOCUS   = 0b0000_1000;
        /// Element and its subtree are hidden (for example a collapsed panel).
        const HIDDEN      = 0b0001_0000;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Kind of element, used to decide whether an element is natively interactive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A generic container; interactive only with a non-negative tab index.
    #[default]
    Generic,
    /// A button.
    Button,
    /// A hyperlink.
    Link,
    /// A text input.
    Input,
    /// A native select.
    Select,
    /// A multi-line text area.
    TextArea,
}

impl ElementKind {
    /// Whether this kind receives keyboard focus without an explicit tab index.
    pub const fn is_natively_focusable(self) -> bool {
        !matches!(self, Self::Generic)
    }
}

/// Layout axis of a composite widget (tab list, menu, accordion).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Orientation {
    /// Items laid out left to right.
    #[default]
    Horizontal,
    /// Items laid out top to bottom.
    Vertical,
}

/// Accessibility role of an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// A button.
    Button,
    /// A dialog or non-modal popover surface.
    Dialog,
    /// A menu surface.
    Menu,
    /// An item of a menu.
    MenuItem,
    /// A listbox surface.
    Listbox,
    /// An option of a listbox.
    Option,
    /// A combobox input.
    Combobox,
    /// A tab list.
    TabList,
    /// A tab.
    Tab,
    /// A tab panel.
    TabPanel,
    /// A tooltip surface.
    Tooltip,
    /// A landmark region (accordion panel).
    Region,
    /// A status message.
    Status,
    /// Presentational wrapper with no semantics.
    Presentation,
}

/// Accessibility attributes of an element.
///
/// These mirror the semantics of the ARIA attributes of the same names; the
/// host is responsible for exposing them to its accessibility tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aria {
    /// Role of the element.
    pub role: Option<Role>,
    /// Expanded/collapsed state of a disclosure trigger.
    pub expanded: Option<bool>,
    /// Kind of popup a trigger opens.
    pub has_popup: Option<Role>,
    /// The element whose visibility this element controls.
    pub controls: Option<NodeId>,
    /// The currently highlighted item of a composite widget.
    pub active_descendant: Option<NodeId>,
    /// Selection state of a tab or option.
    pub selected: Option<bool>,
    /// Element that describes this element (tooltip).
    pub described_by: Option<NodeId>,
    /// Element that labels this element.
    pub labelled_by: Option<NodeId>,
    /// Whether a dialog is modal.
    pub modal: bool,
    /// Layout axis of a composite widget.
    pub orientation: Option<Orientation>,
}

/// Element data supplied by the host when inserting a node.
#[derive(Clone, Debug)]
pub struct Element {
    /// Element kind.
    pub kind: ElementKind,
    /// World-space bounds, as produced by the host's layout.
    pub bounds: Rect,
    /// State flags.
    pub flags: ElementFlags,
    /// Explicit tab index. `Some(-1)` removes a natively focusable element from
    /// sequential navigation; a non-negative value makes any element focusable.
    pub tab_index: Option<i32>,
    /// Stacking order among overlapping elements. Higher is on top.
    pub z_index: i32,
    /// Visible text of the element (used by typeahead and filtering).
    pub label: String,
    /// Accessibility attributes.
    pub aria: Aria,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            kind: ElementKind::Generic,
            bounds: Rect::ZERO,
            flags: ElementFlags::default(),
            tab_index: None,
            z_index: 0,
            label: String::new(),
            aria: Aria::default(),
        }
    }
}

impl Element {
    /// A generic container element.
    pub fn generic() -> Self {
        Self::default()
    }

    /// A button with the given label.
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Button,
            label: label.into(),
            ..Self::default()
        }
    }

    /// A text input.
    pub fn input() -> Self {
        Self {
            kind: ElementKind::Input,
            ..Self::default()
        }
    }

    /// Set the bounds.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Add flags.
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.aria.role = Some(role);
        self
    }

    /// Set the explicit tab index.
    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Whether the element is disabled.
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(ElementFlags::DISABLED)
    }
}
