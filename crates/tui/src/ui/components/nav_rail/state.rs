use std::rc::Rc;

use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tracing::debug;
use workbench_types::{LinkTarget, NavigationItem, default_navigation_items};

/// How a rail entry behaves for the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RailButtonKind {
    /// The active route; emphasized and inert.
    Selected,
    /// Any other route; activating it follows the link.
    Link(LinkTarget),
}

/// A rail entry resolved against a pathname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailButton {
    pub id: String,
    pub glyph: String,
    pub label: String,
    pub kind: RailButtonKind,
}

impl RailButton {
    pub fn is_selected(&self) -> bool {
        self.kind == RailButtonKind::Selected
    }

    pub fn link(&self) -> Option<&LinkTarget> {
        match &self.kind {
            RailButtonKind::Link(target) => Some(target),
            RailButtonKind::Selected => None,
        }
    }
}

#[derive(Debug)]
struct ButtonCache {
    revision: u64,
    pathname: String,
    buttons: Rc<[RailButton]>,
}

/// State for the navigation rail.
///
/// Owns the items, the rat-focus flags for the container and each item, the
/// hover index and the geometry recorded during the last render.
#[derive(Debug)]
pub struct NavigationRailState {
    items: Vec<NavigationItem>,
    /// Bumped whenever `items` is replaced; part of the memo key.
    revision: u64,
    cache: Option<ButtonCache>,
    /// Focus flag for the container in the global focus tree.
    pub container_focus: FocusFlag,
    /// Focus flags for each item; kept in sync with `items` length.
    pub item_focus_flags: Vec<FocusFlag>,
    /// Item under the mouse pointer, if any.
    pub hovered_index: Option<usize>,
    /// Last rendered area of the rail; used for hit testing.
    pub last_area: Rect,
    /// Last computed per-item areas for hit testing.
    pub per_item_areas: Vec<Rect>,
}

impl NavigationRailState {
    /// Creates the rail; `None` selects the built-in Pipelines / Pipeline runs items.
    pub fn new(items: Option<Vec<NavigationItem>>) -> Self {
        let mut state = Self {
            items: Vec::new(),
            revision: 0,
            cache: None,
            container_focus: FocusFlag::named("nav.rail"),
            item_focus_flags: Vec::new(),
            hovered_index: None,
            last_area: Rect::default(),
            per_item_areas: Vec::new(),
        };
        state.set_items(items.unwrap_or_else(default_navigation_items));
        state
    }

    pub fn items(&self) -> &[NavigationItem] {
        &self.items
    }

    /// Replace the items and invalidate the memoized buttons.
    pub fn set_items(&mut self, items: Vec<NavigationItem>) {
        self.items = items;
        self.revision = self.revision.wrapping_add(1);
        self.cache = None;
        self.hovered_index = None;
        self.item_focus_flags = (0..self.items.len())
            .map(|index| FocusFlag::named(&format!("nav.rail.item.{index}")))
            .collect();
    }

    /// Buttons for `pathname`, recomputed only when the items or the path change.
    pub fn buttons(&mut self, pathname: &str) -> Rc<[RailButton]> {
        if let Some(cache) = &self.cache
            && cache.revision == self.revision
            && cache.pathname == pathname
        {
            return Rc::clone(&cache.buttons);
        }

        debug!(pathname, revision = self.revision, "computing navigation rail buttons");
        let buttons: Rc<[RailButton]> = self.items.iter().map(|item| resolve_button(item, pathname)).collect();
        self.cache = Some(ButtonCache {
            revision: self.revision,
            pathname: pathname.to_string(),
            buttons: Rc::clone(&buttons),
        });
        buttons
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.item_focus_flags.iter().position(|flag| flag.get())
    }

    /// Index of the item whose tooltip should be visible.
    ///
    /// Keyboard focus wins over hover.
    pub fn tooltip_index(&self) -> Option<usize> {
        self.focused_index().or(self.hovered_index)
    }

    /// The flag of the next (or previous) item, wrapping at either end.
    pub fn cycle_focus(&self, forward: bool) -> Option<FocusFlag> {
        let len = self.item_focus_flags.len();
        if len == 0 {
            return None;
        }
        let next = match self.focused_index() {
            None => 0,
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
        };
        self.item_focus_flags.get(next).cloned()
    }

    /// Link to follow when item `index` is activated.
    ///
    /// `None` for the selected item or an out-of-range index.
    pub fn activate(&mut self, index: usize, pathname: &str) -> Option<LinkTarget> {
        let buttons = self.buttons(pathname);
        let target = buttons.get(index)?.link()?.clone();
        debug!(index, href = %target.href, "navigation rail link activated");
        Some(target)
    }
}

fn resolve_button(item: &NavigationItem, pathname: &str) -> RailButton {
    let selected = item.is_selected(pathname);
    RailButton {
        id: item.id.clone(),
        glyph: item.icon.glyph(selected).to_string(),
        label: item.label(),
        kind: if selected {
            RailButtonKind::Selected
        } else {
            RailButtonKind::Link(item.link.clone())
        },
    }
}

impl HasFocus for NavigationRailState {
    fn build(&self, builder: &mut FocusBuilder) {
        let tag = builder.start(self);
        for flag in &self.item_focus_flags {
            builder.leaf_widget(flag);
        }
        builder.end(tag);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}
