//! View state for the three prediction panels.
//!
//! The active tab is plain data owned by [`ViewController`]; everything the
//! UI shows is derived from it by [`ViewController::render`].

pub mod report;
pub mod route_form;

use std::fmt;

pub use report::{Bar, CompareSummary, RouteBreakdown};
pub use route_form::RouteForm;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// One of the three prediction panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Single-segment prediction.
    #[default]
    Segment,
    /// Multi-segment route prediction.
    Route,
    /// Two-route comparison.
    Compare,
}

impl Tab {
    /// Display order.
    pub const ALL: [Tab; 3] = [Self::Segment, Self::Route, Self::Compare];

    pub fn title(self) -> &'static str {
        match self {
            Self::Segment => "Segment",
            Self::Route => "Route",
            Self::Compare => "Compare",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "segment" => Some(Self::Segment),
            "route" => Some(Self::Route),
            "compare" => Some(Self::Compare),
            _ => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the active tab.
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    active: Tab,
}

/// A tab as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabView {
    pub tab: Tab,
    /// Highlighted button and visible panel.
    pub active: bool,
}

/// Everything needed to draw the tab strip and pick the visible panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub tabs: Vec<TabView>,
}

impl ViewModel {
    pub fn visible(&self) -> Option<Tab> {
        self.tabs.iter().find(|view| view.active).map(|view| view.tab)
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Make `tab` active. Returns `false` if it already was.
    pub fn switch_tab(&mut self, tab: Tab) -> bool {
        if self.active == tab {
            return false;
        }
        self.active = tab;
        true
    }

    pub fn render(&self) -> ViewModel {
        ViewModel {
            tabs: Tab::ALL
                .iter()
                .map(|&tab| TabView {
                    tab,
                    active: tab == self.active,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_segment_tab() {
        let view = ViewController::new();
        assert_eq!(view.active(), Tab::Segment);
        assert_eq!(view.render().visible(), Some(Tab::Segment));
    }

    #[test]
    fn switching_to_active_tab_is_a_no_op() {
        let mut view = ViewController::new();
        assert!(!view.switch_tab(Tab::Segment));
        assert!(view.switch_tab(Tab::Compare));
        assert!(!view.switch_tab(Tab::Compare));
        assert_eq!(view.active(), Tab::Compare);
    }

    #[test]
    fn render_marks_exactly_one_tab() {
        let mut view = ViewController::new();
        view.switch_tab(Tab::Route);
        let model = view.render();
        assert_eq!(model.tabs.len(), 3);
        assert_eq!(model.tabs.iter().filter(|t| t.active).count(), 1);
        assert_eq!(model.visible(), Some(Tab::Route));
        assert_eq!(model.tabs[0].tab, Tab::Segment);
    }

    #[test]
    fn tab_names() {
        assert_eq!(Tab::from_name("COMPARE"), Some(Tab::Compare));
        assert_eq!(Tab::from_name("map"), None);
        assert_eq!(Tab::Route.to_string(), "Route");
    }
}
