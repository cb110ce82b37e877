use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// One named full-page state the router can display. Making this a closed
/// enum keeps unknown views unrepresentable once parsing has happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Sell,
    Rent,
    HowItWorks,
    About,
    Login,
    Signup,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Sell,
        View::Rent,
        View::HowItWorks,
        View::About,
        View::Login,
        View::Signup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Sell => "sell",
            View::Rent => "rent",
            View::HowItWorks => "howitworks",
            View::About => "about",
            View::Login => "login",
            View::Signup => "signup",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown view name: {0}")]
pub struct UnknownView(pub String);

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(View::Home),
            "sell" => Ok(View::Sell),
            "rent" => Ok(View::Rent),
            "howitworks" => Ok(View::HowItWorks),
            "about" => Ok(View::About),
            "login" => Ok(View::Login),
            "signup" => Ok(View::Signup),
            other => Err(UnknownView(other.to_string())),
        }
    }
}

/// Inner state of the sell page: browsing the marketplace or filling in the
/// listing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SellView {
    #[default]
    List,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved(View),
    Ignored,
}

/// Single-selector view state machine: exactly one current view, any-to-any
/// transitions, initial state `Home`, no terminal state.
#[derive(Debug)]
pub struct ViewRouter {
    current: View,
    sell_view: SellView,
    scroll_generation: u64,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            current: View::Home,
            sell_view: SellView::List,
            scroll_generation: 0,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn sell_view(&self) -> SellView {
        self.sell_view
    }

    /// Bumped on every successful navigation; the shell watches it to reset
    /// scroll position to the top.
    pub fn scroll_generation(&self) -> u64 {
        self.scroll_generation
    }

    pub fn navigate(&mut self, view: View) -> View {
        if view != View::Sell {
            self.sell_view = SellView::List;
        }
        self.current = view;
        self.scroll_generation += 1;
        view
    }

    /// String-keyed navigation for callers holding page names. Unknown names
    /// leave the current view unchanged.
    pub fn navigate_named(&mut self, name: &str) -> NavigationOutcome {
        match name.parse::<View>() {
            Ok(view) => NavigationOutcome::Moved(self.navigate(view)),
            Err(err) => {
                warn!(name, "ignoring navigation to unknown view: {err}");
                NavigationOutcome::Ignored
            }
        }
    }

    pub fn show_listing_form(&mut self) {
        self.sell_view = SellView::Form;
    }

    pub fn show_listing_list(&mut self) {
        self.sell_view = SellView::List;
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
