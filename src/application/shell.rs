//! The user-facing seam the editors talk to: alerts, confirmations, navigation.

/// Routes the dashboard knows about.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const HOME: &str = "/";
    pub const PROMOTION_BANNERS: &str = "/promotion-banners";
    pub const HEROES: &str = "/heroes";
    pub const GAMES: &str = "/games";
    pub const NEWS: &str = "/news";
    pub const COMPANY: &str = "/company";
    pub const CONTACT: &str = "/contact";
}

/// Implemented by whatever presents the editors to a person.
pub trait Shell: Send + Sync {
    /// Show a message that needs no answer.
    fn notify(&self, message: &str);

    /// Ask a yes/no question; `true` means proceed.
    fn confirm(&self, question: &str) -> bool;

    fn navigate(&self, route: &str);
}
