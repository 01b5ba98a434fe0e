//! crates/ledgerdesk_core/src/navigation.rs
//!
//! The navigation shell: a role-filtered, collapsible menu tree, the history of
//! visited screens, and the logout transition.

use crate::access::{can_access, check, Access, UnauthorizedView};
use crate::domain::{Role, RoleSet, Session};
use std::collections::HashMap;
use std::fmt;

//=========================================================================================
// Routes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route(String);

impl Route {
    pub const LOGIN: &'static str = "/login";
    pub const DASHBOARD: &'static str = "/dashboard";

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn login() -> Self {
        Self::new(Self::LOGIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this route is `prefix` itself or a path beneath it.
    pub fn is_within(&self, prefix: &str) -> bool {
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Static Menu Configuration
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Translation key of the label.
    pub label: &'static str,
    pub route: &'static str,
    pub required: RoleSet,
    pub children: Vec<NavEntry>,
}

impl NavEntry {
    pub fn link(label: &'static str, route: &'static str, required: RoleSet) -> Self {
        Self {
            label,
            route,
            required,
            children: Vec::new(),
        }
    }

    pub fn section(
        label: &'static str,
        route: &'static str,
        required: RoleSet,
        children: Vec<NavEntry>,
    ) -> Self {
        Self {
            label,
            route,
            required,
            children,
        }
    }

    pub fn is_section(&self) -> bool {
        !self.children.is_empty()
    }
}

/// The immutable menu tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMenu {
    entries: Vec<NavEntry>,
}

impl NavMenu {
    pub fn new(entries: Vec<NavEntry>) -> Self {
        Self { entries }
    }

    /// The console's sidebar.
    pub fn standard() -> Self {
        let admin = RoleSet::of(&[Role::Admin]);
        let accountants = RoleSet::STAFF.union(RoleSet::of(&[Role::ExternalAccountant]));

        Self::new(vec![
            NavEntry::link("nav.dashboard", Route::DASHBOARD, RoleSet::ALL),
            NavEntry::section(
                "nav.accountants",
                "/accountants",
                RoleSet::STAFF,
                vec![
                    NavEntry::link("nav.accountants.internal", "/accountants/internal", admin),
                    NavEntry::link("nav.accountants.external", "/accountants/external", RoleSet::STAFF),
                ],
            ),
            NavEntry::section(
                "nav.clients",
                "/clients",
                accountants,
                vec![
                    NavEntry::link("nav.clients.directory", "/clients/directory", accountants),
                    NavEntry::link("nav.clients.folders", "/clients/folders", accountants),
                ],
            ),
            NavEntry::section(
                "nav.invoices",
                "/invoices",
                RoleSet::ALL,
                vec![
                    NavEntry::link("nav.invoices.inbox", "/invoices/inbox", RoleSet::ALL),
                    NavEntry::link("nav.invoices.favorites", "/invoices/favorites", RoleSet::ALL),
                    NavEntry::link("nav.invoices.archive", "/invoices/archive", RoleSet::ALL),
                ],
            ),
            NavEntry::link("nav.folders", "/folders", RoleSet::ALL),
            NavEntry::link("nav.settings", "/settings", admin),
            NavEntry::link("nav.profile", "/profile", RoleSet::ALL),
        ])
    }

    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    /// The roles allowed on `route`: the intersection of every entry on the path
    /// to the deepest entry containing it. Routes outside the menu only need an
    /// active session.
    pub fn required_for(&self, route: &Route) -> RoleSet {
        let mut required = RoleSet::ALL;
        let mut level = self.entries.as_slice();
        while let Some(entry) = level
            .iter()
            .filter(|entry| route.is_within(entry.route))
            .max_by_key(|entry| entry.route.len())
        {
            required = required.intersect(entry.required);
            level = entry.children.as_slice();
        }
        required
    }
}

//=========================================================================================
// Render Model
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Collapsed,
    Expanded,
}

impl SectionState {
    pub fn toggled(&self) -> Self {
        match self {
            SectionState::Collapsed => SectionState::Expanded,
            SectionState::Expanded => SectionState::Collapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuKind {
    Link,
    Section {
        state: SectionState,
        children: Vec<MenuItem>,
    },
}

/// One visible menu item, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub route: &'static str,
    /// Highlighted because the current route lies on or beneath it.
    pub active: bool,
    pub kind: MenuKind,
}

//=========================================================================================
// History
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Page(Route),
    Unauthorized { route: Route, view: UnauthorizedView },
}

impl Screen {
    pub fn route(&self) -> &Route {
        match self {
            Screen::Page(route) => route,
            Screen::Unauthorized { route, .. } => route,
        }
    }
}

/// The back stack of visited screens.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Screen::Page(start),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Screen {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    fn push(&mut self, screen: Screen) {
        if screen != self.current {
            let previous = std::mem::replace(&mut self.current, screen);
            self.history.push(previous);
        }
    }

    /// Returns to the previous screen. False when there is nowhere to go.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    fn reset(&mut self, route: Route) {
        self.history.clear();
        self.current = Screen::Page(route);
    }
}

//=========================================================================================
// Shell
//=========================================================================================

pub struct NavShell {
    menu: NavMenu,
    sections: HashMap<&'static str, SectionState>,
    navigator: Navigator,
}

impl NavShell {
    /// A shell sitting on the login page.
    pub fn new(menu: NavMenu) -> Self {
        Self {
            menu,
            sections: HashMap::new(),
            navigator: Navigator::new(Route::login()),
        }
    }

    pub fn screen(&self) -> &Screen {
        self.navigator.current()
    }

    pub fn current_route(&self) -> &Route {
        self.navigator.current().route()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn config(&self) -> &NavMenu {
        &self.menu
    }

    pub fn section_state(&self, label: &str) -> SectionState {
        self.sections.get(label).copied().unwrap_or_default()
    }

    /// Flips a section between collapsed and expanded and returns the new state.
    pub fn toggle_section(&mut self, label: &'static str) -> SectionState {
        let state = self.sections.entry(label).or_default();
        *state = state.toggled();
        *state
    }

    /// The menu as `session` may see it. Denied entries are left out entirely.
    pub fn menu(&self, session: &Session) -> Vec<MenuItem> {
        self.visible(self.menu.entries(), session)
    }

    fn visible(&self, entries: &[NavEntry], session: &Session) -> Vec<MenuItem> {
        let current = self.current_route();
        entries
            .iter()
            .filter(|entry| can_access(session, entry.required))
            .filter_map(|entry| {
                let kind = if entry.is_section() {
                    let children = self.visible(&entry.children, session);
                    if children.is_empty() {
                        return None;
                    }
                    MenuKind::Section {
                        state: self.section_state(entry.label),
                        children,
                    }
                } else {
                    MenuKind::Link
                };
                Some(MenuItem {
                    label: entry.label,
                    route: entry.route,
                    active: current.is_within(entry.route),
                    kind,
                })
            })
            .collect()
    }

    /// Attempts to move to `route`. A denied attempt still moves, onto the
    /// unauthorized screen, so that going back returns to where the user was.
    pub fn navigate(&mut self, session: &Session, route: impl Into<Route>) -> Access {
        let route = route.into();
        let access = check(session, self.menu.required_for(&route));
        let screen = match &access {
            Access::Granted => Screen::Page(route),
            Access::LoginRequired => Screen::Page(Route::login()),
            Access::Denied(view) => Screen::Unauthorized {
                route,
                view: view.clone(),
            },
        };
        self.navigator.push(screen);
        access
    }

    /// Like `navigate`, but starts a fresh history. Used right after login.
    pub fn enter(&mut self, session: &Session, route: impl Into<Route>) -> Access {
        self.navigator.reset(Route::login());
        let access = self.navigate(session, route);
        self.navigator.history.clear();
        access
    }

    /// The recovery action of the unauthorized screen.
    pub fn go_back(&mut self) -> bool {
        self.navigator.back()
    }

    /// Ends the session and sends the user to the login page, whatever happens.
    pub fn logout(&mut self, session: &mut Session) {
        session.end();
        self.return_to_login();
    }

    /// The login page with an empty history. For sessions that were already
    /// ended elsewhere.
    pub fn return_to_login(&mut self) {
        self.navigator.reset(Route::login());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session::new("token", role, "user@firm.test")
    }

    fn labels(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|item| item.label).collect()
    }

    #[test]
    fn route_prefixes_respect_segment_boundaries() {
        let route = Route::from("/accountants/internal/42");
        assert!(route.is_within("/accountants"));
        assert!(route.is_within("/accountants/internal"));
        assert!(!Route::from("/accountantsx").is_within("/accountants"));
    }

    #[test]
    fn required_roles_narrow_along_the_path() {
        let menu = NavMenu::standard();
        assert_eq!(
            menu.required_for(&Route::from("/accountants/internal")),
            RoleSet::of(&[Role::Admin])
        );
        assert_eq!(
            menu.required_for(&Route::from("/accountants/external/7")),
            RoleSet::STAFF
        );
        assert_eq!(menu.required_for(&Route::from("/nowhere")), RoleSet::ALL);
    }

    #[test]
    fn sections_start_collapsed_and_toggle_forever() {
        let mut shell = NavShell::new(NavMenu::standard());
        assert_eq!(shell.section_state("nav.invoices"), SectionState::Collapsed);
        for expected in [
            SectionState::Expanded,
            SectionState::Collapsed,
            SectionState::Expanded,
        ] {
            assert_eq!(shell.toggle_section("nav.invoices"), expected);
        }
        assert_eq!(shell.section_state("nav.clients"), SectionState::Collapsed);
    }

    #[test]
    fn clients_never_see_staff_entries() {
        let shell = NavShell::new(NavMenu::standard());
        let menu = shell.menu(&session(Role::Client));
        assert_eq!(
            labels(&menu),
            vec!["nav.dashboard", "nav.invoices", "nav.folders", "nav.profile"]
        );
    }

    #[test]
    fn sections_lose_children_the_role_cannot_open() {
        let shell = NavShell::new(NavMenu::standard());
        let menu = shell.menu(&session(Role::InternalAccountant));
        let accountants = menu
            .iter()
            .find(|item| item.label == "nav.accountants")
            .unwrap();
        match &accountants.kind {
            MenuKind::Section { children, .. } => {
                assert_eq!(labels(children), vec!["nav.accountants.external"])
            }
            MenuKind::Link => panic!("accountants should be a section"),
        }
        assert!(!labels(&menu).contains(&"nav.settings"));
    }

    #[test]
    fn ended_sessions_get_an_empty_menu() {
        let shell = NavShell::new(NavMenu::standard());
        let mut ended = session(Role::Admin);
        ended.end();
        assert!(shell.menu(&ended).is_empty());
    }

    #[test]
    fn active_route_highlights_the_link_and_its_section() {
        let mut shell = NavShell::new(NavMenu::standard());
        let admin = session(Role::Admin);
        assert!(shell.navigate(&admin, "/accountants/internal").is_granted());

        let menu = shell.menu(&admin);
        let section = menu.iter().find(|i| i.label == "nav.accountants").unwrap();
        assert!(section.active);
        let MenuKind::Section { children, .. } = &section.kind else {
            panic!("accountants should be a section");
        };
        assert!(children[0].active);
        assert!(!children[1].active);
        assert!(!menu.iter().find(|i| i.label == "nav.dashboard").unwrap().active);
    }

    #[test]
    fn denied_navigation_shows_unauthorized_and_going_back_restores_the_route() {
        let mut shell = NavShell::new(NavMenu::standard());
        let accountant = session(Role::InternalAccountant);
        let before = accountant.clone();

        shell.enter(&accountant, Route::DASHBOARD);
        shell.navigate(&accountant, "/clients/directory");

        let access = shell.navigate(&accountant, "/settings");
        let Access::Denied(view) = access else {
            panic!("settings should be admin only");
        };
        assert_eq!(view.actions().len(), 1);
        assert!(matches!(shell.screen(), Screen::Unauthorized { .. }));

        assert!(shell.go_back());
        assert_eq!(shell.screen(), &Screen::Page(Route::from("/clients/directory")));
        assert_eq!(accountant, before);
    }

    #[test]
    fn logout_is_unconditional_and_clears_history() {
        let mut shell = NavShell::new(NavMenu::standard());
        let mut admin = session(Role::Admin);
        shell.enter(&admin, Route::DASHBOARD);
        shell.navigate(&admin, "/settings");

        shell.logout(&mut admin);

        assert!(!admin.is_active());
        assert_eq!(admin.credential(), None);
        assert_eq!(shell.current_route(), &Route::login());
        assert!(!shell.go_back());
        assert!(shell.menu(&admin).is_empty());
    }

    #[test]
    fn entering_starts_a_fresh_history() {
        let mut shell = NavShell::new(NavMenu::standard());
        let client = session(Role::Client);
        assert!(shell.enter(&client, Route::DASHBOARD).is_granted());
        assert_eq!(shell.navigator().depth(), 0);
        assert_eq!(shell.current_route().as_str(), Route::DASHBOARD);
    }
}
