pub mod access;
pub mod actions;
pub mod domain;
pub mod navigation;
pub mod ports;
pub mod resources;

pub use access::{can_access, check, Access, RecoveryAction, UnauthorizedView};
pub use actions::{context_menu, Action};
pub use domain::{
    Accountant, AccountantDraft, ActivationState, ClientAccount, ClientDraft, Folder, FolderDraft,
    Role, RoleSet, Session,
};
pub use navigation::{MenuItem, MenuKind, NavEntry, NavMenu, NavShell, Route, Screen, SectionState};
pub use ports::{
    AuthService, PortError, PortResult, Resource, ResourceService, SessionListener,
    SessionProvider,
};
