#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    BrowseCatalog,
    OwnWatchlist,
    EditCatalog,
    ManageUsers,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::BrowseCatalog,
    Permission::OwnWatchlist,
    Permission::EditCatalog,
    Permission::ManageUsers,
];
const REGULAR_PERMISSIONS: &[Permission] = &[Permission::BrowseCatalog, Permission::OwnWatchlist];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Regular,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Regular => REGULAR_PERMISSIONS,
        }
    }

    // Wire and db representation, "user" is the historical name for Regular
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Regular => "user",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::Regular),
            _ => None,
        }
    }
}
