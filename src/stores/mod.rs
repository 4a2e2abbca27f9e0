//! Observable state containers for client code.
//!
//! Each container is an independently owned cell; nothing here is global.
//! Everything is single-threaded and synchronous.

pub mod notifications;
pub mod writable;

pub use notifications::{NewNotification, Notification, NotificationKind, Notifications};
pub use writable::{Subscription, Writable};

use crate::db::PostgrestDb;
use crate::error::AppError;
use crate::models::{AuthUser, Profile, Session};

/// One instance of each client-side container.
#[derive(Clone, Default)]
pub struct AppStores {
    pub session: Writable<Option<Session>>,
    pub user: Writable<Option<AuthUser>>,
    pub profile: Writable<Option<Profile>>,
    pub notifications: Notifications,
}

impl AppStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new session and its user.
    pub fn sign_in(&self, session: Session) {
        self.user.set(Some(session.user.clone()));
        self.session.set(Some(session));
    }

    /// Forget the session, user and profile.
    pub fn sign_out(&self) {
        self.session.set(None);
        self.user.set(None);
        self.profile.set(None);
    }

    /// Load the current user's profile into `profile`.
    ///
    /// Signed out, or no profile row, leaves `profile` empty.
    pub async fn refresh_profile(&self, db: &PostgrestDb) -> Result<Option<Profile>, AppError> {
        let user = self.user.get();
        let profile = db.get_profile(user.as_ref()).await?;
        self.profile.set(profile.clone());
        Ok(profile)
    }
}
