use crate::db::types::UserRole;

/// Column widths of `user_id`/`host_id` and `display_name` in the quiz tables.
pub(crate) const MAX_USER_ID_CHARS: usize = 64;
pub(crate) const MAX_DISPLAY_NAME_CHARS: usize = 200;

/// Caller identity resolved by the authentication layer. Every quiz
/// operation receives it explicitly and trusts it as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
    pub(crate) role: UserRole,
}

impl Identity {
    pub(crate) fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self { user_id: user_id.into(), display_name: display_name.into(), role }
    }
}
