use crate::{
    config::GlobalConfig,
    domain::{RoleId, UserId},
    ports::Directory,
};

/// The three-clause privilege check, evaluated in order with short-circuit:
/// configured admin role, platform-native admin permission, whitelist entry.
pub fn is_privileged(
    cfg: &GlobalConfig,
    user: UserId,
    roles: &[RoleId],
    platform_admin: bool,
) -> bool {
    if roles.iter().any(|r| cfg.admin_role_ids.contains(r)) {
        return true;
    }
    if platform_admin {
        return true;
    }
    cfg.whitelist_user_ids.contains(&user)
}

/// Resolve the acting member and run the privilege check.
///
/// Fail-closed: a directory lookup failure is logged and treated as "not
/// privileged". A privileged operation must never be granted on an error
/// path.
pub async fn check(directory: &dyn Directory, cfg: &GlobalConfig, user: UserId) -> bool {
    match directory.resolve_member(user).await {
        Ok(member) => is_privileged(cfg, user, &member.roles, member.is_platform_admin),
        Err(err) => {
            tracing::warn!(user = user.0, %err, "privilege lookup failed; denying");
            false
        }
    }
}
