use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::{group_members_repo, groups_repo, meets_repo};
use crate::models::{GroupMemberRow, GroupRow, MeetRow};

#[derive(Debug, Deserialize, Default)]
pub struct GroupsQuery {
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_groups(pool: &SqlitePool, query: &GroupsQuery) -> sqlx::Result<Vec<GroupRow>> {
    let group_type = query.group_type.as_deref().unwrap_or("").trim();
    let search = query.search.as_deref().unwrap_or("").trim();
    let q_like = if search.is_empty() {
        String::new()
    } else {
        format!("%{}%", search.to_lowercase())
    };
    let limit = query.limit.unwrap_or(48).clamp(1, 100);
    groups_repo::list_groups(pool, group_type, &q_like, limit).await
}

/// "Hampton Roads JDM!" -> "hampton-roads-jdm". Non-alphanumeric runs
/// collapse to a single dash, leading/trailing dashes drop.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true; // suppress a leading dash
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

async fn unique_slug(pool: &SqlitePool, name: &str) -> sqlx::Result<Option<String>> {
    let base = slugify(name);
    if base.is_empty() {
        return Ok(None);
    }
    if !groups_repo::slug_exists(pool, &base).await? {
        return Ok(Some(base));
    }
    for n in 2..=50 {
        let candidate = format!("{}-{}", base, n);
        if !groups_repo::slug_exists(pool, &candidate).await? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

#[derive(Debug, Deserialize)]
pub struct NewGroupRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub privacy: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
}

pub enum CreateGroupOutcome {
    Created(GroupRow),
    InvalidName,
}

pub async fn create_group(
    pool: &SqlitePool,
    user_id: &str,
    req: &NewGroupRequest,
) -> sqlx::Result<CreateGroupOutcome> {
    let name = req.name.trim();
    if name.is_empty() {
        return Ok(CreateGroupOutcome::InvalidName);
    }
    let Some(slug) = unique_slug(pool, name).await? else {
        return Ok(CreateGroupOutcome::InvalidName);
    };

    let privacy = match req.privacy.as_deref() {
        Some("private") => "private",
        _ => "public",
    };

    let group_id = groups_repo::insert_group(
        pool,
        groups_repo::NewGroup {
            slug: &slug,
            name,
            description: req.description.as_deref().unwrap_or(""),
            group_type: req.group_type.as_deref().unwrap_or(""),
            privacy,
            location: req.location.as_deref().unwrap_or(""),
            avatar_url: req.avatar_url.as_deref().filter(|s| !s.trim().is_empty()),
            banner_url: req.banner_url.as_deref().filter(|s| !s.trim().is_empty()),
            created_by: user_id,
        },
    )
    .await?;

    group_members_repo::insert_member(pool, group_id, user_id, "owner", "active").await?;
    info!("🏁 Group created: {} ({})", name, slug);

    let group = groups_repo::load_by_slug(pool, &slug).await?;
    Ok(match group {
        Some(g) => CreateGroupOutcome::Created(g),
        // The row we just inserted is gone; surface as invalid rather than panic.
        None => CreateGroupOutcome::InvalidName,
    })
}

pub async fn list_group_meets(pool: &SqlitePool, group_id: i64) -> sqlx::Result<Vec<MeetRow>> {
    meets_repo::list_approved_for_group(pool, group_id).await
}

pub enum JoinOutcome {
    Joined,
    Pending,
    AlreadyMember,
}

/// Public groups join immediately; private groups queue a request for the
/// moderators.
pub async fn join_group(
    pool: &SqlitePool,
    group: &GroupRow,
    user_id: &str,
) -> sqlx::Result<JoinOutcome> {
    if let Some(existing) = group_members_repo::load_membership(pool, group.id, user_id).await? {
        return Ok(if existing.status == "pending" {
            JoinOutcome::Pending
        } else {
            JoinOutcome::AlreadyMember
        });
    }

    let status = if group.privacy == "private" {
        "pending"
    } else {
        "active"
    };
    group_members_repo::insert_member(pool, group.id, user_id, "member", status).await?;
    Ok(if status == "pending" {
        JoinOutcome::Pending
    } else {
        JoinOutcome::Joined
    })
}

pub enum LeaveOutcome {
    Left,
    OwnerCannotLeave,
    NotAMember,
}

pub async fn leave_group(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
) -> sqlx::Result<LeaveOutcome> {
    let Some(membership) = group_members_repo::load_membership(pool, group_id, user_id).await?
    else {
        return Ok(LeaveOutcome::NotAMember);
    };
    if membership.role == "owner" {
        return Ok(LeaveOutcome::OwnerCannotLeave);
    }
    group_members_repo::delete_member(pool, group_id, user_id).await?;
    Ok(LeaveOutcome::Left)
}

pub fn can_moderate(membership: Option<&GroupMemberRow>) -> bool {
    membership
        .filter(|m| m.status == "active")
        .map(|m| m.role == "owner" || m.role == "moderator")
        .unwrap_or(false)
}

pub fn is_owner(membership: Option<&GroupMemberRow>) -> bool {
    membership
        .filter(|m| m.status == "active")
        .map(|m| m.role == "owner")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("Hampton Roads JDM"), "hampton-roads-jdm");
        assert_eq!(slugify("  Stance & Coffee!!  "), "stance-coffee");
        assert_eq!(slugify("757---Crew"), "757-crew");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("Night Owls (VA)"), "night-owls-va");
    }

    fn member(role: &str, status: &str) -> GroupMemberRow {
        GroupMemberRow {
            group_id: 1,
            user_id: "u1".to_string(),
            role: role.to_string(),
            status: status.to_string(),
            joined_at: String::new(),
            username: None,
            display_name: None,
            profile_photo_url: None,
        }
    }

    #[test]
    fn moderation_requires_active_owner_or_moderator() {
        assert!(can_moderate(Some(&member("owner", "active"))));
        assert!(can_moderate(Some(&member("moderator", "active"))));
        assert!(!can_moderate(Some(&member("member", "active"))));
        assert!(!can_moderate(Some(&member("owner", "pending"))));
        assert!(!can_moderate(None));
    }

    #[test]
    fn ownership_check() {
        assert!(is_owner(Some(&member("owner", "active"))));
        assert!(!is_owner(Some(&member("moderator", "active"))));
        assert!(!is_owner(None));
    }
}
