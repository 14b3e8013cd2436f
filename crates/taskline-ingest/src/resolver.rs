//! Recipient resolution: which users should see a given event.
//!
//! The target set combines event-intrinsic actors (creator, assignee, owner,
//! affected user) with a fresh team-membership lookup per event; membership
//! can change between events, so nothing is cached. A directory failure
//! degrades fan-out breadth (zero member contribution) but never blocks
//! delivery to the intrinsic recipients.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use taskline_core::{EventKind, RawEvent, UserId};

use crate::directory::TeamDirectory;

/// Computes the deduplicated target user set for decoded events.
pub struct RecipientResolver {
    directory: Arc<dyn TeamDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn TeamDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the target user ids for `raw`, whose type parsed to `kind`.
    ///
    /// | Family | Targets |
    /// |---|---|
    /// | `task.*` | team members ∪ assignee ∪ creator |
    /// | `team.*` | team members ∪ owner |
    /// | `team.member_*` | team members ∪ affected user ∪ actor |
    /// | `user.created` | the user themselves |
    pub async fn resolve(&self, raw: &RawEvent, kind: EventKind) -> Vec<UserId> {
        let mut targets: BTreeSet<UserId> = BTreeSet::new();

        if kind.is_task() {
            targets.extend(self.team_members(raw.team_id).await);
            if let Some(assignee) = raw.assignee_id.filter(|id| *id > 0) {
                targets.insert(assignee);
            }
            if raw.creator_id > 0 {
                targets.insert(raw.creator_id);
            }
        } else if kind.is_team() {
            targets.extend(self.team_members(raw.team_id).await);
            if raw.owner_id > 0 {
                targets.insert(raw.owner_id);
            }
        } else if kind.is_team_member() {
            targets.extend(self.team_members(raw.team_id).await);
            if raw.user_id > 0 {
                targets.insert(raw.user_id);
            }
            // The removing/updating admin sees the change too, even once the
            // affected user is no longer in the member list.
            if raw.actor_id > 0 {
                targets.insert(raw.actor_id);
            }
        } else if raw.user_id > 0 {
            // user.created
            targets.insert(raw.user_id);
        }

        debug!(
            event_type = %kind,
            team_id = raw.team_id,
            target_count = targets.len(),
            "Resolved target users"
        );
        targets.into_iter().collect()
    }

    /// Member contribution for a team, empty on lookup failure or for the
    /// global scope (team 0).
    async fn team_members(&self, team_id: i64) -> Vec<UserId> {
        if team_id <= 0 {
            return Vec::new();
        }
        match self.directory.members(team_id).await {
            Ok(members) => members.into_iter().map(|m| m.user_id).collect(),
            Err(e) => {
                warn!(team_id, error = %e, "Team Directory lookup failed, degrading fan-out");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use taskline_core::{Error, Result};

    use crate::directory::TeamMember;

    /// In-memory directory backed by a static membership table.
    struct StaticDirectory {
        teams: HashMap<i64, Vec<UserId>>,
    }

    impl StaticDirectory {
        fn new(teams: &[(i64, &[UserId])]) -> Arc<Self> {
            Arc::new(Self {
                teams: teams
                    .iter()
                    .map(|(team, users)| (*team, users.to_vec()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl TeamDirectory for StaticDirectory {
        async fn members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
            Ok(self
                .teams
                .get(&team_id)
                .map(|users| {
                    users
                        .iter()
                        .map(|user_id| TeamMember {
                            user_id: *user_id,
                            team_id,
                            role: "member".to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    /// Directory that always fails, simulating an outage.
    struct DownDirectory;

    #[async_trait]
    impl TeamDirectory for DownDirectory {
        async fn members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
            Err(Error::Directory(format!(
                "team service unreachable for team {team_id}"
            )))
        }
    }

    fn raw(json: &str) -> RawEvent {
        RawEvent::from_json(json.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_task_event_targets_members_assignee_creator() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[(7, &[1, 2, 3])]));
        let event = raw(
            r#"{"eventType":"task.updated","taskId":12,"teamId":7,"actorId":4,
                "creatorId":4,"assigneeId":5}"#,
        );

        let targets = resolver.resolve(&event, EventKind::TaskUpdated).await;
        assert_eq!(targets, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_task_event_dedups_overlapping_roles() {
        // Creator and assignee are both already team members.
        let resolver = RecipientResolver::new(StaticDirectory::new(&[(7, &[1, 2])]));
        let event = raw(
            r#"{"eventType":"task.created","taskId":1,"teamId":7,"actorId":1,
                "creatorId":1,"assigneeId":2}"#,
        );

        let targets = resolver.resolve(&event, EventKind::TaskCreated).await;
        assert_eq!(targets, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_task_event_without_assignee() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[(7, &[1])]));
        let event = raw(r#"{"eventType":"task.deleted","taskId":1,"teamId":7,"creatorId":4}"#);

        let targets = resolver.resolve(&event, EventKind::TaskDeleted).await;
        assert_eq!(targets, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_team_event_targets_members_and_owner() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[(7, &[1, 2])]));
        let event = raw(r#"{"eventType":"team.updated","teamId":7,"actorId":9,"ownerId":9}"#);

        let targets = resolver.resolve(&event, EventKind::TeamUpdated).await;
        assert_eq!(targets, vec![1, 2, 9]);
    }

    #[tokio::test]
    async fn test_member_event_includes_affected_user_and_actor() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[(7, &[1, 2])]));
        let event = raw(
            r#"{"eventType":"team.member_removed","teamId":7,"userId":5,"actorId":2}"#,
        );

        let targets = resolver.resolve(&event, EventKind::TeamMemberRemoved).await;
        assert_eq!(targets, vec![1, 2, 5]);
    }

    #[tokio::test]
    async fn test_user_created_targets_only_the_user() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[]));
        let event = raw(r#"{"eventType":"user.created","userId":9}"#);

        let targets = resolver.resolve(&event, EventKind::UserCreated).await;
        assert_eq!(targets, vec![9]);
    }

    #[tokio::test]
    async fn test_directory_outage_degrades_to_intrinsic_recipients() {
        let resolver = RecipientResolver::new(Arc::new(DownDirectory));
        let event = raw(
            r#"{"eventType":"team.member_added","teamId":7,"userId":5,"actorId":2}"#,
        );

        // No member fan-out, but the affected user and actor still resolve.
        let targets = resolver.resolve(&event, EventKind::TeamMemberAdded).await;
        assert_eq!(targets, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_global_team_skips_directory_lookup() {
        // Team 0 must not hit the (failing) directory at all.
        let resolver = RecipientResolver::new(Arc::new(DownDirectory));
        let event = raw(r#"{"eventType":"task.created","taskId":1,"teamId":0,"creatorId":4}"#);

        let targets = resolver.resolve(&event, EventKind::TaskCreated).await;
        assert_eq!(targets, vec![4]);
    }

    #[tokio::test]
    async fn test_zero_ids_are_not_targets() {
        let resolver = RecipientResolver::new(StaticDirectory::new(&[]));
        let event = raw(r#"{"eventType":"task.created","taskId":1,"teamId":0}"#);

        let targets = resolver.resolve(&event, EventKind::TaskCreated).await;
        assert!(targets.is_empty());
    }
}
