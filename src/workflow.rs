//! Status workflow state machine for maintenance requests.
//!
//! The transition table below is the sole source of truth for which stage
//! changes are legal. Every status mutation goes through
//! [`crate::repository::requests::RequestsRepository::transition`], which
//! re-reads the row inside the transaction and consults this module, so a
//! differently-gated entry point cannot bypass these rules.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{enums::RequestStatus, user::Actor},
};

/// Allowed status transitions: current stage -> allowed next stages.
/// `scrap` is terminal.
const STATUS_TRANSITIONS: [(RequestStatus, &[RequestStatus]); 4] = [
    (RequestStatus::New, &[RequestStatus::InProgress]),
    // Can go back to new if work turns out not to have started
    (RequestStatus::InProgress, &[RequestStatus::Repaired, RequestStatus::New]),
    (RequestStatus::Repaired, &[RequestStatus::Scrap]),
    (RequestStatus::Scrap, &[]),
];

/// Allowed next stages from the given stage
pub fn allowed_transitions(current: RequestStatus) -> &'static [RequestStatus] {
    STATUS_TRANSITIONS
        .iter()
        .find(|(status, _)| *status == current)
        .map(|(_, allowed)| *allowed)
        .unwrap_or(&[])
}

/// A stage with no outgoing transitions
pub fn is_terminal(status: RequestStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// Validate a stage transition against the table.
///
/// Same-stage transitions are always permitted (treated as a no-op by the
/// caller). Anything else must appear in the table or the call fails with
/// the set of stages that would have been allowed.
pub fn validate_transition(current: RequestStatus, target: RequestStatus) -> AppResult<()> {
    if current == target {
        return Ok(());
    }

    if allowed_transitions(current).contains(&target) {
        Ok(())
    } else {
        Err(AppError::IllegalTransition {
            from: current,
            to: target,
            allowed: allowed_transitions(current).to_vec(),
        })
    }
}

/// Authorize a stage transition for the acting user.
///
/// Rules, in order:
/// - only `admin`, `manager` and `technician` may move requests at all;
/// - a technician may only move requests belonging to one of their teams;
/// - moving into `scrap` requires `admin`, regardless of table legality.
pub fn authorize_transition(
    actor: &Actor,
    request_team_id: Option<Uuid>,
    target: RequestStatus,
) -> AppResult<()> {
    use crate::models::enums::UserRole;

    match actor.role {
        UserRole::Admin | UserRole::Manager => {}
        UserRole::Technician => {
            let on_team = request_team_id
                .map(|team| actor.team_ids.contains(&team))
                .unwrap_or(false);
            if !on_team {
                return Err(AppError::Authorization(
                    "You can only update requests assigned to your team".to_string(),
                ));
            }
        }
        UserRole::User => {
            return Err(AppError::Authorization(
                "You do not have permission to change request stages".to_string(),
            ));
        }
    }

    if target == RequestStatus::Scrap && actor.role != UserRole::Admin {
        return Err(AppError::Authorization(
            "Only administrators can scrap a request".to_string(),
        ));
    }

    Ok(())
}

/// Visibility scope for request list and read operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Managers and admins see everything
    All,
    /// Technicians see requests belonging to their teams
    Teams(Vec<Uuid>),
    /// Plain users see only requests they created
    Creator(Uuid),
}

/// Resolve the request visibility scope for the acting user
pub fn list_scope(actor: &Actor) -> ListScope {
    use crate::models::enums::UserRole;

    match actor.role {
        UserRole::Admin | UserRole::Manager => ListScope::All,
        UserRole::Technician => ListScope::Teams(actor.team_ids.clone()),
        UserRole::User => ListScope::Creator(actor.id),
    }
}

/// Whether the acting user may read the given request
pub fn can_view(actor: &Actor, request_team_id: Option<Uuid>, created_by: Uuid) -> bool {
    match list_scope(actor) {
        ListScope::All => true,
        ListScope::Teams(teams) => request_team_id
            .map(|team| teams.contains(&team))
            .unwrap_or(false),
        ListScope::Creator(id) => created_by == id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::UserRole;

    fn actor(role: UserRole, team_ids: Vec<Uuid>) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            team_ids,
        }
    }

    #[test]
    fn test_allowed_transitions_table() {
        assert_eq!(
            allowed_transitions(RequestStatus::New),
            &[RequestStatus::InProgress]
        );
        assert_eq!(
            allowed_transitions(RequestStatus::InProgress),
            &[RequestStatus::Repaired, RequestStatus::New]
        );
        assert_eq!(
            allowed_transitions(RequestStatus::Repaired),
            &[RequestStatus::Scrap]
        );
        assert!(allowed_transitions(RequestStatus::Scrap).is_empty());
    }

    #[test]
    fn test_scrap_is_terminal() {
        assert!(is_terminal(RequestStatus::Scrap));
        assert!(!is_terminal(RequestStatus::New));
        assert!(!is_terminal(RequestStatus::InProgress));
        assert!(!is_terminal(RequestStatus::Repaired));
    }

    #[test]
    fn test_same_stage_is_always_valid() {
        for status in RequestStatus::ALL {
            assert!(validate_transition(status, status).is_ok());
        }
    }

    #[test]
    fn test_skipping_in_progress_is_rejected() {
        let err = validate_transition(RequestStatus::New, RequestStatus::Repaired).unwrap_err();
        match err {
            AppError::IllegalTransition { allowed, .. } => {
                assert_eq!(allowed, vec![RequestStatus::InProgress]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_no_transition_out_of_scrap() {
        for target in [
            RequestStatus::New,
            RequestStatus::InProgress,
            RequestStatus::Repaired,
        ] {
            let err = validate_transition(RequestStatus::Scrap, target).unwrap_err();
            match err {
                AppError::IllegalTransition { allowed, .. } => assert!(allowed.is_empty()),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_in_progress_can_go_back_to_new() {
        assert!(validate_transition(RequestStatus::InProgress, RequestStatus::New).is_ok());
    }

    #[test]
    fn test_plain_users_cannot_transition() {
        let actor = actor(UserRole::User, vec![]);
        for target in RequestStatus::ALL {
            assert!(authorize_transition(&actor, None, target).is_err());
        }
    }

    #[test]
    fn test_scrap_requires_admin() {
        let team = Uuid::new_v4();
        let manager = actor(UserRole::Manager, vec![]);
        let technician = actor(UserRole::Technician, vec![team]);
        let admin = actor(UserRole::Admin, vec![]);

        assert!(authorize_transition(&manager, Some(team), RequestStatus::Scrap).is_err());
        assert!(authorize_transition(&technician, Some(team), RequestStatus::Scrap).is_err());
        assert!(authorize_transition(&admin, Some(team), RequestStatus::Scrap).is_ok());
    }

    #[test]
    fn test_technician_limited_to_own_teams() {
        let team = Uuid::new_v4();
        let other_team = Uuid::new_v4();
        let technician = actor(UserRole::Technician, vec![team]);

        assert!(authorize_transition(&technician, Some(team), RequestStatus::InProgress).is_ok());
        assert!(
            authorize_transition(&technician, Some(other_team), RequestStatus::InProgress).is_err()
        );
        // Request without a team is out of reach for technicians
        assert!(authorize_transition(&technician, None, RequestStatus::InProgress).is_err());
    }

    #[test]
    fn test_managers_not_team_scoped() {
        let manager = actor(UserRole::Manager, vec![]);
        assert!(
            authorize_transition(&manager, Some(Uuid::new_v4()), RequestStatus::InProgress).is_ok()
        );
    }

    #[test]
    fn test_list_scope_by_role() {
        let admin = actor(UserRole::Admin, vec![]);
        assert_eq!(list_scope(&admin), ListScope::All);

        let team = Uuid::new_v4();
        let technician = actor(UserRole::Technician, vec![team]);
        assert_eq!(list_scope(&technician), ListScope::Teams(vec![team]));

        let user = actor(UserRole::User, vec![]);
        assert_eq!(list_scope(&user), ListScope::Creator(user.id));
    }

    #[test]
    fn test_teamless_technician_sees_nothing() {
        let technician = actor(UserRole::Technician, vec![]);
        assert!(!can_view(&technician, Some(Uuid::new_v4()), Uuid::new_v4()));
        assert!(!can_view(&technician, None, Uuid::new_v4()));
    }

    #[test]
    fn test_user_sees_own_requests_only() {
        let user = actor(UserRole::User, vec![]);
        assert!(can_view(&user, None, user.id));
        assert!(!can_view(&user, None, Uuid::new_v4()));
    }
}
