//! Maintenance team management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::team::{
        AddTeamMember, CreateTeam, MaintenanceTeam, TeamDetail, TeamMemberInfo, TeamQuery,
        TeamSummary, UpdateTeam,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TeamsService {
    repository: Repository,
}

impl TeamsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List teams with member counts
    pub async fn list(&self, query: &TeamQuery) -> AppResult<(Vec<TeamSummary>, i64)> {
        self.repository.teams.list(query).await
    }

    /// Get a team with its members
    pub async fn get_detail(&self, id: Uuid) -> AppResult<TeamDetail> {
        let team = self.repository.teams.get_by_id(id).await?;
        let members = self.repository.teams.members(id).await?;
        Ok(TeamDetail {
            id: team.id,
            name: team.name,
            description: team.description,
            created_at: team.created_at,
            member_count: members.len() as i64,
            members,
        })
    }

    /// Create a team
    pub async fn create(&self, data: CreateTeam) -> AppResult<MaintenanceTeam> {
        if self.repository.teams.get_by_name(&data.name).await?.is_some() {
            return Err(AppError::Conflict("Team name already exists".to_string()));
        }
        self.repository.teams.create(&data).await
    }

    /// Update a team
    pub async fn update(&self, id: Uuid, data: UpdateTeam) -> AppResult<MaintenanceTeam> {
        if let Some(ref name) = data.name {
            if let Some(existing) = self.repository.teams.get_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::Conflict("Team name already exists".to_string()));
                }
            }
        }
        self.repository.teams.update(id, &data).await
    }

    /// Delete a team
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.teams.delete(id).await
    }

    /// List members of a team
    pub async fn members(&self, team_id: Uuid) -> AppResult<Vec<TeamMemberInfo>> {
        // Verify team exists
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.teams.members(team_id).await
    }

    /// Add a member to a team
    pub async fn add_member(&self, team_id: Uuid, data: AddTeamMember) -> AppResult<TeamMemberInfo> {
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.users.get_by_id(data.user_id).await?;

        if self.repository.teams.is_member(team_id, data.user_id).await? {
            return Err(AppError::Conflict(
                "User is already a team member".to_string(),
            ));
        }

        self.repository.teams.add_member(team_id, data.user_id).await
    }

    /// Remove a member from a team
    pub async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> AppResult<()> {
        self.repository.teams.remove_member(team_id, user_id).await
    }
}
