//! Administration endpoints for roles, the hierarchy, groups, and
//! membership. All of them require the global administrator role.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use diagrid_application::{CreateGroupInput, CreateRoleInput, GuardTarget, RoleRequirement};
use diagrid_core::UserIdentity;
use diagrid_domain::{GroupId, RoleId, RoleName, UserId};

use crate::dto::{
    CreateGroupRequest, CreateHierarchyEdgeRequest, CreateRoleRequest, GroupResponse,
    RenameRoleRequest, RoleResponse, RoleTreeNodeResponse,
};
use crate::error::ApiResult;
use crate::handlers::ensure_allowed;
use crate::state::AppState;

async fn require_admin(
    state: &AppState,
    identity: &UserIdentity,
    target: &str,
) -> ApiResult<()> {
    ensure_allowed(
        state,
        identity,
        GuardTarget::new(target).with_role_requirement(RoleRequirement::Admin),
    )
    .await
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    require_admin(&state, &identity, "/admin/roles").await?;

    let roles = state.admin_service.list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    require_admin(&state, &identity, "/admin/roles").await?;

    let role = state
        .admin_service
        .create_role(
            &identity,
            CreateRoleInput {
                name: RoleName::new(request.name)?,
                display_name: request.display_name,
                description: request.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(role.into())))
}

pub async fn rename_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
    Json(request): Json<RenameRoleRequest>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/roles").await?;

    state
        .admin_service
        .rename_role(
            &identity,
            role_id,
            RoleName::new(request.name)?,
            request.display_name,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/roles").await?;

    state.admin_service.delete_role(&identity, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn role_tree_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleTreeNodeResponse>>> {
    require_admin(&state, &identity, "/admin/roles/tree").await?;

    let tree = state.admin_service.role_tree().await?;
    Ok(Json(
        tree.into_iter().map(RoleTreeNodeResponse::from).collect(),
    ))
}

pub async fn create_hierarchy_edge_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<CreateHierarchyEdgeRequest>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/hierarchy/edges").await?;

    state
        .admin_service
        .create_hierarchy_edge(
            &identity,
            request.parent_id,
            request.child_id,
            request.hierarchy_level,
        )
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn delete_hierarchy_edge_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((parent_id, child_id)): Path<(RoleId, RoleId)>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/hierarchy/edges").await?;

    state
        .admin_service
        .delete_hierarchy_edge(&identity, parent_id, child_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_groups_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    require_admin(&state, &identity, "/admin/groups").await?;

    let groups = state.admin_service.list_groups().await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

pub async fn create_group_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupResponse>)> {
    require_admin(&state, &identity, "/admin/groups").await?;

    let group = state
        .admin_service
        .create_group(
            &identity,
            CreateGroupInput {
                name: request.name,
                description: request.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(group.into())))
}

pub async fn delete_group_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(group_id): Path<GroupId>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/groups").await?;

    state.admin_service.delete_group(&identity, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_group_member_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/groups").await?;

    state
        .admin_service
        .add_group_member(&identity, group_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_member_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((group_id, user_id)): Path<(GroupId, UserId)>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &identity, "/admin/groups").await?;

    state
        .admin_service
        .remove_group_member(&identity, group_id, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
