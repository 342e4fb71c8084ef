//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::api::types::{CreateUserRequest, Page, UpdateUserRequest, UserDto};
use crate::db::{NewUser, Store, UserChanges, WriteOutcome};
use crate::domain::access::{Action, Resource, authorize};
use crate::domain::{Actor, validation};
use crate::entities::users;
use crate::services::user_service::{UserError, UserService};

const DUPLICATE_USER: &str = "A user with that username or email already exists";

pub struct SeaOrmUserService {
    store: Store,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find(&self, username: &str) -> Result<users::Model, UserError> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    async fn apply(
        &self,
        user: users::Model,
        changes: UserChanges,
    ) -> Result<UserDto, UserError> {
        match self.store.update_user(user, changes).await? {
            WriteOutcome::Written(user) => Ok(user.into()),
            WriteOutcome::Duplicate => Err(UserError::Validation(DUPLICATE_USER.to_string())),
        }
    }
}

fn validate_changes(request: &UpdateUserRequest) -> Result<(), UserError> {
    if let Some(username) = &request.username {
        validation::username(username).map_err(UserError::Validation)?;
    }
    if let Some(email) = &request.email {
        validation::email(email).map_err(UserError::Validation)?;
    }
    if let Some(first_name) = &request.first_name {
        validation::person_name("first_name", first_name).map_err(UserError::Validation)?;
    }
    if let Some(last_name) = &request.last_name {
        validation::person_name("last_name", last_name).map_err(UserError::Validation)?;
    }
    Ok(())
}

fn into_changes(request: UpdateUserRequest) -> UserChanges {
    UserChanges {
        username: request.username,
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        bio: request.bio,
        role: request.role,
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(
        &self,
        actor: &Actor,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> Result<Page<UserDto>, UserError> {
        authorize(actor, Action::Read, Resource::Account)?;

        let (users, count) = self.store.list_users(search, limit, offset).await?;
        Ok(Page::new(
            users.into_iter().map(UserDto::from).collect(),
            count,
        ))
    }

    async fn create(&self, actor: &Actor, request: CreateUserRequest) -> Result<UserDto, UserError> {
        authorize(actor, Action::Create, Resource::Account)?;

        validation::username(&request.username).map_err(UserError::Validation)?;
        validation::email(&request.email).map_err(UserError::Validation)?;
        validation::person_name("first_name", &request.first_name)
            .map_err(UserError::Validation)?;
        validation::person_name("last_name", &request.last_name).map_err(UserError::Validation)?;

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            bio: request.bio,
            role: request.role.unwrap_or_default(),
            is_superuser: false,
        };

        match self.store.create_user(new_user).await? {
            WriteOutcome::Written(user) => {
                info!(event = "user_created", user_id = user.id, actor_id = ?actor.user_id(), "User created by admin");
                Ok(user.into())
            }
            WriteOutcome::Duplicate => Err(UserError::Validation(DUPLICATE_USER.to_string())),
        }
    }

    async fn get(&self, actor: &Actor, username: &str) -> Result<UserDto, UserError> {
        authorize(actor, Action::Read, Resource::Account)?;
        Ok(self.find(username).await?.into())
    }

    async fn update(
        &self,
        actor: &Actor,
        username: &str,
        request: UpdateUserRequest,
    ) -> Result<UserDto, UserError> {
        authorize(actor, Action::Update, Resource::Account)?;
        validate_changes(&request)?;

        let user = self.find(username).await?;
        self.apply(user, into_changes(request)).await
    }

    async fn delete(&self, actor: &Actor, username: &str) -> Result<(), UserError> {
        authorize(actor, Action::Delete, Resource::Account)?;

        let user = self.find(username).await?;
        if !self.store.delete_user(user.id).await? {
            return Err(UserError::NotFound(username.to_string()));
        }

        info!(event = "user_deleted", user_id = user.id, actor_id = ?actor.user_id(), "User deleted");
        Ok(())
    }

    async fn me(&self, actor: &Actor) -> Result<UserDto, UserError> {
        let id = actor.user_id().ok_or(UserError::Unauthorized)?;
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        Ok(user.into())
    }

    async fn update_me(
        &self,
        actor: &Actor,
        mut request: UpdateUserRequest,
    ) -> Result<UserDto, UserError> {
        let id = actor.user_id().ok_or(UserError::Unauthorized)?;

        if !actor.is_admin() {
            request.role = None;
        }
        validate_changes(&request)?;

        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        self.apply(user, into_changes(request)).await
    }
}
