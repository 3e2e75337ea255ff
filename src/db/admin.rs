//! Admin account repository.

use chrono::Utc;
use sea_orm::*;

use super::contains_ci;
use crate::entities::sea_orm_active_enums::Role;
use crate::entities::{admins, prelude::*};

/// Fields for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Changes to apply to an account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AdminChanges {
    pub name: Option<Option<String>>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Find an account by email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<admins::Model>, DbErr> {
    Admins::find()
        .filter(admins::Column::Email.eq(email))
        .one(db)
        .await
}

/// Get account by ID.
pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<admins::Model>, DbErr> {
    Admins::find_by_id(id).one(db).await
}

/// Whether any account exists. Bootstrap is only allowed when none does.
pub async fn has_any(db: &DatabaseConnection) -> Result<bool, DbErr> {
    Ok(Admins::find().count(db).await? > 0)
}

/// List accounts newest first, optionally filtered by email or name.
///
/// Returns the page and the total number of matches.
pub async fn list(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
    search: Option<&str>,
) -> Result<(Vec<admins::Model>, u64), DbErr> {
    let mut query = Admins::find();

    if let Some(term) = search {
        query = query.filter(
            Condition::any()
                .add(contains_ci(admins::Column::Email, term))
                .add(contains_ci(admins::Column::Name, term)),
        );
    }

    let total = query.clone().count(db).await?;
    let items = query
        .order_by_desc(admins::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    Ok((items, total))
}

/// Create a new account. `actor_id` is `None` for bootstrap and seeding.
pub async fn create(db: &DatabaseConnection, data: NewAdmin, actor_id: Option<i32>) -> Result<admins::Model, DbErr> {
    let now = Utc::now();
    let model = admins::ActiveModel {
        name: Set(data.name),
        email: Set(data.email),
        password_hash: Set(data.password_hash),
        role: Set(data.role),
        created_at: Set(now),
        updated_at: Set(now),
        last_active_at: Set(None),
        created_by_id: Set(actor_id),
        updated_by_id: Set(actor_id),
        ..Default::default()
    };
    model.insert(db).await
}

/// Apply changes to an existing account.
pub async fn update(
    db: &DatabaseConnection,
    existing: admins::Model,
    changes: AdminChanges,
    actor_id: i32,
) -> Result<admins::Model, DbErr> {
    let mut active: admins::ActiveModel = existing.into();

    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
    }
    if let Some(password_hash) = changes.password_hash {
        active.password_hash = Set(password_hash);
    }
    if let Some(role) = changes.role {
        active.role = Set(role);
    }
    active.updated_by_id = Set(Some(actor_id));
    active.updated_at = Set(Utc::now());

    active.update(db).await
}

/// Record activity on login and session refresh.
pub async fn touch_last_active(db: &DatabaseConnection, existing: admins::Model) -> Result<admins::Model, DbErr> {
    let mut active: admins::ActiveModel = existing.into();
    active.last_active_at = Set(Some(Utc::now()));
    active.update(db).await
}

/// Delete an account by ID.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Admins::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;

    fn new_admin(email: &str, name: Option<&str>, role: Role) -> NewAdmin {
        NewAdmin {
            name: name.map(str::to_string),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = memory_db().await;
        assert!(!has_any(&db).await.unwrap());

        let created = create(&db, new_admin("root@hrms.com", Some("Root"), Role::Admin), None)
            .await
            .unwrap();
        assert_eq!(created.created_by_id, None);
        assert!(has_any(&db).await.unwrap());

        let found = find_by_email(&db, "root@hrms.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = memory_db().await;
        create(&db, new_admin("dup@hrms.com", None, Role::Admin), None).await.unwrap();
        let err = create(&db, new_admin("dup@hrms.com", None, Role::Manager), None)
            .await
            .unwrap_err();
        assert!(matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_list_search_and_order() {
        let db = memory_db().await;
        let root = create(&db, new_admin("root@hrms.com", Some("Root"), Role::Admin), None)
            .await
            .unwrap();
        create(&db, new_admin("mia@hrms.com", Some("Mia Lopez"), Role::Manager), Some(root.id))
            .await
            .unwrap();
        create(&db, new_admin("li@hrms.com", None, Role::Manager), Some(root.id))
            .await
            .unwrap();

        let (items, total) = list(&db, 20, 0, None).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items[0].email, "li@hrms.com");

        let (items, total) = list(&db, 20, 0, Some("LOPEZ")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].email, "mia@hrms.com");

        let (items, total) = list(&db, 1, 1, None).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].email, "mia@hrms.com");
    }

    #[tokio::test]
    async fn test_update_sets_audit_fields() {
        let db = memory_db().await;
        let root = create(&db, new_admin("root@hrms.com", Some("Root"), Role::Admin), None)
            .await
            .unwrap();
        let other = create(&db, new_admin("m@hrms.com", Some("M"), Role::Manager), Some(root.id))
            .await
            .unwrap();

        let changes = AdminChanges {
            name: Some(None),
            role: Some(Role::Admin),
            ..Default::default()
        };
        let updated = update(&db, other, changes, root.id).await.unwrap();
        assert_eq!(updated.name, None);
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.updated_by_id, Some(root.id));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = memory_db().await;
        let admin = create(&db, new_admin("x@hrms.com", None, Role::Admin), None)
            .await
            .unwrap();
        assert!(delete(&db, admin.id).await.unwrap());
        assert!(!delete(&db, admin.id).await.unwrap());
    }
}
