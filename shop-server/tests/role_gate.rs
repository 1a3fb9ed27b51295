//! Role Directory and authorization gate

mod common;

use common::*;
use shared::error::ErrorCode;
use shared::models::Role;
use shop_server::services::roles;

async fn role_rows(pool: &sqlx::SqlitePool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn unassigned_user_resolves_to_default_role() {
    let t = setup().await;
    let id = user(&t.pool, "plain@example.com").await;

    assert_eq!(roles::get_role(&t.pool, id).await.unwrap(), Role::User);

    let info = roles::get_user_role(&t.pool, id).await.unwrap();
    assert_eq!(info.role, Role::User);
    assert!(!info.assigned);
}

#[tokio::test]
async fn assign_requires_super_admin() {
    let t = setup().await;
    let seller = staff(&t.pool, "seller@example.com", Role::Seller).await;
    let target = user(&t.pool, "target@example.com").await;

    assert_eq!(
        code(roles::assign_role(&t.pool, &seller, target, "seller").await),
        ErrorCode::SuperAdminRequired
    );
    assert_eq!(role_rows(&t.pool, target).await, 0);
}

#[tokio::test]
async fn assign_replaces_prior_role_with_a_single_row() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let target = user(&t.pool, "target@example.com").await;

    let assigned = roles::assign_role(&t.pool, &admin, target, "seller").await.unwrap();
    assert_eq!(assigned.role, Role::Seller);
    assert!(assigned.assigned);
    assert_eq!(roles::get_role(&t.pool, target).await.unwrap(), Role::Seller);

    roles::assign_role(&t.pool, &admin, target, "super_admin").await.unwrap();
    assert_eq!(roles::get_role(&t.pool, target).await.unwrap(), Role::SuperAdmin);
    assert_eq!(role_rows(&t.pool, target).await, 1);
}

#[tokio::test]
async fn assign_rejects_duplicates_and_bad_input() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let target = user(&t.pool, "target@example.com").await;

    roles::assign_role(&t.pool, &admin, target, "seller").await.unwrap();
    assert_eq!(
        code(roles::assign_role(&t.pool, &admin, target, "seller").await),
        ErrorCode::RoleAlreadyAssigned
    );
    assert_eq!(
        code(roles::assign_role(&t.pool, &admin, target, "owner").await),
        ErrorCode::InvalidRequest
    );
    assert_eq!(
        code(roles::assign_role(&t.pool, &admin, 9999, "seller").await),
        ErrorCode::UserNotFound
    );
    assert_eq!(roles::get_role(&t.pool, target).await.unwrap(), Role::Seller);
}

#[tokio::test]
async fn removing_own_role_always_fails() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let seller = staff(&t.pool, "seller@example.com", Role::Seller).await;

    assert_eq!(
        code(roles::remove_role(&t.pool, &admin, admin.user_id).await),
        ErrorCode::CannotRemoveOwnRole
    );
    assert!(roles::remove_role(&t.pool, &seller, seller.user_id).await.is_err());

    assert_eq!(
        roles::get_role(&t.pool, admin.user_id).await.unwrap(),
        Role::SuperAdmin
    );
    assert_eq!(
        roles::get_role(&t.pool, seller.user_id).await.unwrap(),
        Role::Seller
    );
}

#[tokio::test]
async fn remove_role_falls_back_to_default() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let seller = staff(&t.pool, "seller@example.com", Role::Seller).await;
    let plain = user(&t.pool, "plain@example.com").await;

    let removed = roles::remove_role(&t.pool, &admin, seller.user_id).await.unwrap();
    assert!(!removed.assigned);
    assert_eq!(
        roles::get_role(&t.pool, seller.user_id).await.unwrap(),
        Role::User
    );

    assert_eq!(
        code(roles::remove_role(&t.pool, &admin, plain).await),
        ErrorCode::NoRoleToRemove
    );
    assert_eq!(
        code(roles::remove_role(&t.pool, &admin, 9999).await),
        ErrorCode::UserNotFound
    );
}

#[tokio::test]
async fn directory_listings() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let seller = staff(&t.pool, "seller@example.com", Role::Seller).await;
    let plain = user(&t.pool, "plain@example.com").await;

    let all_roles = roles::list_roles(&t.pool).await.unwrap();
    let names: Vec<&str> = all_roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["user", "seller", "super_admin"]);

    let sellers = roles::users_by_role(&t.pool, "seller").await.unwrap();
    assert_eq!(sellers.len(), 1);
    assert_eq!(sellers[0].id, seller.user_id);

    let regular = roles::users_by_role(&t.pool, "user").await.unwrap();
    assert_eq!(regular.len(), 1);
    assert_eq!(regular[0].id, plain);

    assert_eq!(
        code(roles::users_by_role(&t.pool, "root").await),
        ErrorCode::InvalidRequest
    );

    let everyone = roles::users_with_roles(&t.pool).await.unwrap();
    assert_eq!(everyone.len(), 3);
    let admin_row = everyone.iter().find(|u| u.id == admin.user_id).unwrap();
    assert_eq!(admin_row.role, Role::SuperAdmin);
    let plain_row = everyone.iter().find(|u| u.id == plain).unwrap();
    assert_eq!(plain_row.role, Role::User);
}
