#![allow(dead_code)]

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use viptask_backend::entities::{
    shop_group_entity as shop_groups, task_entity as tasks, task_product_entity as task_products,
    user_entity as users, vip_level_entity as vip_levels, wheel_prize_entity as wheel_prizes,
    UserRole,
};

/// 内存 SQLite, 单连接保证所有操作看到同一份数据, 跑全量迁移 (含种子)
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts)
        .await
        .expect("failed to open in-memory sqlite");
    Migrator::up(&conn, None)
        .await
        .expect("failed to run migrations");
    conn
}

pub async fn create_user(
    conn: &DatabaseConnection,
    username: &str,
    balance_cents: i64,
) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("$2b$12$test-hash".to_string()),
        role: Set(UserRole::User),
        balance_cents: Set(balance_cents),
        completed_orders: Set(0),
        free_spins: Set(0),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert user")
}

pub async fn create_admin(conn: &DatabaseConnection, username: &str) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("$2b$12$test-hash".to_string()),
        role: Set(UserRole::Admin),
        balance_cents: Set(0),
        completed_orders: Set(0),
        free_spins: Set(0),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert admin")
}

pub async fn set_free_spins(conn: &DatabaseConnection, user_id: i64, spins: i64) {
    let user = users::Entity::find_by_id(user_id)
        .one(conn)
        .await
        .expect("query user")
        .expect("user exists");
    let mut am: users::ActiveModel = user.into();
    am.free_spins = Set(spins);
    am.update(conn).await.expect("update free_spins");
}

/// 迁移种子里的等级 (BRONZE / SILVER / GOLD)
pub async fn vip_level_by_name(conn: &DatabaseConnection, name: &str) -> vip_levels::Model {
    vip_levels::Entity::find()
        .filter(vip_levels::Column::Name.eq(name))
        .one(conn)
        .await
        .expect("query vip level")
        .unwrap_or_else(|| panic!("seeded vip level {name} missing"))
}

pub async fn create_task(
    conn: &DatabaseConnection,
    title: &str,
    required_min_balance_cents: i64,
) -> tasks::Model {
    tasks::ActiveModel {
        title: Set(title.to_string()),
        required_min_balance_cents: Set(required_min_balance_cents),
        is_active: Set(true),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert task")
}

/// 为某个等级建一个商店组并塞入给定价格的商品
pub async fn create_group_with_products(
    conn: &DatabaseConnection,
    vip_level_id: i64,
    prices_cents: &[i64],
) -> Vec<task_products::Model> {
    let group = shop_groups::ActiveModel {
        name: Set(format!("group-for-level-{vip_level_id}")),
        vip_level_id: Set(vip_level_id),
        is_active: Set(true),
        created_at: Set(Some(Utc::now())),
        updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await
    .expect("failed to insert shop group");

    let mut products = Vec::with_capacity(prices_cents.len());
    for (i, price) in prices_cents.iter().enumerate() {
        let product = task_products::ActiveModel {
            shop_group_id: Set(group.id),
            name: Set(format!("product-{i}")),
            base_price_cents: Set(*price),
            stock: Set(100),
            vip_level_id: Set(None),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(conn)
        .await
        .expect("failed to insert task product");
        products.push(product);
    }
    products
}

/// 只保留一个指定名称的奖品启用, 让抽奖结果可断言
pub async fn keep_only_prize(conn: &DatabaseConnection, name: &str) -> wheel_prizes::Model {
    use sea_orm::sea_query::Expr;

    wheel_prizes::Entity::update_many()
        .col_expr(wheel_prizes::Column::IsActive, Expr::value(false))
        .exec(conn)
        .await
        .expect("deactivate prizes");
    wheel_prizes::Entity::update_many()
        .col_expr(wheel_prizes::Column::IsActive, Expr::value(true))
        .filter(wheel_prizes::Column::Name.eq(name))
        .exec(conn)
        .await
        .expect("activate target prize");

    wheel_prizes::Entity::find()
        .filter(wheel_prizes::Column::Name.eq(name))
        .one(conn)
        .await
        .expect("query prize")
        .unwrap_or_else(|| panic!("seeded prize {name} missing"))
}
