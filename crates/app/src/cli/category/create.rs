use bookstore_app::domain::{
    categories::{
        CategoriesService, PgCategoriesService, data::NewCategory, records::CategoryUuid,
    },
    users::{
        PgUsersService, UsersService,
        records::{Actor, UserUuid},
    },
};
use clap::Args;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateCategoryArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Admin user the category is created as
    #[arg(long, env = "BOOKSTORE_ADMIN_UUID")]
    admin_uuid: Uuid,

    /// Unique category name
    #[arg(long)]
    name: String,
}

pub(crate) async fn run(args: CreateCategoryArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    let admin = PgUsersService::new(db.clone())
        .get_user(UserUuid::from_uuid(args.admin_uuid))
        .await
        .map_err(|error| format!("failed to load admin user: {error}"))?;

    let category = PgCategoriesService::new(db)
        .create_category(
            Actor::new(admin.uuid, admin.role),
            NewCategory {
                uuid: CategoryUuid::new(),
                name: args.name,
            },
        )
        .await
        .map_err(|error| format!("failed to create category: {error}"))?;

    println!("category_uuid: {}", category.uuid);
    println!("category_name: {}", category.name);

    Ok(())
}
