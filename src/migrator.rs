use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_articles_table::Migration),
            Box::new(m20240101_000003_create_galleries_table::Migration),
            Box::new(m20240101_000004_create_images_table::Migration),
            Box::new(m20240101_000005_create_links_table::Migration),
            Box::new(m20240101_000006_create_orders_table::Migration),
            Box::new(m20240101_000007_create_products_table::Migration),
            Box::new(m20240101_000008_create_projects_table::Migration),
        ]
    }
}

// Migration implementations
//
// Every designated unique field carries a unique index: the sibling scan in
// the uniqueness gate is advisory, the index is the authoritative backstop
// under concurrent writers.

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Image)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Pass).string().not_null())
                        .col(ColumnDef::new(Users::Role).string_len(25).not_null())
                        .col(ColumnDef::new(Users::Created).timestamp().not_null())
                        .col(ColumnDef::new(Users::Updated).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        Image,
        Pass,
        Role,
        Created,
        Updated,
    }
}

mod m20240101_000002_create_articles_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_articles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Articles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Articles::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Articles::Name)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Articles::Text).text().not_null().unique_key())
                        .col(
                            ColumnDef::new(Articles::Image)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Articles::Alt).string_len(250).not_null())
                        .col(
                            ColumnDef::new(Articles::Likes)
                                .text()
                                .not_null()
                                .default("[]"),
                        )
                        .col(ColumnDef::new(Articles::Cat).string_len(25).not_null())
                        .col(ColumnDef::new(Articles::Created).timestamp().not_null())
                        .col(ColumnDef::new(Articles::Updated).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Articles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Articles {
        Table,
        Id,
        Name,
        Text,
        Image,
        Alt,
        Likes,
        Cat,
        Created,
        Updated,
    }
}

mod m20240101_000003_create_galleries_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_galleries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Galleries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Galleries::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Galleries::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Galleries::Author).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Galleries::Cover)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Galleries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Galleries {
        Table,
        Id,
        Name,
        Author,
        Cover,
    }
}

mod m20240101_000004_create_images_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Images::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Images::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Images::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Images::Description)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Images::GalleryId).integer().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Images::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Images {
        Table,
        Id,
        Name,
        Description,
        GalleryId,
    }
}

mod m20240101_000005_create_links_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_links_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Links::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Links::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Links::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Links::Url)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Links::Cat).string_len(25).not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Links::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Links {
        Table,
        Id,
        Name,
        Url,
        Cat,
    }
}

mod m20240101_000006_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::Products).json().not_null())
                        .col(ColumnDef::new(Orders::Total).decimal().not_null())
                        .col(
                            ColumnDef::new(Orders::PaymentId)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::Status).string_len(10).not_null())
                        .col(ColumnDef::new(Orders::UserId).integer().not_null())
                        .col(ColumnDef::new(Orders::Created).timestamp().not_null())
                        .col(ColumnDef::new(Orders::Updated).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        Products,
        Total,
        PaymentId,
        Status,
        UserId,
        Created,
        Updated,
    }
}

mod m20240101_000007_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Description)
                                .text()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Image)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::Alt).string_len(250).not_null())
                        .col(ColumnDef::new(Products::Price).decimal().not_null())
                        .col(ColumnDef::new(Products::Options).text().not_null())
                        .col(ColumnDef::new(Products::Cat).string_len(25).not_null())
                        .col(ColumnDef::new(Products::Created).timestamp().not_null())
                        .col(ColumnDef::new(Products::Updated).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        Image,
        Alt,
        Price,
        Options,
        Cat,
        Created,
        Updated,
    }
}

mod m20240101_000008_create_projects_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_projects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Projects::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Projects::Name)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Projects::Description)
                                .text()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Projects::Image)
                                .string_len(250)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Projects::Alt).string_len(250).not_null())
                        .col(ColumnDef::new(Projects::Url).string_len(250).null())
                        .col(ColumnDef::new(Projects::Cat).string_len(25).not_null())
                        .col(ColumnDef::new(Projects::Created).timestamp().not_null())
                        .col(ColumnDef::new(Projects::Updated).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Projects {
        Table,
        Id,
        Name,
        Description,
        Image,
        Alt,
        Url,
        Cat,
        Created,
        Updated,
    }
}
