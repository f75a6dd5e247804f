use crate::{flag, id_column, json_list, timestamp_now};
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Blogs {
    Table,
    Id,
    Title,
    ShortDesc,
    FullDesc,
    Image,
    ImagePublicId,
    Link,
    IsVisible,
    IsDeleted,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Galleries {
    Table,
    Id,
    Image,
    ImagePublicId,
    Date,
    Title,
    #[sea_orm(iden = "from")]
    Source,
    Link,
    IsDeleted,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

/// 咨询服务 (offerings)
#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    Title,
    ShortDesc,
    FullDesc,
    Image,
    ImagePublicId,
    Points,
    IsDeleted,
    DeletedAt,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Enquiries {
    Table,
    Id,
    EnqNo,
    FName,
    EnqDescp,
    Email,
    Mobile,
    Location,
    Course,
    School,
    LeadQuality,
    Status,
    ReferenceId,
    Remarks,
    Category,
    CreatedBy,
    UpdatedBy,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contacts {
    Table,
    Id,
    Fullname,
    Mobile,
    Email,
    Subject,
    Message,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(&mut id_column(Blogs::Id))
                    .col(ColumnDef::new(Blogs::Title).string().not_null())
                    .col(ColumnDef::new(Blogs::ShortDesc).text().not_null())
                    .col(ColumnDef::new(Blogs::FullDesc).text().not_null())
                    .col(ColumnDef::new(Blogs::Image).string())
                    .col(ColumnDef::new(Blogs::ImagePublicId).string())
                    .col(ColumnDef::new(Blogs::Link).string().not_null())
                    .col(&mut flag(Blogs::IsVisible, true))
                    .col(&mut flag(Blogs::IsDeleted, false))
                    .col(ColumnDef::new(Blogs::CreatedBy).big_integer())
                    .col(ColumnDef::new(Blogs::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Blogs::CreatedAt))
                    .col(&mut timestamp_now(Blogs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_blogs_link_unique")
                    .table(Blogs::Table)
                    .col(Blogs::Link)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Galleries::Table)
                    .if_not_exists()
                    .col(&mut id_column(Galleries::Id))
                    .col(ColumnDef::new(Galleries::Image).string().not_null())
                    .col(ColumnDef::new(Galleries::ImagePublicId).string())
                    .col(ColumnDef::new(Galleries::Date).timestamp_with_time_zone())
                    .col(ColumnDef::new(Galleries::Title).string())
                    .col(ColumnDef::new(Galleries::Source).string())
                    .col(ColumnDef::new(Galleries::Link).string())
                    .col(&mut flag(Galleries::IsDeleted, false))
                    .col(ColumnDef::new(Galleries::CreatedBy).big_integer())
                    .col(ColumnDef::new(Galleries::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Galleries::CreatedAt))
                    .col(&mut timestamp_now(Galleries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(&mut id_column(Services::Id))
                    .col(ColumnDef::new(Services::Title).string().not_null())
                    .col(ColumnDef::new(Services::ShortDesc).text().not_null())
                    .col(ColumnDef::new(Services::FullDesc).text().not_null())
                    .col(ColumnDef::new(Services::Image).string().not_null())
                    .col(ColumnDef::new(Services::ImagePublicId).string())
                    .col(&mut json_list(Services::Points))
                    .col(&mut flag(Services::IsDeleted, false))
                    .col(ColumnDef::new(Services::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Services::CreatedBy).big_integer())
                    .col(ColumnDef::new(Services::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Services::CreatedAt))
                    .col(&mut timestamp_now(Services::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enquiries::Table)
                    .if_not_exists()
                    .col(&mut id_column(Enquiries::Id))
                    .col(ColumnDef::new(Enquiries::EnqNo).string().not_null())
                    .col(ColumnDef::new(Enquiries::FName).string().not_null())
                    .col(ColumnDef::new(Enquiries::EnqDescp).text().not_null())
                    .col(ColumnDef::new(Enquiries::Email).string().not_null())
                    .col(ColumnDef::new(Enquiries::Mobile).string().not_null())
                    .col(ColumnDef::new(Enquiries::Location).string().not_null())
                    .col(ColumnDef::new(Enquiries::Course).string().not_null())
                    .col(ColumnDef::new(Enquiries::School).string().not_null())
                    .col(ColumnDef::new(Enquiries::LeadQuality).string())
                    .col(
                        ColumnDef::new(Enquiries::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Enquiries::ReferenceId).string())
                    .col(ColumnDef::new(Enquiries::Remarks).text())
                    .col(ColumnDef::new(Enquiries::Category).string())
                    .col(ColumnDef::new(Enquiries::CreatedBy).big_integer())
                    .col(ColumnDef::new(Enquiries::UpdatedBy).big_integer())
                    .col(&mut flag(Enquiries::IsDeleted, false))
                    .col(&mut timestamp_now(Enquiries::CreatedAt))
                    .col(&mut timestamp_now(Enquiries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_enquiries_enq_no_unique", Enquiries::EnqNo),
            ("idx_enquiries_email_unique", Enquiries::Email),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Enquiries::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(&mut id_column(Contacts::Id))
                    .col(ColumnDef::new(Contacts::Fullname).string().not_null())
                    .col(ColumnDef::new(Contacts::Mobile).string().not_null())
                    .col(ColumnDef::new(Contacts::Email).string().not_null())
                    .col(ColumnDef::new(Contacts::Subject).string().not_null())
                    .col(ColumnDef::new(Contacts::Message).text().not_null())
                    .col(
                        ColumnDef::new(Contacts::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(&mut timestamp_now(Contacts::CreatedAt))
                    .col(&mut timestamp_now(Contacts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enquiries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Galleries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Blogs::Table).to_owned())
            .await
    }
}
