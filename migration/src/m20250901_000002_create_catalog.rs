use crate::{flag, id_column, json_list, timestamp_now};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveIden)]
enum Colleges {
    Table,
    Id,
    Name,
    Code,
    Email,
    Phone,
    Address,
    Website,
    Desc,
    Map,
    Category,
    Status,
    Facilities,
    Services,
    CountryId,
    CourseIds,
    Image,
    ImagePublicId,
    Visible,
    IsDeleted,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    ShortDescription,
    FullDescription,
    Duration,
    Category,
    Mode,
    Fees,
    Image,
    ImagePublicId,
    Syllabus,
    Prerequisites,
    Tags,
    Visible,
    IsDeleted,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Intakes {
    Table,
    Id,
    CollegeId,
    IntakeMonth,
    IntakeYear,
    DeadlineDate,
    Status,
    Visible,
    CreatedBy,
    UpdatedBy,
    DeletedBy,
    DeletedAt,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Certificates {
    Table,
    Id,
    Title,
    Reference,
    CountryId,
    Description,
    IssueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    JobId,
    Title,
    Description,
    Company,
    Location,
    CountryId,
    CertificateId,
    Salary,
    JobType,
    Experience,
    Skills,
    PostedBy,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Packages {
    Table,
    Id,
    PackId,
    Title,
    Description,
    Rate,
    Type,
    Points,
    Status,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
    CouponTitle,
    Code,
    Discount,
    EndDate,
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
                    .table(Colleges::Table)
                    .if_not_exists()
                    .col(&mut id_column(Colleges::Id))
                    .col(ColumnDef::new(Colleges::Name).string().not_null())
                    .col(ColumnDef::new(Colleges::Code).string().not_null())
                    .col(ColumnDef::new(Colleges::Email).string())
                    .col(ColumnDef::new(Colleges::Phone).string())
                    .col(ColumnDef::new(Colleges::Address).text())
                    .col(ColumnDef::new(Colleges::Website).string())
                    .col(ColumnDef::new(Colleges::Desc).text())
                    .col(ColumnDef::new(Colleges::Map).text())
                    .col(ColumnDef::new(Colleges::Category).string().not_null())
                    .col(
                        ColumnDef::new(Colleges::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(&mut json_list(Colleges::Facilities))
                    .col(&mut json_list(Colleges::Services))
                    .col(ColumnDef::new(Colleges::CountryId).big_integer().not_null())
                    .col(&mut json_list(Colleges::CourseIds))
                    .col(ColumnDef::new(Colleges::Image).string())
                    .col(ColumnDef::new(Colleges::ImagePublicId).string())
                    .col(&mut flag(Colleges::Visible, true))
                    .col(&mut flag(Colleges::IsDeleted, false))
                    .col(ColumnDef::new(Colleges::CreatedBy).big_integer())
                    .col(ColumnDef::new(Colleges::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Colleges::CreatedAt))
                    .col(&mut timestamp_now(Colleges::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // code 仅在未删除的学院中唯一
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_colleges_code_live \
                 ON colleges (code) WHERE is_deleted = false",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(&mut id_column(Courses::Id))
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::ShortDescription).string_len(300).not_null())
                    .col(ColumnDef::new(Courses::FullDescription).text().not_null())
                    .col(ColumnDef::new(Courses::Duration).string().not_null())
                    .col(ColumnDef::new(Courses::Category).string().not_null())
                    .col(ColumnDef::new(Courses::Mode).string().not_null())
                    .col(ColumnDef::new(Courses::Fees).double().not_null().default(0.0))
                    .col(ColumnDef::new(Courses::Image).string())
                    .col(ColumnDef::new(Courses::ImagePublicId).string())
                    .col(&mut json_list(Courses::Syllabus))
                    .col(&mut json_list(Courses::Prerequisites))
                    .col(&mut json_list(Courses::Tags))
                    .col(&mut flag(Courses::Visible, true))
                    .col(&mut flag(Courses::IsDeleted, false))
                    .col(ColumnDef::new(Courses::CreatedBy).big_integer())
                    .col(ColumnDef::new(Courses::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Courses::CreatedAt))
                    .col(&mut timestamp_now(Courses::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Intakes::Table)
                    .if_not_exists()
                    .col(&mut id_column(Intakes::Id))
                    .col(ColumnDef::new(Intakes::CollegeId).big_integer().not_null())
                    .col(ColumnDef::new(Intakes::IntakeMonth).string().not_null())
                    .col(ColumnDef::new(Intakes::IntakeYear).integer().not_null())
                    .col(
                        ColumnDef::new(Intakes::DeadlineDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Intakes::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(&mut flag(Intakes::Visible, true))
                    .col(ColumnDef::new(Intakes::CreatedBy).big_integer())
                    .col(ColumnDef::new(Intakes::UpdatedBy).big_integer())
                    .col(ColumnDef::new(Intakes::DeletedBy).big_integer())
                    .col(ColumnDef::new(Intakes::DeletedAt).timestamp_with_time_zone())
                    .col(&mut flag(Intakes::IsDeleted, false))
                    .col(&mut timestamp_now(Intakes::CreatedAt))
                    .col(&mut timestamp_now(Intakes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_intakes_status_deadline")
                    .table(Intakes::Table)
                    .col(Intakes::Status)
                    .col(Intakes::DeadlineDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(&mut id_column(Certificates::Id))
                    .col(ColumnDef::new(Certificates::Title).string().not_null())
                    .col(ColumnDef::new(Certificates::Reference).string().not_null())
                    .col(ColumnDef::new(Certificates::CountryId).big_integer().not_null())
                    .col(ColumnDef::new(Certificates::Description).text().not_null())
                    .col(ColumnDef::new(Certificates::IssueDate).timestamp_with_time_zone())
                    .col(&mut timestamp_now(Certificates::CreatedAt))
                    .col(&mut timestamp_now(Certificates::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_certificates_reference_unique")
                    .table(Certificates::Table)
                    .col(Certificates::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(&mut id_column(Jobs::Id))
                    .col(ColumnDef::new(Jobs::JobId).string().not_null())
                    .col(ColumnDef::new(Jobs::Title).string().not_null())
                    .col(ColumnDef::new(Jobs::Description).text().not_null())
                    .col(ColumnDef::new(Jobs::Company).string().not_null())
                    .col(ColumnDef::new(Jobs::Location).string().not_null())
                    .col(ColumnDef::new(Jobs::CountryId).big_integer().not_null())
                    .col(ColumnDef::new(Jobs::CertificateId).big_integer().not_null())
                    .col(ColumnDef::new(Jobs::Salary).double())
                    .col(ColumnDef::new(Jobs::JobType).string().not_null())
                    .col(ColumnDef::new(Jobs::Experience).string())
                    .col(&mut json_list(Jobs::Skills))
                    .col(ColumnDef::new(Jobs::PostedBy).big_integer())
                    .col(&mut flag(Jobs::IsActive, true))
                    .col(&mut timestamp_now(Jobs::CreatedAt))
                    .col(&mut timestamp_now(Jobs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_jobs_job_id_unique")
                    .table(Jobs::Table)
                    .col(Jobs::JobId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // (title, certificate) 仅在在招职位中唯一
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_jobs_title_certificate_active \
                 ON jobs (title, certificate_id) WHERE is_active = true",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Packages::Table)
                    .if_not_exists()
                    .col(&mut id_column(Packages::Id))
                    .col(ColumnDef::new(Packages::PackId).string().not_null())
                    .col(ColumnDef::new(Packages::Title).string().not_null())
                    .col(ColumnDef::new(Packages::Description).text())
                    .col(ColumnDef::new(Packages::Rate).double().not_null())
                    .col(ColumnDef::new(Packages::Type).string().not_null())
                    .col(&mut json_list(Packages::Points))
                    .col(
                        ColumnDef::new(Packages::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(&mut flag(Packages::IsActive, true))
                    .col(&mut timestamp_now(Packages::CreatedAt))
                    .col(&mut timestamp_now(Packages::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_packages_pack_id_unique")
                    .table(Packages::Table)
                    .col(Packages::PackId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(&mut id_column(Coupons::Id))
                    .col(ColumnDef::new(Coupons::CouponTitle).string().not_null())
                    .col(ColumnDef::new(Coupons::Code).string().not_null())
                    .col(ColumnDef::new(Coupons::Discount).double().not_null())
                    .col(
                        ColumnDef::new(Coupons::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Coupons::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(&mut timestamp_now(Coupons::CreatedAt))
                    .col(&mut timestamp_now(Coupons::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_coupons_code_unique")
                    .table(Coupons::Table)
                    .col(Coupons::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Packages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Intakes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Colleges::Table).to_owned())
            .await
    }
}
