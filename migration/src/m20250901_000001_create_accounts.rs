use crate::{flag, id_column, json_list, timestamp_now};
use sea_orm_migration::prelude::*;

/// 顺序编号计数器 (candidate / job / package / enquiry)
#[derive(DeriveIden)]
enum IdSequences {
    Table,
    Name,
    Value,
}

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Name,
    Code,
    IsoCode,
    DialCode,
    Currency,
    Image,
    ImagePublicId,
    IsDomestic,
    IsDefault,
    IsDeleted,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Fname,
    Lname,
    Email,
    Mobile,
    Password,
    Image,
    ImagePublicId,
    UserType,
    Status,
    Country,
    CurrencyCode,
    IsDeleted,
    LastLogin,
    Otp,
    OtpExpires,
    ResetOtp,
    ResetOtpExpires,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Candidates {
    Table,
    Id,
    CanId,
    Email,
    Mobile,
    Password,
    Otp,
    OtpExpires,
    ResetOtp,
    ResetOtpExpires,
    FirstName,
    LastName,
    Gender,
    Dob,
    Image,
    ImagePublicId,
    IdentityType,
    IdentityNumber,
    AddressLine1,
    AddressLine2,
    Landmark,
    City,
    District,
    State,
    ZipCode,
    CountryId,
    GuardianName,
    GuardianRelation,
    GuardianMobile,
    GuardianOccupation,
    EducationDetails,
    HighestQualification,
    University,
    PassingYear,
    PreferredJobId,
    PackageId,
    Status,
    IsDeleted,
    LastLogin,
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
                    .table(IdSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdSequences::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdSequences::Value)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(&mut id_column(Countries::Id))
                    .col(ColumnDef::new(Countries::Name).string().not_null())
                    .col(ColumnDef::new(Countries::Code).string_len(3).not_null())
                    .col(ColumnDef::new(Countries::IsoCode).string_len(3).not_null())
                    .col(ColumnDef::new(Countries::DialCode).string().not_null())
                    .col(ColumnDef::new(Countries::Currency).string().not_null())
                    .col(ColumnDef::new(Countries::Image).string())
                    .col(ColumnDef::new(Countries::ImagePublicId).string())
                    .col(&mut flag(Countries::IsDomestic, false))
                    .col(&mut flag(Countries::IsDefault, false))
                    .col(&mut flag(Countries::IsDeleted, false))
                    .col(ColumnDef::new(Countries::CreatedBy).big_integer())
                    .col(ColumnDef::new(Countries::UpdatedBy).big_integer())
                    .col(&mut timestamp_now(Countries::CreatedAt))
                    .col(&mut timestamp_now(Countries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_countries_code_unique", Countries::Code),
            ("idx_countries_iso_code_unique", Countries::IsoCode),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Countries::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_column(Users::Id))
                    .col(ColumnDef::new(Users::Fname).string())
                    .col(ColumnDef::new(Users::Lname).string())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Mobile).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Image).string().not_null())
                    .col(ColumnDef::new(Users::ImagePublicId).string())
                    .col(ColumnDef::new(Users::UserType).string().not_null())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Users::Country).string())
                    .col(ColumnDef::new(Users::CurrencyCode).string())
                    .col(&mut flag(Users::IsDeleted, false))
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::Otp).string())
                    .col(ColumnDef::new(Users::OtpExpires).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::ResetOtp).string())
                    .col(ColumnDef::new(Users::ResetOtpExpires).timestamp_with_time_zone())
                    .col(&mut timestamp_now(Users::CreatedAt))
                    .col(&mut timestamp_now(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_users_email_unique", Users::Email),
            ("idx_users_mobile_unique", Users::Mobile),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Users::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Candidates::Table)
                    .if_not_exists()
                    .col(&mut id_column(Candidates::Id))
                    .col(ColumnDef::new(Candidates::CanId).string().not_null())
                    .col(ColumnDef::new(Candidates::Email).string().not_null())
                    .col(ColumnDef::new(Candidates::Mobile).string().not_null())
                    .col(ColumnDef::new(Candidates::Password).string().not_null())
                    .col(ColumnDef::new(Candidates::Otp).string())
                    .col(ColumnDef::new(Candidates::OtpExpires).timestamp_with_time_zone())
                    .col(ColumnDef::new(Candidates::ResetOtp).string())
                    .col(ColumnDef::new(Candidates::ResetOtpExpires).timestamp_with_time_zone())
                    .col(ColumnDef::new(Candidates::FirstName).string())
                    .col(ColumnDef::new(Candidates::LastName).string())
                    .col(ColumnDef::new(Candidates::Gender).string())
                    .col(ColumnDef::new(Candidates::Dob).string().not_null())
                    .col(ColumnDef::new(Candidates::Image).string().not_null())
                    .col(ColumnDef::new(Candidates::ImagePublicId).string())
                    .col(ColumnDef::new(Candidates::IdentityType).string())
                    .col(ColumnDef::new(Candidates::IdentityNumber).string())
                    .col(ColumnDef::new(Candidates::AddressLine1).string())
                    .col(ColumnDef::new(Candidates::AddressLine2).string())
                    .col(ColumnDef::new(Candidates::Landmark).string())
                    .col(ColumnDef::new(Candidates::City).string())
                    .col(ColumnDef::new(Candidates::District).string())
                    .col(ColumnDef::new(Candidates::State).string())
                    .col(ColumnDef::new(Candidates::ZipCode).string())
                    .col(ColumnDef::new(Candidates::CountryId).big_integer().not_null())
                    .col(ColumnDef::new(Candidates::GuardianName).string())
                    .col(ColumnDef::new(Candidates::GuardianRelation).string())
                    .col(ColumnDef::new(Candidates::GuardianMobile).string())
                    .col(ColumnDef::new(Candidates::GuardianOccupation).string())
                    .col(&mut json_list(Candidates::EducationDetails))
                    .col(ColumnDef::new(Candidates::HighestQualification).string())
                    .col(ColumnDef::new(Candidates::University).string())
                    .col(ColumnDef::new(Candidates::PassingYear).string())
                    .col(ColumnDef::new(Candidates::PreferredJobId).big_integer())
                    .col(ColumnDef::new(Candidates::PackageId).big_integer())
                    .col(
                        ColumnDef::new(Candidates::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(&mut flag(Candidates::IsDeleted, false))
                    .col(ColumnDef::new(Candidates::LastLogin).timestamp_with_time_zone())
                    .col(&mut timestamp_now(Candidates::CreatedAt))
                    .col(&mut timestamp_now(Candidates::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_candidates_can_id_unique", Candidates::CanId),
            ("idx_candidates_email_unique", Candidates::Email),
            ("idx_candidates_mobile_unique", Candidates::Mobile),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Candidates::Table)
                        .col(col)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Candidates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Countries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdSequences::Table).to_owned())
            .await
    }
}
