use crate::entities::country_entity as countries;
use crate::error::{AppError, AppResult};
use crate::external::{FileStorage, UploadedFile};
use crate::models::{Country, CountryRequest, PaginatedResponse, PaginationParams, is_home_country};
use crate::services::listing::fetch_list;
use crate::utils::require;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

const IMAGE_FOLDER: &str = "country";

pub struct CountryService {
    pool: DatabaseConnection,
    storage: Arc<dyn FileStorage>,
}

fn normalize_code(raw: &str, field: &str, lengths: std::ops::RangeInclusive<usize>) -> AppResult<String> {
    let code = raw.trim().to_uppercase();
    if !lengths.contains(&code.chars().count()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::ValidationError(format!(
            "{field} must be {} to {} letters",
            lengths.start(),
            lengths.end()
        )));
    }
    Ok(code)
}

impl CountryService {
    pub fn new(pool: DatabaseConnection, storage: Arc<dyn FileStorage>) -> Self {
        Self { pool, storage }
    }

    async fn find_live(&self, id: i64) -> AppResult<countries::Model> {
        countries::Entity::find_by_id(id)
            .filter(countries::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Country not found".to_string()))
    }

    async fn ensure_unique(&self, code: Option<&str>, iso_code: Option<&str>, except: Option<i64>) -> AppResult<()> {
        if code.is_none() && iso_code.is_none() {
            return Ok(());
        }
        let mut clash = Condition::any();
        if let Some(code) = code {
            clash = clash.add(countries::Column::Code.eq(code));
        }
        if let Some(iso_code) = iso_code {
            clash = clash.add(countries::Column::IsoCode.eq(iso_code));
        }
        let mut query = countries::Entity::find().filter(clash);
        if let Some(id) = except {
            query = query.filter(countries::Column::Id.ne(id));
        }
        if query.one(&self.pool).await?.is_some() {
            return Err(AppError::Duplicate(
                "Country with this code or ISO code already exists".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        req: CountryRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Country> {
        let name = require(req.name.as_deref(), "name")?.to_string();
        let code = normalize_code(require(req.code.as_deref(), "code")?, "code", 2..=3)?;
        let iso_code = normalize_code(require(req.iso_code.as_deref(), "isoCode")?, "isoCode", 3..=3)?;
        let dial_code = require(req.dial_code.as_deref(), "dialCode")?.to_string();
        let currency = require(req.currency.as_deref(), "currency")?.to_uppercase();
        if let Some(file) = &image {
            file.validate_image()?;
        }

        self.ensure_unique(Some(&code), Some(&iso_code), None).await?;

        let home = is_home_country(&name);
        let stored = match &image {
            Some(file) => Some(self.storage.store(IMAGE_FOLDER, file).await?),
            None => None,
        };

        let now = Utc::now();
        let model = countries::ActiveModel {
            name: Set(name),
            code: Set(code),
            iso_code: Set(iso_code),
            dial_code: Set(dial_code),
            currency: Set(currency),
            image: Set(stored.as_ref().map(|s| s.url.clone())),
            image_public_id: Set(stored.map(|s| s.asset_id)),
            is_domestic: Set(home || req.is_domestic.unwrap_or(false)),
            is_default: Set(home || req.is_default.unwrap_or(false)),
            is_deleted: Set(false),
            created_by: Set(Some(actor)),
            updated_by: Set(Some(actor)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Country {} ({}) created", model.name, model.code);
        Ok(model)
    }

    /// Inserts India at startup when no live row for it exists.
    pub async fn ensure_home_country(&self) -> AppResult<()> {
        let exists = countries::Entity::find()
            .filter(countries::Column::Name.eq("India"))
            .filter(countries::Column::IsDeleted.eq(false))
            .one(&self.pool)
            .await?;
        if exists.is_some() {
            log::info!("Default country India already exists");
            return Ok(());
        }

        let now = Utc::now();
        countries::ActiveModel {
            name: Set("India".to_string()),
            code: Set("IN".to_string()),
            iso_code: Set("IND".to_string()),
            dial_code: Set("+91".to_string()),
            currency: Set("INR".to_string()),
            image: Set(Some("/public/default/India.png".to_string())),
            image_public_id: Set(None),
            is_domestic: Set(true),
            is_default: Set(true),
            is_deleted: Set(false),
            created_by: Set(None),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        log::info!("Default country India inserted");
        Ok(())
    }

    pub async fn list(&self, params: &PaginationParams) -> AppResult<PaginatedResponse<Country>> {
        let select = countries::Entity::find()
            .filter(countries::Column::IsDeleted.eq(false))
            .order_by_asc(countries::Column::Name);
        fetch_list(&self.pool, select, params, None).await
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(countries::Entity::find()
            .filter(countries::Column::IsDeleted.eq(false))
            .count(&self.pool)
            .await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Country> {
        self.find_live(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        req: CountryRequest,
        image: Option<UploadedFile>,
        actor: i64,
    ) -> AppResult<Country> {
        let country = self.find_live(id).await?;

        let code = req
            .code
            .as_deref()
            .map(|c| normalize_code(c, "code", 2..=3))
            .transpose()?;
        let iso_code = req
            .iso_code
            .as_deref()
            .map(|c| normalize_code(c, "isoCode", 3..=3))
            .transpose()?;
        self.ensure_unique(code.as_deref(), iso_code.as_deref(), Some(id))
            .await?;

        let name = req
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let home = is_home_country(name.as_deref().unwrap_or(&country.name));
        let old_asset = country.image_public_id.clone();

        let mut am = country.into_active_model();
        if let Some(v) = name {
            am.name = Set(v);
        }
        if let Some(v) = code {
            am.code = Set(v);
        }
        if let Some(v) = iso_code {
            am.iso_code = Set(v);
        }
        if let Some(v) = req.dial_code {
            am.dial_code = Set(v.trim().to_string());
        }
        if let Some(v) = req.currency {
            am.currency = Set(v.trim().to_uppercase());
        }
        if let Some(v) = req.is_domestic {
            am.is_domestic = Set(v);
        }
        if let Some(v) = req.is_default {
            am.is_default = Set(v);
        }
        if home {
            am.is_domestic = Set(true);
            am.is_default = Set(true);
        }

        let mut replaced = false;
        if let Some(file) = &image {
            file.validate_image()?;
            let stored = self.storage.store(IMAGE_FOLDER, file).await?;
            am.image = Set(Some(stored.url));
            am.image_public_id = Set(Some(stored.asset_id));
            replaced = true;
        }
        am.updated_by = Set(Some(actor));
        am.updated_at = Set(Utc::now());
        let country = am.update(&self.pool).await?;

        if replaced {
            self.storage.discard(old_asset.as_deref()).await;
        }
        Ok(country)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let country = countries::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Country not found".to_string()))?;

        if is_home_country(&country.name) {
            log::warn!("Refused to delete the default country {}", id);
            return Err(AppError::ValidationError("Cannot delete India".to_string()));
        }

        let asset = country.image_public_id.clone();
        country.delete(&self.pool).await?;
        self.storage.discard(asset.as_deref()).await;
        log::info!("Country {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::external::LocalDiskStorage;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn country(id: i64, name: &str, code: &str) -> countries::Model {
        let now = Utc::now();
        countries::Model {
            id,
            name: name.into(),
            code: code.into(),
            iso_code: format!("{code}X"),
            dial_code: "+1".into(),
            currency: "USD".into(),
            image: None,
            image_public_id: None,
            is_domestic: false,
            is_default: false,
            is_deleted: false,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DatabaseConnection) -> CountryService {
        CountryService::new(db, Arc::new(LocalDiskStorage::new(&StorageConfig::default())))
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" in ", "code", 2..=3).unwrap(), "IN");
        assert!(normalize_code("INDX", "code", 2..=3).is_err());
        assert!(normalize_code("I1", "code", 2..=3).is_err());
    }

    #[tokio::test]
    async fn test_india_cannot_be_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![country(1, "India", "IN")]])
            .into_connection();
        let svc = service(db);

        let err = svc.delete(1).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m == "Cannot delete India"));
        // 没有 DELETE 语句
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![country(2, "Canada", "CA")]])
            .into_connection();
        let svc = service(db);

        let req = CountryRequest {
            name: Some("Canada".into()),
            code: Some("ca".into()),
            iso_code: Some("can".into()),
            dial_code: Some("+1".into()),
            currency: Some("cad".into()),
            ..Default::default()
        };
        let err = svc.create(req, None, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(svc.pool.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_create_forces_home_country_flags() {
        let mut india = country(1, "India", "IN");
        india.is_domestic = true;
        india.is_default = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<countries::Model>::new()])
            .append_query_results([vec![india]])
            .into_connection();
        let svc = service(db);

        let req = CountryRequest {
            name: Some("india".into()),
            code: Some("in".into()),
            iso_code: Some("ind".into()),
            dial_code: Some("+91".into()),
            currency: Some("inr".into()),
            is_domestic: Some(false),
            ..Default::default()
        };
        let created = svc.create(req, None, 1).await.unwrap();
        assert!(created.is_domestic && created.is_default);

        // 请求里的 isDomestic=false 被覆盖：两个 true 对应 is_domestic 与 is_default
        let log = svc.pool.into_transaction_log();
        let insert = format!("{:?}", log[1]);
        assert_eq!(insert.matches("Bool(Some(true))").count(), 2);
    }
}
