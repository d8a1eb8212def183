//! Service catalog management

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{UpsertDayCareOption, UpsertGroomingService},
        Catalog, DayCareOption, DayCareType, GroomingService,
    },
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_grooming_services(&self) -> AppResult<Vec<GroomingService>> {
        self.store.list_grooming_services().await
    }

    pub async fn list_day_care_options(&self) -> AppResult<Vec<DayCareOption>> {
        self.store.list_day_care_options().await
    }

    /// Both catalog lists, as pricing reads them
    pub async fn snapshot(&self) -> AppResult<Catalog> {
        Ok(Catalog {
            grooming_services: self.store.list_grooming_services().await?,
            day_care_options: self.store.list_day_care_options().await?,
        })
    }

    /// Create (`id = None`) or update a grooming service.
    ///
    /// Names are unique across the catalog. Appointments reference services
    /// by name, so renaming one leaves its old bookings on default pricing.
    pub async fn upsert_grooming_service(
        &self,
        id: Option<i32>,
        data: &UpsertGroomingService,
    ) -> AppResult<GroomingService> {
        data.validate()?;
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Service name is required".to_string()));
        }
        let data = UpsertGroomingService {
            name: name.to_string(),
            ..data.clone()
        };

        let existing = self.store.list_grooming_services().await?;
        if let Some(clash) = existing.iter().find(|s| s.name == data.name && Some(s.id) != id) {
            return Err(AppError::Conflict(format!(
                "Service '{}' already exists (id={})",
                clash.name, clash.id
            )));
        }

        match id {
            None => {
                let created = self.store.create_grooming_service(&data).await?;
                tracing::info!("Catalog: created grooming service id={} name={:?}", created.id, created.name);
                Ok(created)
            }
            Some(id) => {
                let previous = existing
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or_else(|| AppError::CatalogNotFound(format!("Grooming service {} not found", id)))?;
                if previous.name != data.name {
                    tracing::warn!(
                        "Catalog: service {} renamed {:?} -> {:?}, existing bookings fall back to default pricing",
                        id, previous.name, data.name
                    );
                }
                self.store.update_grooming_service(id, &data).await
            }
        }
    }

    /// Delete a grooming service; appointments are left untouched
    pub async fn delete_grooming_service(&self, id: i32) -> AppResult<()> {
        self.store.delete_grooming_service(id).await?;
        tracing::info!("Catalog: deleted grooming service id={}", id);
        Ok(())
    }

    /// Create (`is_new`) or update the day-care option keyed by its type
    pub async fn upsert_day_care_option(
        &self,
        data: &UpsertDayCareOption,
        is_new: bool,
    ) -> AppResult<DayCareOption> {
        data.validate()?;

        let exists = self
            .store
            .list_day_care_options()
            .await?
            .iter()
            .any(|o| o.care_type == data.care_type);

        match (is_new, exists) {
            (true, true) => Err(AppError::Conflict(format!(
                "Day-care option '{}' already exists",
                data.care_type
            ))),
            (true, false) => self.store.create_day_care_option(data).await,
            (false, false) => Err(AppError::CatalogNotFound(format!(
                "Day-care option '{}' not found",
                data.care_type
            ))),
            (false, true) => self.store.update_day_care_option(data).await,
        }
    }

    pub async fn delete_day_care_option(&self, care_type: DayCareType) -> AppResult<()> {
        self.store.delete_day_care_option(care_type).await
    }
}
