use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::inventory_location::LocationType;
use crate::entities::{facility, inventory_location};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct CreateFacilityCommand {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateLocationCommand {
    pub facility_id: Uuid,
    pub name: String,
    pub location_type: LocationType,
    pub aisle: Option<String>,
    pub rack: Option<String>,
    pub shelf: Option<String>,
    pub bin: Option<String>,
    pub capacity: Option<i32>,
}

/// Facilities and the storage locations inside them.
#[derive(Clone)]
pub struct LocationService {
    db: Arc<DatabaseConnection>,
}

impl LocationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_facility(
        &self,
        cmd: CreateFacilityCommand,
    ) -> Result<facility::Model, ServiceError> {
        let code = cmd.code.trim().to_string();
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "facility code must not be empty".to_string(),
            ));
        }
        if cmd.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "facility name must not be empty".to_string(),
            ));
        }

        let existing = facility::Entity::find()
            .filter(facility::Column::Code.eq(code.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "facility code {} already exists",
                code
            )));
        }

        let created = facility::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(cmd.name.trim().to_string()),
            address: Set(cmd.address),
            contact_email: Set(cmd.contact_email),
            contact_phone: Set(cmd.contact_phone),
            active: Set(true),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_facilities(&self) -> Result<Vec<facility::Model>, ServiceError> {
        let facilities = facility::Entity::find()
            .filter(facility::Column::Active.eq(true))
            .order_by_asc(facility::Column::Code)
            .all(self.db.as_ref())
            .await?;
        Ok(facilities)
    }

    #[instrument(skip(self))]
    pub async fn get_facility(&self, id: Uuid) -> Result<facility::Model, ServiceError> {
        facility::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("facility {} not found", id)))
    }

    /// New storage locations may only be attached to an active facility.
    #[instrument(skip(self))]
    pub async fn create_location(
        &self,
        cmd: CreateLocationCommand,
    ) -> Result<inventory_location::Model, ServiceError> {
        if cmd.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "location name must not be empty".to_string(),
            ));
        }
        if let Some(capacity) = cmd.capacity {
            if capacity <= 0 {
                return Err(ServiceError::ValidationError(
                    "capacity must be positive".to_string(),
                ));
            }
        }

        let facility = self.get_facility(cmd.facility_id).await?;
        if !facility.active {
            return Err(ServiceError::NotFound(format!(
                "facility {} is inactive",
                facility.id
            )));
        }

        let created = inventory_location::ActiveModel {
            id: Set(Uuid::new_v4()),
            facility_id: Set(facility.id),
            name: Set(cmd.name.trim().to_string()),
            location_type: Set(cmd.location_type.to_string()),
            aisle: Set(cmd.aisle),
            rack: Set(cmd.rack),
            shelf: Set(cmd.shelf),
            bin: Set(cmd.bin),
            capacity: Set(cmd.capacity),
            active: Set(true),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_locations(
        &self,
        facility_id: Option<Uuid>,
    ) -> Result<Vec<inventory_location::Model>, ServiceError> {
        let mut query = inventory_location::Entity::find()
            .filter(inventory_location::Column::Active.eq(true));
        if let Some(facility_id) = facility_id {
            query = query.filter(inventory_location::Column::FacilityId.eq(facility_id));
        }
        let locations = query
            .order_by_asc(inventory_location::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(locations)
    }

    #[instrument(skip(self))]
    pub async fn get_location(
        &self,
        id: Uuid,
    ) -> Result<inventory_location::Model, ServiceError> {
        inventory_location::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("location {} not found", id)))
    }

    /// Soft-deactivation; history referencing the location stays resolvable.
    #[instrument(skip(self))]
    pub async fn deactivate_location(
        &self,
        id: Uuid,
    ) -> Result<inventory_location::Model, ServiceError> {
        let existing = self.get_location(id).await?;
        let mut active_model: inventory_location::ActiveModel = existing.into();
        active_model.active = Set(false);
        let updated = active_model.update(self.db.as_ref()).await?;
        Ok(updated)
    }
}
