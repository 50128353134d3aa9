use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::component;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone)]
pub struct CreateComponentCommand {
    pub component_number: String,
    pub description: String,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub plate_number: Option<String>,
    pub barcode: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateComponentCommand {
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub plate_number: Option<String>,
    pub barcode: Option<String>,
    pub updated_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct ComponentService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ComponentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        cmd: CreateComponentCommand,
    ) -> Result<component::Model, ServiceError> {
        let component_number = cmd.component_number.trim().to_string();
        if component_number.is_empty() {
            return Err(ServiceError::ValidationError(
                "component_number must not be empty".to_string(),
            ));
        }
        if cmd.description.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "description must not be empty".to_string(),
            ));
        }

        let existing = component::Entity::find()
            .filter(component::Column::ComponentNumber.eq(component_number.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "component number {} already exists",
                component_number
            )));
        }

        let created = component::ActiveModel {
            id: Set(Uuid::new_v4()),
            component_number: Set(component_number),
            description: Set(cmd.description.trim().to_string()),
            category: Set(cmd.category),
            supplier: Set(cmd.supplier),
            unit_price: Set(cmd.unit_price),
            plate_number: Set(cmd.plate_number),
            barcode: Set(cmd.barcode),
            active: Set(true),
            created_by: Set(cmd.created_by),
            updated_by: Set(cmd.created_by),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        self.event_sender
            .send_best_effort(Event::ComponentCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<component::Model>, ServiceError> {
        let mut query = component::Entity::find();
        if !include_inactive {
            query = query.filter(component::Column::Active.eq(true));
        }
        let components = query
            .order_by_asc(component::Column::ComponentNumber)
            .all(self.db.as_ref())
            .await?;
        Ok(components)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<component::Model, ServiceError> {
        component::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("component {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        cmd: UpdateComponentCommand,
    ) -> Result<component::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut active_model: component::ActiveModel = existing.into();
        if let Some(description) = cmd.description {
            if description.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "description must not be empty".to_string(),
                ));
            }
            active_model.description = Set(description.trim().to_string());
        }
        if let Some(category) = cmd.category {
            active_model.category = Set(Some(category));
        }
        if let Some(supplier) = cmd.supplier {
            active_model.supplier = Set(Some(supplier));
        }
        if let Some(unit_price) = cmd.unit_price {
            active_model.unit_price = Set(Some(unit_price));
        }
        if let Some(plate_number) = cmd.plate_number {
            active_model.plate_number = Set(Some(plate_number));
        }
        if let Some(barcode) = cmd.barcode {
            active_model.barcode = Set(Some(barcode));
        }
        active_model.updated_by = Set(cmd.updated_by);

        let updated = active_model.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    /// Soft-deactivation: the row survives so transaction history stays
    /// resolvable.
    #[instrument(skip(self))]
    pub async fn deactivate(
        &self,
        id: Uuid,
        updated_by: Option<Uuid>,
    ) -> Result<component::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut active_model: component::ActiveModel = existing.into();
        active_model.active = Set(false);
        active_model.updated_by = Set(updated_by);
        let updated = active_model.update(self.db.as_ref()).await?;

        self.event_sender
            .send_best_effort(Event::ComponentDeactivated(updated.id))
            .await;
        Ok(updated)
    }
}
