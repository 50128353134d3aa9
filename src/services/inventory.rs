use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{component, inventory_item, inventory_location};
use crate::errors::ServiceError;

/// One current-stock row joined with its component and location for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryRow {
    pub item: inventory_item::Model,
    pub component: component::Model,
    pub location: inventory_location::Model,
}

/// Read-only view over current stock. Never mutates state and always reflects
/// the latest committed transaction; there is deliberately no cache layer
/// here.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Current stock, optionally restricted to one location.
    #[instrument(skip(self))]
    pub async fn get_inventory(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<InventoryRow>, ServiceError> {
        let mut query = inventory_item::Entity::find();
        if let Some(location_id) = location_id {
            query = query.filter(inventory_item::Column::LocationId.eq(location_id));
        }
        let items = query
            .order_by_asc(inventory_item::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        self.join_rows(items).await
    }

    /// All rows at or below their configured minimum stock level.
    #[instrument(skip(self))]
    pub async fn get_low_stock(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let items = inventory_item::Entity::find()
            .filter(
                Expr::col(inventory_item::Column::Quantity)
                    .lte(Expr::col(inventory_item::Column::MinStockLevel)),
            )
            .order_by_asc(inventory_item::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        self.join_rows(items).await
    }

    /// Current stock row for one (component, location) pair, if it exists.
    #[instrument(skip(self))]
    pub async fn get_item(
        &self,
        component_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<inventory_item::Model>, ServiceError> {
        let item = inventory_item::Entity::find()
            .filter(inventory_item::Column::ComponentId.eq(component_id))
            .filter(inventory_item::Column::LocationId.eq(location_id))
            .one(self.db.as_ref())
            .await?;
        Ok(item)
    }

    async fn join_rows(
        &self,
        items: Vec<inventory_item::Model>,
    ) -> Result<Vec<InventoryRow>, ServiceError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let component_ids: Vec<Uuid> = items.iter().map(|i| i.component_id).collect();
        let location_ids: Vec<Uuid> = items.iter().map(|i| i.location_id).collect();

        let components: HashMap<Uuid, component::Model> = component::Entity::find()
            .filter(component::Column::Id.is_in(component_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let locations: HashMap<Uuid, inventory_location::Model> =
            inventory_location::Entity::find()
                .filter(inventory_location::Column::Id.is_in(location_ids))
                .all(self.db.as_ref())
                .await?
                .into_iter()
                .map(|l| (l.id, l))
                .collect();

        // A dangling reference would mean a broken FK; such rows are skipped
        // rather than failing the whole listing.
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let component = components.get(&item.component_id)?.clone();
                let location = locations.get(&item.location_id)?.clone();
                Some(InventoryRow {
                    item,
                    component,
                    location,
                })
            })
            .collect())
    }
}
