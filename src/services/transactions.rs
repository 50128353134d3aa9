//! The inventory transaction engine.
//!
//! This is the only path by which `inventory_items.quantity` changes. Every
//! operation runs as one atomic database transaction: validate referenced
//! rows, mutate one or two item rows, append one immutable ledger entry.
//! Sufficiency is enforced with a guarded conditional UPDATE
//! (`quantity = quantity - ? WHERE ... AND quantity >= ?`) so two racing
//! drains of the same row cannot jointly overdraw it. Change events are
//! published only after commit and are best-effort.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    component, inventory_item, inventory_location,
    inventory_transaction::{self, TransactionType},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Largest quantity a single movement may carry. Keeps one operation's
/// arithmetic far away from the i32 range of the stock counter.
pub const MAX_MOVEMENT_QUANTITY: i32 = 1_000_000;

#[derive(Debug, Clone)]
pub struct AddStockCommand {
    pub component_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct TransferStockCommand {
    pub component_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ConsumeStockCommand {
    pub component_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Result of a committed operation: the ledger entry, the item rows it
/// touched, and the subset of those rows that crossed into low stock.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockMovement {
    pub transaction: inventory_transaction::Model,
    pub items: Vec<inventory_item::Model>,
    pub low_stock: Vec<inventory_item::Model>,
}

#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    default_min_stock_level: i32,
}

impl TransactionService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        default_min_stock_level: i32,
    ) -> Self {
        Self {
            db,
            event_sender,
            default_min_stock_level,
        }
    }

    /// Adds stock at a location, lazily creating the current-stock row on the
    /// first addition for the (component, location) pair.
    #[instrument(skip(self))]
    pub async fn add_stock(&self, cmd: AddStockCommand) -> Result<StockMovement, ServiceError> {
        validate_quantity(cmd.quantity)?;
        let movement = self
            .commit_with_retry(|| self.try_add_stock(cmd.clone()))
            .await?;
        counter!("wbtracks_engine.transactions_committed", 1, "type" => "add");
        self.publish(&movement).await;
        Ok(movement)
    }

    /// Moves stock between two distinct locations of the same component.
    #[instrument(skip(self))]
    pub async fn transfer_stock(
        &self,
        cmd: TransferStockCommand,
    ) -> Result<StockMovement, ServiceError> {
        validate_quantity(cmd.quantity)?;
        if cmd.from_location_id == cmd.to_location_id {
            return Err(ServiceError::ValidationError(
                "source and destination locations must differ".to_string(),
            ));
        }
        let movement = self
            .commit_with_retry(|| self.try_transfer_stock(cmd.clone()))
            .await?;
        counter!("wbtracks_engine.transactions_committed", 1, "type" => "transfer");
        self.publish(&movement).await;
        Ok(movement)
    }

    /// Removes stock from the system entirely (production usage).
    #[instrument(skip(self))]
    pub async fn consume_stock(
        &self,
        cmd: ConsumeStockCommand,
    ) -> Result<StockMovement, ServiceError> {
        validate_quantity(cmd.quantity)?;
        let movement = self
            .commit_with_retry(|| self.try_consume_stock(cmd.clone()))
            .await?;
        counter!("wbtracks_engine.transactions_committed", 1, "type" => "consume");
        self.publish(&movement).await;
        Ok(movement)
    }

    /// Ledger page, newest first.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        component_id: Option<Uuid>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<inventory_transaction::Model>, ServiceError> {
        let mut query = inventory_transaction::Entity::find();
        if let Some(component_id) = component_id {
            query = query.filter(inventory_transaction::Column::ComponentId.eq(component_id));
        }
        let rows = query
            .order_by_desc(inventory_transaction::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }

    async fn try_add_stock(&self, cmd: AddStockCommand) -> Result<StockMovement, ServiceError> {
        let default_min = self.default_min_stock_level;
        self.db
            .transaction::<_, StockMovement, ServiceError>(move |txn| {
                Box::pin(async move {
                    require_component(txn, cmd.component_id).await?;
                    require_location(txn, cmd.location_id).await?;

                    let item =
                        get_or_create_item(txn, cmd.component_id, cmd.location_id, default_min)
                            .await?;
                    increment_item(txn, &item, cmd.quantity).await?;
                    let after = reload_item(txn, item.id).await?;

                    let transaction = append_ledger(
                        txn,
                        cmd.component_id,
                        None,
                        Some(cmd.location_id),
                        TransactionType::Add,
                        cmd.quantity,
                        cmd.notes,
                        cmd.created_by,
                    )
                    .await?;

                    // Additions only move away from the threshold.
                    Ok(StockMovement {
                        transaction,
                        items: vec![after],
                        low_stock: Vec::new(),
                    })
                })
            })
            .await
            .map_err(flatten_transaction_error)
    }

    async fn try_transfer_stock(
        &self,
        cmd: TransferStockCommand,
    ) -> Result<StockMovement, ServiceError> {
        let default_min = self.default_min_stock_level;
        self.db
            .transaction::<_, StockMovement, ServiceError>(move |txn| {
                Box::pin(async move {
                    require_component(txn, cmd.component_id).await?;
                    require_location(txn, cmd.from_location_id).await?;
                    require_location(txn, cmd.to_location_id).await?;

                    let source =
                        draw_down(txn, cmd.component_id, cmd.from_location_id, cmd.quantity)
                            .await?;

                    let destination =
                        get_or_create_item(txn, cmd.component_id, cmd.to_location_id, default_min)
                            .await?;
                    increment_item(txn, &destination, cmd.quantity).await?;
                    let destination = reload_item(txn, destination.id).await?;

                    let transaction = append_ledger(
                        txn,
                        cmd.component_id,
                        Some(cmd.from_location_id),
                        Some(cmd.to_location_id),
                        TransactionType::Transfer,
                        cmd.quantity,
                        cmd.notes,
                        cmd.created_by,
                    )
                    .await?;

                    let low_stock = low_stock_crossings(&[(source.clone(), cmd.quantity)]);
                    Ok(StockMovement {
                        transaction,
                        items: vec![source, destination],
                        low_stock,
                    })
                })
            })
            .await
            .map_err(flatten_transaction_error)
    }

    async fn try_consume_stock(
        &self,
        cmd: ConsumeStockCommand,
    ) -> Result<StockMovement, ServiceError> {
        self.db
            .transaction::<_, StockMovement, ServiceError>(move |txn| {
                Box::pin(async move {
                    require_component(txn, cmd.component_id).await?;
                    require_location(txn, cmd.location_id).await?;

                    let item =
                        draw_down(txn, cmd.component_id, cmd.location_id, cmd.quantity).await?;

                    let transaction = append_ledger(
                        txn,
                        cmd.component_id,
                        Some(cmd.location_id),
                        None,
                        TransactionType::Consume,
                        cmd.quantity,
                        cmd.notes,
                        cmd.created_by,
                    )
                    .await?;

                    let low_stock = low_stock_crossings(&[(item.clone(), cmd.quantity)]);
                    Ok(StockMovement {
                        transaction,
                        items: vec![item],
                        low_stock,
                    })
                })
            })
            .await
            .map_err(flatten_transaction_error)
    }

    /// Runs the atomic unit, retrying once when the store reports a
    /// retryable conflict (serialization failure, deadlock, unique-index race
    /// on lazy item creation). A second failure surfaces as `Conflict`.
    async fn commit_with_retry<F, Fut>(&self, op: F) -> Result<StockMovement, ServiceError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<StockMovement, ServiceError>>,
    {
        match op().await {
            Err(ref err) if is_retryable(err) => {
                counter!("wbtracks_engine.conflict_retries", 1);
                op().await.map_err(|err| {
                    if is_retryable(&err) {
                        ServiceError::Conflict(
                            "concurrent inventory mutation invalidated the operation".to_string(),
                        )
                    } else {
                        err
                    }
                })
            }
            other => other,
        }
    }

    async fn publish(&self, movement: &StockMovement) {
        let transaction = &movement.transaction;
        self.event_sender
            .send_best_effort(Event::InventoryChanged {
                transaction_id: transaction.id,
                component_id: transaction.component_id,
                from_location_id: transaction.from_location_id,
                to_location_id: transaction.to_location_id,
                transaction_type: transaction.transaction_type.clone(),
                quantity: transaction.quantity,
            })
            .await;

        for item in &movement.low_stock {
            self.event_sender
                .send_best_effort(Event::LowStockDetected {
                    component_id: item.component_id,
                    location_id: item.location_id,
                    quantity: item.quantity,
                    min_stock_level: item.min_stock_level,
                })
                .await;
        }
    }
}

fn validate_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "quantity must be a positive integer".to_string(),
        ));
    }
    if quantity > MAX_MOVEMENT_QUANTITY {
        return Err(ServiceError::ValidationError(format!(
            "quantity must not exceed {} per movement",
            MAX_MOVEMENT_QUANTITY
        )));
    }
    Ok(())
}

async fn require_component(
    txn: &DatabaseTransaction,
    component_id: Uuid,
) -> Result<component::Model, ServiceError> {
    let found = component::Entity::find_by_id(component_id).one(txn).await?;
    match found {
        Some(c) if c.active => Ok(c),
        _ => Err(ServiceError::NotFound(format!(
            "component {} not found or inactive",
            component_id
        ))),
    }
}

async fn require_location(
    txn: &DatabaseTransaction,
    location_id: Uuid,
) -> Result<inventory_location::Model, ServiceError> {
    let found = inventory_location::Entity::find_by_id(location_id)
        .one(txn)
        .await?;
    match found {
        Some(l) if l.active => Ok(l),
        _ => Err(ServiceError::NotFound(format!(
            "location {} not found or inactive",
            location_id
        ))),
    }
}

async fn find_item(
    txn: &DatabaseTransaction,
    component_id: Uuid,
    location_id: Uuid,
) -> Result<Option<inventory_item::Model>, ServiceError> {
    let item = inventory_item::Entity::find()
        .filter(inventory_item::Column::ComponentId.eq(component_id))
        .filter(inventory_item::Column::LocationId.eq(location_id))
        .one(txn)
        .await?;
    Ok(item)
}

/// Creates the current-stock row lazily at quantity 0. A concurrent creation
/// loses the unique-index race and surfaces as a retryable conflict.
async fn get_or_create_item(
    txn: &DatabaseTransaction,
    component_id: Uuid,
    location_id: Uuid,
    default_min_stock_level: i32,
) -> Result<inventory_item::Model, ServiceError> {
    if let Some(existing) = find_item(txn, component_id, location_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = inventory_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        component_id: Set(component_id),
        location_id: Set(location_id),
        quantity: Set(0),
        min_stock_level: Set(default_min_stock_level),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(created)
}

/// Adds `amount` to the row, refusing increments that would overflow the
/// stock counter. The row is the one read earlier in this same transaction.
async fn increment_item(
    txn: &DatabaseTransaction,
    item: &inventory_item::Model,
    amount: i32,
) -> Result<(), ServiceError> {
    if item.quantity.checked_add(amount).is_none() {
        return Err(ServiceError::ValidationError(format!(
            "adding {} to the current stock of {} would overflow the counter",
            amount, item.quantity
        )));
    }

    inventory_item::Entity::update_many()
        .col_expr(
            inventory_item::Column::Quantity,
            Expr::col(inventory_item::Column::Quantity).add(amount),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(inventory_item::Column::Id.eq(item.id))
        .exec(txn)
        .await?;
    Ok(())
}

/// Decrements the row for (component, location) by `amount`, enforcing
/// sufficiency in the UPDATE itself so no interleaving can overdraw. Returns
/// the row as committed by this transaction.
async fn draw_down(
    txn: &DatabaseTransaction,
    component_id: Uuid,
    location_id: Uuid,
    amount: i32,
) -> Result<inventory_item::Model, ServiceError> {
    let Some(item) = find_item(txn, component_id, location_id).await? else {
        return Err(ServiceError::InsufficientStock(format!(
            "requested {}, available 0",
            amount
        )));
    };

    let result = inventory_item::Entity::update_many()
        .col_expr(
            inventory_item::Column::Quantity,
            Expr::col(inventory_item::Column::Quantity).sub(amount),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(inventory_item::Column::Id.eq(item.id))
        .filter(inventory_item::Column::Quantity.gte(amount))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let current = reload_item(txn, item.id).await?;
        return Err(ServiceError::InsufficientStock(format!(
            "requested {}, available {}",
            amount, current.quantity
        )));
    }

    reload_item(txn, item.id).await
}

async fn reload_item(
    txn: &DatabaseTransaction,
    item_id: Uuid,
) -> Result<inventory_item::Model, ServiceError> {
    inventory_item::Entity::find_by_id(item_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("inventory item {} vanished mid-transaction", item_id))
        })
}

#[allow(clippy::too_many_arguments)]
async fn append_ledger(
    txn: &DatabaseTransaction,
    component_id: Uuid,
    from_location_id: Option<Uuid>,
    to_location_id: Option<Uuid>,
    transaction_type: TransactionType,
    quantity: i32,
    notes: Option<String>,
    created_by: Option<Uuid>,
) -> Result<inventory_transaction::Model, ServiceError> {
    let row = inventory_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        component_id: Set(component_id),
        from_location_id: Set(from_location_id),
        to_location_id: Set(to_location_id),
        transaction_type: Set(transaction_type.as_str().to_string()),
        quantity: Set(quantity),
        notes: Set(notes),
        created_by: Set(created_by),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;
    Ok(row)
}

/// Each entry pairs a drained row (as committed) with the amount removed from
/// it; the row is reported when it crossed from above-threshold to
/// at-or-below-threshold in this operation. Rows already at or below the
/// threshold beforehand do not fire again.
fn low_stock_crossings(
    drained: &[(inventory_item::Model, i32)],
) -> Vec<inventory_item::Model> {
    drained
        .iter()
        .filter(|(item, removed)| {
            let before = item.quantity + removed;
            before > item.min_stock_level && item.quantity <= item.min_stock_level
        })
        .map(|(item, _)| item.clone())
        .collect()
}

fn flatten_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(e) => ServiceError::DatabaseError(e),
        TransactionError::Transaction(e) => e,
    }
}

/// Store errors worth one internal retry of the whole atomic unit.
fn is_retryable(err: &ServiceError) -> bool {
    let ServiceError::DatabaseError(db_err) = err else {
        return false;
    };
    let message = db_err.to_string().to_lowercase();
    message.contains("deadlock")
        || message.contains("could not serialize")
        || message.contains("database is locked")
        || message.contains("unique constraint")
        || message.contains("duplicate key")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, min: i32) -> inventory_item::Model {
        inventory_item::Model {
            id: Uuid::new_v4(),
            component_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            quantity,
            min_stock_level: min,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn crossing_fires_only_on_the_transition() {
        // 8 -> 5 with threshold 5: crosses
        assert_eq!(low_stock_crossings(&[(item(5, 5), 3)]).len(), 1);
        // 5 -> 3 with threshold 5: already at/below beforehand, no signal
        assert!(low_stock_crossings(&[(item(3, 5), 2)]).is_empty());
        // 10 -> 6 with threshold 5: still above, no signal
        assert!(low_stock_crossings(&[(item(6, 5), 4)]).is_empty());
    }

    #[test]
    fn retryable_classification() {
        let locked = ServiceError::DatabaseError(sea_orm::DbErr::Custom(
            "database is locked".to_string(),
        ));
        assert!(is_retryable(&locked));

        let unique = ServiceError::DatabaseError(sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: inventory_items.component_id".to_string(),
        ));
        assert!(is_retryable(&unique));

        assert!(!is_retryable(&ServiceError::NotFound("x".to_string())));
    }

    #[test]
    fn quantity_must_be_positive_and_bounded() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_MOVEMENT_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_MOVEMENT_QUANTITY + 1).is_err());
        assert!(validate_quantity(i32::MAX).is_err());
    }
}
