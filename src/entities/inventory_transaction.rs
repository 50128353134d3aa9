use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Types of ledger entries. `consume` is the canonical "stock leaves the
/// system" operation; the legacy `remove` spelling parses as a synonym and is
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Add,
    Transfer,
    Consume,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Add => "add",
            TransactionType::Transfer => "transfer",
            TransactionType::Consume => "consume",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(TransactionType::Add),
            "transfer" => Some(TransactionType::Transfer),
            "consume" | "remove" => Some(TransactionType::Consume),
            _ => None,
        }
    }
}

/// Immutable ledger entry for a stock-affecting operation. Append-only; rows
/// are never updated or deleted, so replaying the signed deltas from zero
/// reproduces the current inventory item quantities.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub component_id: Uuid,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    pub transaction_type: String,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.transaction_type)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::component::Entity",
        from = "Column::ComponentId",
        to = "super::component::Column::Id"
    )]
    Component,
}

impl Related<super::component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Component.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr> {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_parses_as_consume() {
        assert_eq!(
            TransactionType::parse("remove"),
            Some(TransactionType::Consume)
        );
        assert_eq!(TransactionType::Consume.as_str(), "consume");
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_eq!(TransactionType::parse("adjust"), None);
    }
}
