use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_facilities_table::Migration),
            Box::new(m20240101_000002_create_components_table::Migration),
            Box::new(m20240101_000003_create_inventory_locations_table::Migration),
            Box::new(m20240101_000004_create_inventory_items_table::Migration),
            Box::new(m20240101_000005_create_inventory_transactions_table::Migration),
            Box::new(m20240101_000006_create_temporary_barcodes_table::Migration),
            Box::new(m20240101_000007_create_users_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_facilities_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_facilities_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Facilities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Facilities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Facilities::Code).string().not_null())
                        .col(ColumnDef::new(Facilities::Name).string().not_null())
                        .col(ColumnDef::new(Facilities::Address).string().null())
                        .col(ColumnDef::new(Facilities::ContactEmail).string().null())
                        .col(ColumnDef::new(Facilities::ContactPhone).string().null())
                        .col(
                            ColumnDef::new(Facilities::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Facilities::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Facilities::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_facilities_code")
                        .table(Facilities::Table)
                        .col(Facilities::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Facilities::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Facilities {
        Table,
        Id,
        Code,
        Name,
        Address,
        ContactEmail,
        ContactPhone,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_components_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_components_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Components::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Components::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Components::ComponentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Components::Description).string().not_null())
                        .col(ColumnDef::new(Components::Category).string().null())
                        .col(ColumnDef::new(Components::Supplier).string().null())
                        .col(
                            ColumnDef::new(Components::UnitPrice)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Components::PlateNumber).string().null())
                        .col(ColumnDef::new(Components::Barcode).string().null())
                        .col(
                            ColumnDef::new(Components::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Components::CreatedBy).uuid().null())
                        .col(ColumnDef::new(Components::UpdatedBy).uuid().null())
                        .col(
                            ColumnDef::new(Components::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Components::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_components_component_number")
                        .table(Components::Table)
                        .col(Components::ComponentNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_components_barcode")
                        .table(Components::Table)
                        .col(Components::Barcode)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Components::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Components {
        Table,
        Id,
        ComponentNumber,
        Description,
        Category,
        Supplier,
        UnitPrice,
        PlateNumber,
        Barcode,
        Active,
        CreatedBy,
        UpdatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_inventory_locations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_inventory_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLocations::FacilityId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryLocations::Name).string().not_null())
                        .col(
                            ColumnDef::new(InventoryLocations::LocationType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryLocations::Aisle).string().null())
                        .col(ColumnDef::new(InventoryLocations::Rack).string().null())
                        .col(ColumnDef::new(InventoryLocations::Shelf).string().null())
                        .col(ColumnDef::new(InventoryLocations::Bin).string().null())
                        .col(
                            ColumnDef::new(InventoryLocations::Capacity)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLocations::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(InventoryLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_locations_facility")
                                .from(InventoryLocations::Table, InventoryLocations::FacilityId)
                                .to(
                                    super::m20240101_000001_create_facilities_table::Facilities::Table,
                                    super::m20240101_000001_create_facilities_table::Facilities::Id,
                                ),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryLocations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryLocations {
        Table,
        Id,
        FacilityId,
        Name,
        LocationType,
        Aisle,
        Rack,
        Shelf,
        Bin,
        Capacity,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::ComponentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::MinStockLevel)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_component")
                                .from(InventoryItems::Table, InventoryItems::ComponentId)
                                .to(
                                    super::m20240101_000002_create_components_table::Components::Table,
                                    super::m20240101_000002_create_components_table::Components::Id,
                                ),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_items_location")
                                .from(InventoryItems::Table, InventoryItems::LocationId)
                                .to(
                                    super::m20240101_000003_create_inventory_locations_table::InventoryLocations::Table,
                                    super::m20240101_000003_create_inventory_locations_table::InventoryLocations::Id,
                                ),
                        )
                        .to_owned(),
                )
                .await?;

            // One current-stock row per (component, location); the transaction
            // engine's lazy creation relies on this racing safely.
            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_items_component_location")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::ComponentId)
                        .col(InventoryItems::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryItems {
        Table,
        Id,
        ComponentId,
        LocationId,
        Quantity,
        MinStockLevel,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_inventory_transactions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_inventory_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ComponentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::FromLocationId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ToLocationId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::Notes).string().null())
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedBy)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_transactions_component")
                                .from(
                                    InventoryTransactions::Table,
                                    InventoryTransactions::ComponentId,
                                )
                                .to(
                                    super::m20240101_000002_create_components_table::Components::Table,
                                    super::m20240101_000002_create_components_table::Components::Id,
                                ),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_transactions_component")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ComponentId)
                        .col(InventoryTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryTransactions {
        Table,
        Id,
        ComponentId,
        FromLocationId,
        ToLocationId,
        TransactionType,
        Quantity,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000006_create_temporary_barcodes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_temporary_barcodes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TemporaryBarcodes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TemporaryBarcodes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TemporaryBarcodes::Barcode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TemporaryBarcodes::ComponentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TemporaryBarcodes::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TemporaryBarcodes::UsageCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(TemporaryBarcodes::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(TemporaryBarcodes::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(TemporaryBarcodes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_temporary_barcodes_component")
                                .from(TemporaryBarcodes::Table, TemporaryBarcodes::ComponentId)
                                .to(
                                    super::m20240101_000002_create_components_table::Components::Table,
                                    super::m20240101_000002_create_components_table::Components::Id,
                                ),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_temporary_barcodes_barcode")
                        .table(TemporaryBarcodes::Table)
                        .col(TemporaryBarcodes::Barcode)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TemporaryBarcodes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum TemporaryBarcodes {
        Table,
        Id,
        Barcode,
        ComponentId,
        ExpiresAt,
        UsageCount,
        Active,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000007_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Username).string().not_null())
                        .col(ColumnDef::new(Users::DisplayName).string().not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_users_username")
                        .table(Users::Table)
                        .col(Users::Username)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Users {
        Table,
        Id,
        Username,
        DisplayName,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}
