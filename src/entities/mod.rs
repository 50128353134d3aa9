pub mod component;
pub mod facility;
pub mod inventory_item;
pub mod inventory_location;
pub mod inventory_transaction;
pub mod temporary_barcode;
pub mod user;
