pub mod barcode;
pub mod components;
pub mod inventory;
pub mod locations;
pub mod transactions;
pub mod users;
