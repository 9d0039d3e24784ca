pub mod log_store;
pub mod model;
pub mod mysql_store;
pub mod schema;
pub mod storage;
