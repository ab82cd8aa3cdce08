pub mod app_config;
pub mod database;
pub mod demo_repo;
pub mod memory_repo;
pub mod seed;

pub use database::DbClient;
pub use demo_repo::PostgresDemoRepository;
pub use memory_repo::InMemoryDemoRepository;
