// Services Layer
// ドメインロジックを実行するサービス層

pub mod database_config_resolver;
pub mod migration_executor;
pub mod migration_store;
pub mod migration_tag_tracker;
pub mod model_introspector;
pub mod model_io;
pub mod sql_parser;
