// Adapters
// データベースとSQL生成へのアクセスを抽象化

pub mod database;
pub mod sql_generator;
pub mod type_mapping;
