// Core Domain
// モデルスキーマ、マイグレーションファイル、プロジェクトメタデータの純粋なドメイン型

pub mod config;
pub mod error;
pub mod migration;
pub mod naming;
pub mod schema;
