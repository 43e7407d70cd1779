// Gaverライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（モデルスキーマ、マイグレーションファイル、プロジェクトメタデータ）
// - services: モデルの走査、マイグレーションファイルの管理と適用
// - adapters: SQL生成とデータベースアクセス

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
