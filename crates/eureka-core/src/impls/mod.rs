//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTransactionManager**: begin / commit / rollback の履歴を記録
//! - **InMemoryTaskQueue** / **QueueTaskHandler**: 遅延タスクのキュー
//! - **InMemorySessionStore**: ユーザーごとのセッション（TTL 付き）
//! - **StaticPrincipals**: 固定のユーザーディレクトリ
//! - **LoopbackTransport**: 同一プロセス内のサーバへつなぐクライアント用トランスポート

pub mod inmem_session;
pub mod inmem_task_queue;
pub mod inmem_tx;
pub mod loopback;
pub mod principals;

// 主要な型を再エクスポート
pub use self::inmem_session::InMemorySessionStore;
pub use self::inmem_task_queue::{InMemoryTaskQueue, QueueTaskHandler};
pub use self::inmem_tx::{InMemoryTransactionManager, TxEvent};
pub use self::loopback::LoopbackTransport;
pub use self::principals::StaticPrincipals;
