//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **ActionProcessor**: クライアント側のバッチ送信とセッション回復
//! - **SessionMachine**: セッション確立の状態機械
//! - **ServiceActionController** / **AsyncActionController**: トランザクション境界での実行
//! - **ActionExecutor** / **ActionRpcService**: envelope 単位・バッチ単位のサーバ入口
//! - **TaskWorkerGroup**: 遅延タスクのワーカー
//! - **ServerBuilder**: サーバの構築とワイヤリング

pub mod action;
pub mod builder;
pub(crate) mod callback;
pub mod controller;
pub mod executor;
pub mod processor;
pub mod registry;
pub mod rpc_service;
pub mod session;
pub mod task_worker;

// 主要な型を再エクスポート
pub use self::action::{ActionDefinition, AsyncAction, Execution, ServiceAction};
pub use self::builder::{BuildError, Server, ServerBuilder};
pub use self::controller::{AsyncActionController, ServiceActionController};
pub use self::executor::ActionExecutor;
pub use self::processor::{ActionCallback, ActionProcessor, SessionCallback};
pub use self::registry::{ActionRegistry, RegistryError};
pub use self::rpc_service::ActionRpcService;
pub use self::session::{SessionEvent, SessionMachine, SessionState, SessionTransitionError};
pub use self::task_worker::{DeferredTaskRunner, TaskWorkerGroup, WorkerCounts};
