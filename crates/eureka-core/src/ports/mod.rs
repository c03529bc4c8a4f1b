//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部の協調者（トランザクション管理、RPC、タスクキュー、
//! セッション管理など）へのインターフェースで、実装の詳細を隠蔽します。
//!
//! - サーバ側の trait は `Send + Sync`（tokio のワーカーから使う）
//! - クライアント側の `ActionTransport` はシングルスレッド前提

pub mod clock;
pub mod id_generator;
pub mod principal;
pub mod session_store;
pub mod strategy;
pub mod task_handler;
pub mod task_queue;
pub mod transaction;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::principal::{PrincipalPopulator, UnknownUser};
pub use self::session_store::{SessionStore, SessionStoreError};
pub use self::strategy::{
    AllowAll, AuthorizationStrategy, ExecutionOutput, ExecutionStrategy, NoValidation,
    TaskHandlerExecutionStrategy, ValidationStrategy,
};
pub use self::task_handler::TaskHandler;
pub use self::task_queue::{TaskQueue, TaskQueueError};
pub use self::transaction::{TransactionDefinition, TransactionManager, TransactionStatus};
pub use self::transport::{
    ActionTransport, BatchCompletion, BatchOutcome, ItemOutcome, SessionCompletion,
};
