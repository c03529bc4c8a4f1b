//! eureka-core
//!
//! Client-side request batching with transparent session recovery, and the
//! server-side action pipeline it talks to.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, envelope, response, context, errors）
//! - **ports**: 抽象化レイヤー（TransactionManager, ActionTransport, TaskQueue, SessionStore, など）
//! - **app**: アプリケーションロジック（processor, session, controller, executor, rpc_service, builder, など）
//! - **typed**: 型付きアクション API（Action trait, Execute trait）
//! - **impls**: 実装（インメモリ版と loopback トランスポート）
//! - **config** / **logging**: 設定と構造化ログ

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod logging;
pub mod ports;
pub mod typed;

#[cfg(test)]
pub(crate) mod testing;
