//! Typed - 型付きアクション API
//!
//! アクションキーの typo を型で排除し、param / response の型を
//! クライアントとサーバで共有します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Action` trait, `Execute<A>` trait - 型安全
//! - **内部（JSON）**: `ExecutionStrategy` / `ActionProcessor::make_request` - envelope 上の `serde_json::Value`

pub mod action;
pub mod client;
pub mod execution;

pub use self::action::Action;
pub use self::execution::{DecodeParam, Execute, TypedExecution, service_action};
