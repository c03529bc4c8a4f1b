//! Action trait - アクションキーと型を対応付ける
//!
//! # Trait Bounds
//! - `Param` / `Response`: JSON envelope との相互変換のため serde を要求
//! - `Send + Sync + 'static`: サーバ側で Arc に格納して tokio から使うため

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Binds an action key to its parameter and response types.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct GetFoo { name: String }
///
/// impl Action for GetFoo {
///     const KEY: &'static str = "getFoo";
///     type Param = GetFoo;
///     type Response = String;
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    const KEY: &'static str;
    type Param: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Send + Sync + 'static;
}
