/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - auth gate が検証して request extensions に格納し、handler/logger はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - extensions に無い = 未認証 (gate を通っていない) として扱う
 */
use serde::Serialize;

use crate::services::auth::{Claims, UserRole};

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は token の `sub` を整数にしたもの
/// - `user_role` は検証済みの role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdentity {
    pub user_id: i64,
    pub user_role: UserRole,
    pub email: Option<String>,
}

impl From<Claims> for RequestIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            user_role: claims.role,
            email: claims.email,
        }
    }
}
