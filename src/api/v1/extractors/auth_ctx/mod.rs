/*!
 * Authentication context extractors
 *
 * Responsibility:
 * - 認証済みリクエストのコンテキスト（Principal）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthOutcome
 * - RequirePrincipal
 */

mod core;
mod types;

pub use self::core::RequirePrincipal;
pub use types::{AuthDetails, AuthOutcome, Principal};
