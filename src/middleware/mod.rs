/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - http: request-id / trace / body limit / timeout
 * - auth: bearer 認証
 */
pub mod auth;
pub mod http;
