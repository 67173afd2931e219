/*
 * Responsibility
 * - Bearer トークンの抽出 (bearer) → 検証 + Principal 解決 (access)
 * - 認証失敗時の 401 レスポンス (unauthorized)
 * - 認可 (Authorization) は handler 側で Principal を見て判断する
 */
pub mod access;
pub mod bearer;
pub mod unauthorized;

pub use unauthorized::{AUTHENTICATION_REQUIRED, unauthorized};
