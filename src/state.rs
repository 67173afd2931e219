/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - verifier: 署名鍵を持つ TokenVerifier (起動後は読み取り専用)
 *   - principals: subject → Principal の解決 (外部コラボレータ)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::TokenVerifier, principal::PrincipalLookup};

#[derive(Clone)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub principals: Arc<dyn PrincipalLookup>,
}

impl AppState {
    pub fn new(verifier: TokenVerifier, principals: Arc<dyn PrincipalLookup>) -> Self {
        Self {
            verifier,
            principals,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}
