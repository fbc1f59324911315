// src/models/auth.rs

use serde::{Deserialize, Serialize};

// O perfil do operador logado, vindo de /auth/profile/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    /// Id do cargo em /auth/roles/. Sem cargo = sem permissões.
    pub role: Option<i64>,
    #[serde(default)]
    pub is_superuser: bool,
}
