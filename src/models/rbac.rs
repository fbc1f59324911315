// src/models/rbac.rs

use serde::{Deserialize, Serialize};

// Capacidades de um cargo para uma página/recurso do console
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePermission {
    pub page: String,
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_add: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

// O que sai de /auth/roles/{id}/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PagePermission>,
}
