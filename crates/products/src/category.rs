use serde::{Deserialize, Serialize};

use puntoventa_core::CategoryId;

/// Product grouping, as shown in the dashboard sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}
