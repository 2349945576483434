use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pond {
    pub id: Uuid,
    pub name: String,
    /// Water surface area in decimal units (1 decimal = 40.46 m²).
    pub area_decimal: f64,
    pub location: Option<String>,
}
