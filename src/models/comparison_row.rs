//! Comparison row entity model
//!
//! One line item of a comparison. `quantities` and `prices` are JSON arrays
//! of numbers indexed by vendor position minus one.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

use super::item::UnitOfMeasure;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comparison_rows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub comparison_id: Uuid,

    /// 1-based, dense sequence number within the comparison
    pub srl: i32,

    pub item_id: Uuid,

    pub description: String,

    /// First entry of `quantities`, or 0
    pub qty: f64,

    pub uom: UnitOfMeasure,

    #[sea_orm(column_type = "JsonBinary")]
    pub quantities: JsonValue,

    #[sea_orm(column_type = "JsonBinary")]
    pub prices: JsonValue,

    pub selected_vendor_index: Option<i32>,

    pub remarks: String,

    pub comment: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comparison::Entity",
        from = "Column::ComparisonId",
        to = "super::comparison::Column::Id",
        on_delete = "Cascade"
    )]
    Comparison,

    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::comparison::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comparison.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Decode a stored numeric array; non-numeric entries read as 0.
pub fn decode_numbers(value: &JsonValue) -> Vec<f64> {
    value
        .as_array()
        .map(|entries| entries.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect())
        .unwrap_or_default()
}

pub fn encode_numbers(values: &[f64]) -> JsonValue {
    JsonValue::Array(values.iter().map(|v| serde_json::json!(v)).collect())
}
