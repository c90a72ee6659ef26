//! # Item Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    ComparisonRow, Item, UnitOfMeasure, comparison_row,
    item::{self, ActiveModel as ItemActiveModel, Model as ItemModel},
};

pub const ITEM_NOT_FOUND: &str = "Item not found";

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub specification: String,
    pub unit: UnitOfMeasure,
    pub category: String,
    pub vat_applicable: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub specification: Option<String>,
    pub unit: Option<UnitOfMeasure>,
    pub category: Option<String>,
    pub vat_applicable: Option<bool>,
    pub is_active: Option<bool>,
}

pub struct ItemRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ItemRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<ItemModel>, RepositoryError> {
        Ok(Item::find()
            .order_by_asc(item::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ItemModel, RepositoryError> {
        Item::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found(ITEM_NOT_FOUND))
    }

    /// Items with the given ids; unknown ids are skipped.
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ItemModel>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(Item::find()
            .filter(item::Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await?)
    }

    pub async fn create(&self, new_item: NewItem) -> Result<ItemModel, RepositoryError> {
        let model = ItemActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_item.name),
            description: Set(new_item.description),
            specification: Set(new_item.specification),
            unit: Set(new_item.unit),
            category: Set(new_item.category),
            vat_applicable: Set(new_item.vat_applicable),
            is_active: Set(new_item.is_active),
            created_at: Set(Utc::now().into()),
        };
        Ok(model.insert(self.db).await?)
    }

    pub async fn update(&self, id: Uuid, changes: ItemUpdate) -> Result<ItemModel, RepositoryError> {
        let mut active = self.get(id).await?.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(specification) = changes.specification {
            active.specification = Set(specification);
        }
        if let Some(unit) = changes.unit {
            active.unit = Set(unit);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(vat_applicable) = changes.vat_applicable {
            active.vat_applicable = Set(vat_applicable);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let existing = self.get(id).await?;

        let rows = ComparisonRow::find()
            .filter(comparison_row::Column::ItemId.eq(id))
            .count(self.db)
            .await?;
        if rows > 0 {
            return Err(RepositoryError::conflict("Item is used by existing comparisons"));
        }

        Item::delete_by_id(existing.id).exec(self.db).await?;
        Ok(())
    }
}
