//! # Comparison Repository
//!
//! A comparison owns its rows, vendor links and attachments. Every write
//! that touches more than one table runs in a single transaction, so a
//! replaced row or vendor set is either stored completely or not at all.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    Attachment, Comparison, ComparisonRow, ComparisonStatus, ComparisonVendor, Item,
    UnitOfMeasure, Vendor, attachment,
    comparison::{self, ActiveModel as ComparisonActiveModel, Model as ComparisonModel},
    comparison_row::{self, encode_numbers},
    comparison_vendor, item, vendor,
};

pub const COMPARISON_NOT_FOUND: &str = "Comparison not found";
pub const DEFAULT_TITLE: &str = "Price Comparison";

/// `REQ-<epoch millis>`
pub fn default_request_number(now: DateTime<Utc>) -> String {
    format!("REQ-{}", now.timestamp_millis())
}

/// A validated row ready for insertion. `srl` is assigned from its index.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDraft {
    pub item_id: Uuid,
    pub description: String,
    pub uom: UnitOfMeasure,
    pub quantities: Vec<f64>,
    pub prices: Vec<f64>,
    pub selected_vendor_index: Option<i32>,
    pub remarks: String,
    pub comment: String,
}

impl RowDraft {
    /// Quantity quoted to the first vendor, or zero.
    pub fn qty(&self) -> f64 {
        self.quantities.first().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct NewComparison {
    pub request_number: String,
    pub title: String,
    pub general_comments: String,
    pub purpose: String,
    pub created_by: Uuid,
    pub rows: Vec<RowDraft>,
    pub vendor_ids: Vec<Uuid>,
}

/// Header edits plus optional full replacement of rows and vendors.
#[derive(Debug, Clone, Default)]
pub struct ComparisonChanges {
    pub request_number: Option<String>,
    pub title: Option<String>,
    pub general_comments: Option<String>,
    pub purpose: Option<String>,
    pub rows: Option<Vec<RowDraft>>,
    pub vendor_ids: Option<Vec<Uuid>>,
}

/// Status change written by a lifecycle transition.
#[derive(Debug, Clone)]
pub enum StatusChange {
    Submitted,
    Approved { reviewer: Uuid },
    Rejected { reviewer: Uuid, reason: String },
}

#[derive(Debug, Clone)]
pub struct LinkedVendor {
    pub position: i32,
    pub vendor: vendor::Model,
}

/// A comparison with its rows (by `srl`) and vendors (by position).
#[derive(Debug, Clone)]
pub struct ComparisonDetail {
    pub comparison: ComparisonModel,
    pub rows: Vec<comparison_row::Model>,
    pub vendors: Vec<LinkedVendor>,
}

/// Checks row arrays against the number of vendor columns.
pub fn validate_rows(rows: &[RowDraft], vendor_count: usize) -> Result<(), RepositoryError> {
    for (index, row) in rows.iter().enumerate() {
        let srl = index + 1;
        if row.quantities.len() > vendor_count || row.prices.len() > vendor_count {
            return Err(RepositoryError::validation(format!(
                "Row {srl} has more quotes than selected vendors"
            )));
        }
        if let Some(selected) = row.selected_vendor_index {
            if selected < 0 || selected as usize >= vendor_count {
                return Err(RepositoryError::validation(format!(
                    "Row {srl} selects a vendor outside the selection"
                )));
            }
        }
    }
    Ok(())
}

fn ensure_unique_vendors(vendor_ids: &[Uuid]) -> Result<(), RepositoryError> {
    let mut seen = HashSet::with_capacity(vendor_ids.len());
    if vendor_ids.iter().all(|id| seen.insert(*id)) {
        Ok(())
    } else {
        Err(RepositoryError::validation("Each vendor can only be selected once"))
    }
}

async fn ensure_items_exist<C: ConnectionTrait>(
    conn: &C,
    rows: &[RowDraft],
) -> Result<(), RepositoryError> {
    let ids: HashSet<Uuid> = rows.iter().map(|r| r.item_id).collect();
    if ids.is_empty() {
        return Ok(());
    }
    let found = Item::find()
        .filter(item::Column::Id.is_in(ids.iter().copied()))
        .count(conn)
        .await?;
    if found as usize != ids.len() {
        return Err(RepositoryError::validation("One or more items do not exist"));
    }
    Ok(())
}

async fn ensure_vendors_exist<C: ConnectionTrait>(
    conn: &C,
    vendor_ids: &[Uuid],
) -> Result<(), RepositoryError> {
    if vendor_ids.is_empty() {
        return Ok(());
    }
    let found = Vendor::find()
        .filter(vendor::Column::Id.is_in(vendor_ids.iter().copied()))
        .count(conn)
        .await?;
    if found as usize != vendor_ids.len() {
        return Err(RepositoryError::validation("One or more vendors do not exist"));
    }
    Ok(())
}

async fn insert_rows<C: ConnectionTrait>(
    conn: &C,
    comparison_id: Uuid,
    rows: Vec<RowDraft>,
) -> Result<(), RepositoryError> {
    for (index, row) in rows.into_iter().enumerate() {
        let qty = row.qty();
        comparison_row::ActiveModel {
            id: Set(Uuid::new_v4()),
            comparison_id: Set(comparison_id),
            srl: Set(index as i32 + 1),
            item_id: Set(row.item_id),
            description: Set(row.description),
            qty: Set(qty),
            uom: Set(row.uom),
            quantities: Set(encode_numbers(&row.quantities)),
            prices: Set(encode_numbers(&row.prices)),
            selected_vendor_index: Set(row.selected_vendor_index),
            remarks: Set(row.remarks),
            comment: Set(row.comment),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn insert_vendor_links<C: ConnectionTrait>(
    conn: &C,
    comparison_id: Uuid,
    vendor_ids: &[Uuid],
) -> Result<(), RepositoryError> {
    for (index, vendor_id) in vendor_ids.iter().enumerate() {
        comparison_vendor::ActiveModel {
            id: Set(Uuid::new_v4()),
            comparison_id: Set(comparison_id),
            vendor_id: Set(*vendor_id),
            position: Set(index as i32 + 1),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn load_rows<C: ConnectionTrait>(
    conn: &C,
    comparison_id: Uuid,
) -> Result<Vec<comparison_row::Model>, RepositoryError> {
    Ok(ComparisonRow::find()
        .filter(comparison_row::Column::ComparisonId.eq(comparison_id))
        .order_by_asc(comparison_row::Column::Srl)
        .all(conn)
        .await?)
}

async fn load_vendors<C: ConnectionTrait>(
    conn: &C,
    comparison_id: Uuid,
) -> Result<Vec<LinkedVendor>, RepositoryError> {
    let links = ComparisonVendor::find()
        .filter(comparison_vendor::Column::ComparisonId.eq(comparison_id))
        .order_by_asc(comparison_vendor::Column::Position)
        .find_also_related(Vendor)
        .all(conn)
        .await?;

    Ok(links
        .into_iter()
        .filter_map(|(link, vendor)| {
            vendor.map(|vendor| LinkedVendor {
                position: link.position,
                vendor,
            })
        })
        .collect())
}

pub struct ComparisonRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ComparisonRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first; `created_by` limits the list to one author.
    pub async fn list(
        &self,
        created_by: Option<Uuid>,
    ) -> Result<Vec<ComparisonModel>, RepositoryError> {
        let mut query = Comparison::find().order_by_desc(comparison::Column::CreatedAt);
        if let Some(author) = created_by {
            query = query.filter(comparison::Column::CreatedBy.eq(author));
        }
        Ok(query.all(self.db).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ComparisonModel, RepositoryError> {
        Comparison::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found(COMPARISON_NOT_FOUND))
    }

    pub async fn detail(&self, comparison: ComparisonModel) -> Result<ComparisonDetail, RepositoryError> {
        let rows = load_rows(self.db, comparison.id).await?;
        let vendors = load_vendors(self.db, comparison.id).await?;
        Ok(ComparisonDetail {
            comparison,
            rows,
            vendors,
        })
    }

    pub async fn create(
        &self,
        new_comparison: NewComparison,
    ) -> Result<ComparisonDetail, RepositoryError> {
        ensure_unique_vendors(&new_comparison.vendor_ids)?;
        validate_rows(&new_comparison.rows, new_comparison.vendor_ids.len())?;

        let txn = self.db.begin().await?;

        ensure_items_exist(&txn, &new_comparison.rows).await?;
        ensure_vendors_exist(&txn, &new_comparison.vendor_ids).await?;

        let now = Utc::now();
        let comparison = ComparisonActiveModel {
            id: Set(Uuid::new_v4()),
            request_number: Set(new_comparison.request_number),
            title: Set(new_comparison.title),
            status: Set(ComparisonStatus::Draft),
            created_by: Set(new_comparison.created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            submitted_at: Set(None),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
            rejection_reason: Set(None),
            general_comments: Set(new_comparison.general_comments),
            purpose: Set(new_comparison.purpose),
        }
        .insert(&txn)
        .await?;

        insert_vendor_links(&txn, comparison.id, &new_comparison.vendor_ids).await?;
        insert_rows(&txn, comparison.id, new_comparison.rows).await?;

        let rows = load_rows(&txn, comparison.id).await?;
        let vendors = load_vendors(&txn, comparison.id).await?;
        txn.commit().await?;

        Ok(ComparisonDetail {
            comparison,
            rows,
            vendors,
        })
    }

    /// Applies header changes and replaces rows and vendor links that were
    /// supplied. The caller has already checked that `existing` is editable.
    pub async fn update(
        &self,
        existing: ComparisonModel,
        changes: ComparisonChanges,
    ) -> Result<ComparisonDetail, RepositoryError> {
        if let Some(vendor_ids) = changes.vendor_ids.as_deref() {
            ensure_unique_vendors(vendor_ids)?;
        }

        let txn = self.db.begin().await?;
        let comparison_id = existing.id;

        let vendor_count = match changes.vendor_ids.as_deref() {
            Some(vendor_ids) => vendor_ids.len(),
            None => ComparisonVendor::find()
                .filter(comparison_vendor::Column::ComparisonId.eq(comparison_id))
                .count(&txn)
                .await? as usize,
        };

        match changes.rows.as_deref() {
            Some(rows) => {
                validate_rows(rows, vendor_count)?;
                ensure_items_exist(&txn, rows).await?;
            }
            None if changes.vendor_ids.is_some() => {
                let stored: Vec<RowDraft> = load_rows(&txn, comparison_id)
                    .await?
                    .iter()
                    .map(row_draft_from_model)
                    .collect();
                validate_rows(&stored, vendor_count)?;
            }
            None => {}
        }

        if let Some(vendor_ids) = changes.vendor_ids.as_deref() {
            ensure_vendors_exist(&txn, vendor_ids).await?;
            ComparisonVendor::delete_many()
                .filter(comparison_vendor::Column::ComparisonId.eq(comparison_id))
                .exec(&txn)
                .await?;
            insert_vendor_links(&txn, comparison_id, vendor_ids).await?;
        }

        if let Some(rows) = changes.rows {
            ComparisonRow::delete_many()
                .filter(comparison_row::Column::ComparisonId.eq(comparison_id))
                .exec(&txn)
                .await?;
            insert_rows(&txn, comparison_id, rows).await?;
        }

        let mut active = existing.into_active_model();
        if let Some(request_number) = changes.request_number {
            active.request_number = Set(request_number);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(general_comments) = changes.general_comments {
            active.general_comments = Set(general_comments);
        }
        if let Some(purpose) = changes.purpose {
            active.purpose = Set(purpose);
        }
        active.updated_at = Set(Utc::now().into());
        let comparison = active.update(&txn).await?;

        let rows = load_rows(&txn, comparison_id).await?;
        let vendors = load_vendors(&txn, comparison_id).await?;
        txn.commit().await?;

        Ok(ComparisonDetail {
            comparison,
            rows,
            vendors,
        })
    }

    /// Writes a status change and its timestamps.
    pub async fn set_status(
        &self,
        existing: ComparisonModel,
        change: StatusChange,
    ) -> Result<ComparisonModel, RepositoryError> {
        let now = Utc::now();
        let mut active = existing.into_active_model();
        match change {
            StatusChange::Submitted => {
                active.status = Set(ComparisonStatus::Submitted);
                active.submitted_at = Set(Some(now.into()));
            }
            StatusChange::Approved { reviewer } => {
                active.status = Set(ComparisonStatus::Approved);
                active.reviewed_at = Set(Some(now.into()));
                active.reviewed_by = Set(Some(reviewer));
                active.rejection_reason = Set(None);
            }
            StatusChange::Rejected { reviewer, reason } => {
                active.status = Set(ComparisonStatus::Rejected);
                active.reviewed_at = Set(Some(now.into()));
                active.reviewed_by = Set(Some(reviewer));
                active.rejection_reason = Set(Some(reason));
            }
        }
        active.updated_at = Set(now.into());
        Ok(active.update(self.db).await?)
    }

    /// Removes attachments, rows and vendor links, then the comparison.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        Attachment::delete_many()
            .filter(attachment::Column::ComparisonId.eq(id))
            .exec(&txn)
            .await?;
        ComparisonRow::delete_many()
            .filter(comparison_row::Column::ComparisonId.eq(id))
            .exec(&txn)
            .await?;
        ComparisonVendor::delete_many()
            .filter(comparison_vendor::Column::ComparisonId.eq(id))
            .exec(&txn)
            .await?;
        let result = Comparison::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(COMPARISON_NOT_FOUND));
        }

        txn.commit().await?;
        Ok(())
    }
}

fn row_draft_from_model(row: &comparison_row::Model) -> RowDraft {
    RowDraft {
        item_id: row.item_id,
        description: row.description.clone(),
        uom: row.uom,
        quantities: comparison_row::decode_numbers(&row.quantities),
        prices: comparison_row::decode_numbers(&row.prices),
        selected_vendor_index: row.selected_vendor_index,
        remarks: row.remarks.clone(),
        comment: row.comment.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(quantities: &[f64], prices: &[f64]) -> RowDraft {
        RowDraft {
            item_id: Uuid::new_v4(),
            description: String::new(),
            uom: UnitOfMeasure::default(),
            quantities: quantities.to_vec(),
            prices: prices.to_vec(),
            selected_vendor_index: None,
            remarks: String::new(),
            comment: String::new(),
        }
    }

    #[test]
    fn request_number_uses_epoch_millis() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(default_request_number(now), "REQ-1700000000123");
    }

    #[test]
    fn qty_is_first_quantity_or_zero() {
        assert_eq!(draft(&[5.0, 7.0], &[]).qty(), 5.0);
        assert_eq!(draft(&[], &[]).qty(), 0.0);
    }

    #[test]
    fn rows_may_not_quote_more_vendors_than_selected() {
        assert!(validate_rows(&[draft(&[1.0, 2.0], &[3.0, 4.0])], 2).is_ok());
        assert!(validate_rows(&[draft(&[1.0], &[])], 2).is_ok());

        let err = validate_rows(&[draft(&[1.0], &[3.0]), draft(&[1.0, 2.0], &[])], 1).unwrap_err();
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn selected_vendor_index_must_point_at_a_vendor() {
        let mut row = draft(&[], &[]);
        row.selected_vendor_index = Some(1);
        assert!(validate_rows(std::slice::from_ref(&row), 2).is_ok());
        assert!(validate_rows(std::slice::from_ref(&row), 1).is_err());
        row.selected_vendor_index = Some(-1);
        assert!(validate_rows(&[row], 3).is_err());
    }

    #[test]
    fn duplicate_vendor_selection_is_rejected() {
        let id = Uuid::new_v4();
        assert!(ensure_unique_vendors(&[id, Uuid::new_v4()]).is_ok());
        assert!(ensure_unique_vendors(&[id, id]).is_err());
    }
}
