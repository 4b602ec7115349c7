use super::entity::CatalogItem;
use crate::domain::{DomainError, DomainResult};

/// Validates the invariants a CatalogItem must satisfy before it is persisted
pub fn validate_catalog_item(item: &CatalogItem) -> DomainResult<()> {
    validate_id(item.id)?;
    validate_title(&item.title)?;
    validate_dates(item)?;
    Ok(())
}

/// External IDs are positive
fn validate_id(id: i64) -> DomainResult<()> {
    if id <= 0 {
        return Err(DomainError::InvariantViolation(format!(
            "Catalog item id must be positive, got {}",
            id
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Catalog item title cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Both dates are optional; if both are present, start <= end
fn validate_dates(item: &CatalogItem) -> DomainResult<()> {
    if let (Some(from), Some(to)) = (item.aired_from, item.aired_to) {
        if from > to {
            return Err(DomainError::InvariantViolation(format!(
                "Aired-from {} is after aired-to {}",
                from, to
            )));
        }
    }
    Ok(())
}
