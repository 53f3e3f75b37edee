//! Client-side checks for the list reordering endpoints.

use std::collections::HashSet;

use super::error::DomainError;

/// Position chosen for a single item within a list of `current_max` entries.
///
/// Accepts `0..current_max`; anything else is rejected with the same message
/// the list screen shows next to the order input.
pub fn validate_direct_order(new_order: i64, current_max: usize) -> Result<i64, DomainError> {
    let upper = i64::try_from(current_max).unwrap_or(i64::MAX);
    if new_order < 0 || new_order >= upper {
        return Err(DomainError::validation(out_of_range_message(current_max)));
    }
    Ok(new_order)
}

/// A bulk reorder must name every item at most once.
pub fn validate_bulk_order(ids: &[i64]) -> Result<(), DomainError> {
    if ids.is_empty() {
        return Err(DomainError::validation("순서를 변경할 항목이 없습니다."));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(duplicate) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(DomainError::validation(format!(
            "중복된 항목이 있습니다: {duplicate}"
        )));
    }
    Ok(())
}

fn out_of_range_message(current_max: usize) -> String {
    // Matches the UI text even for an empty list, where the bound reads -1.
    let last = i64::try_from(current_max).unwrap_or(i64::MAX) - 1;
    format!("0~{last} 사이의 값을 입력")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_order_accepts_bounds() {
        assert_eq!(validate_direct_order(0, 5).expect("lower bound"), 0);
        assert_eq!(validate_direct_order(4, 5).expect("upper bound"), 4);
    }

    #[test]
    fn direct_order_rejects_out_of_range_with_ui_message() {
        let err = validate_direct_order(7, 5).expect_err("out of range");
        assert_eq!(err.to_string(), "0~4 사이의 값을 입력");

        let err = validate_direct_order(-1, 5).expect_err("negative");
        assert_eq!(err.to_string(), "0~4 사이의 값을 입력");
    }

    #[test]
    fn empty_list_rejects_everything() {
        let err = validate_direct_order(0, 0).expect_err("empty list");
        assert_eq!(err.to_string(), "0~-1 사이의 값을 입력");
    }

    #[test]
    fn bulk_order_rejects_duplicates() {
        assert!(validate_bulk_order(&[3, 1, 2]).is_ok());
        assert!(validate_bulk_order(&[]).is_err());
        let err = validate_bulk_order(&[1, 2, 1]).expect_err("duplicate");
        assert!(err.to_string().contains('1'));
    }
}
