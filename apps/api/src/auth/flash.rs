//! One-shot, category-tagged messages shown on the next rendered page.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashCategory {
    #[serde(rename = "reg_error")]
    Registration,
    #[serde(rename = "login_error")]
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Drains every queued flash, returning the messages of `category` in the
/// order they were queued.
pub fn drain_category(queue: &mut Vec<Flash>, category: FlashCategory) -> Vec<String> {
    queue
        .drain(..)
        .filter(|f| f.category == category)
        .map(|f| f.message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flash(category: FlashCategory, message: &str) -> Flash {
        Flash {
            category,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_drain_keeps_order_and_empties_queue() {
        let mut queue = vec![
            flash(FlashCategory::Registration, "first"),
            flash(FlashCategory::Login, "other"),
            flash(FlashCategory::Registration, "second"),
        ];
        let msgs = drain_category(&mut queue, FlashCategory::Registration);
        assert_eq!(msgs, vec!["first", "second"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_category_serializes_with_wire_names() {
        let json = serde_json::to_string(&flash(FlashCategory::Login, "x")).unwrap();
        assert!(json.contains("\"login_error\""));
    }
}
