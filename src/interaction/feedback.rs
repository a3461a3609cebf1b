//! Recording user feedback.

use tracing::{info, instrument};

use crate::{
    base::types::{FeedbackEntry, Res},
    service::feedback::FeedbackStore,
};

/// Message returned to the user after feedback is stored.
pub const FEEDBACK_THANKS: &str = "Thank you! Your feedback has been received and added to the improvement list.";

/// Store a feedback message with an optional contact, returning the number of retained entries.
#[instrument(skip_all)]
pub async fn submit_feedback(message: &str, contact: Option<&str>, store: &FeedbackStore) -> Res<usize> {
    let entry = FeedbackEntry::new(message, contact);
    let total = store.record(entry).await?;

    info!("Feedback received ({total} retained).");

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn feedback_without_contact_is_stored() {
        let store = FeedbackStore::memory(500);

        let total = submit_feedback("  Love the SSN guide  ", None, &store).await.unwrap();
        assert_eq!(total, 1);

        let entries = store.list().await.unwrap();
        assert_eq!(entries[0].message, "Love the SSN guide");
        assert!(entries[0].contact.is_none());
    }
}
