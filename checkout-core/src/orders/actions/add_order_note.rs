//! AddOrderNote command handler
//!
//! Appends to the order's append-only note trail.

use crate::error::OrderError;
use crate::orders::context::{CommandContext, CommandHandler};
use async_trait::async_trait;

/// AddOrderNote action
#[derive(Debug, Clone)]
pub struct AddOrderNoteAction {
    pub order_id: String,
    pub note: String,
}

#[async_trait]
impl CommandHandler for AddOrderNoteAction {
    type Output = ();

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        if self.note.trim().is_empty() {
            return Err(OrderError::validation("Note text cannot be empty"));
        }
        let mut order = ctx.order(&self.order_id).await?;
        order.add_note(self.note.clone());
        ctx.store.update_order(&order).await?;
        Ok(())
    }
}
