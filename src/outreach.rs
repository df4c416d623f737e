//! Outreach queue assignment, delegated to a database function.

use serde_json::json;
use tracing::info;

use crate::error::SupabaseError;
use crate::supabase::SupabaseClient;

/// Database function that distributes a chapter's outreach queue.
pub const ASSIGN_QUEUE_RPC: &str = "assign_outreach_queue";

/// Assign the outreach queue for `chapter_id`, returning the function's result.
pub async fn assign_queue(
    client: &SupabaseClient,
    chapter_id: &str,
) -> Result<serde_json::Value, SupabaseError> {
    let data = client
        .rpc(ASSIGN_QUEUE_RPC, &json!({ "p_chapter_id": chapter_id }))
        .await?;
    info!(chapter_id, "Outreach queue assigned");
    Ok(data)
}
