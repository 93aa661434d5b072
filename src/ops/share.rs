/// Build the shareable link for a list: `{origin}/edit/{id}`.
pub fn share_url(origin: &str, list_id: &str) -> String {
    format!("{}/edit/{}", origin.trim_end_matches('/'), list_id)
}
