/// HTTP client for the Pinboard API
///
/// Thin typed wrappers over the server's endpoints. The client holds the
/// bearer token after `register` or `login` and attaches it to every
/// subsequent request.
///
/// # Example
///
/// ```no_run
/// use pinboard_client::api::ApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = ApiClient::new("http://localhost:8080");
/// client.login("user@example.com", "secret").await?;
///
/// for board in client.list_boards().await? {
///     println!("{}: {}", board.id, board.name);
/// }
/// # Ok(())
/// # }
/// ```

use pinboard_shared::models::board::{BoardDetail, BoardSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection, TLS, decoding)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-provided message, if any
        message: String,
    },

    /// An authenticated call was made before register/login
    #[error("Not authenticated")]
    NotAuthenticated,
}

/// Wire shape of the server's error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Wire shape of the token issued by register/login
#[derive(Debug, Deserialize)]
struct TokenBody {
    token: String,
}

/// Card details including comments, as returned by `GET /cards/:id/details`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardDetails {
    /// Card ID
    pub id: Uuid,

    /// Owning list
    pub list_id: Uuid,

    /// Card text
    pub content: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional due date (ISO 8601 date)
    pub due_date: Option<chrono::NaiveDate>,

    /// Position within the list
    pub position: i32,

    /// Comments, oldest first
    pub comments: Vec<CommentView>,
}

/// A comment joined with its author's email
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentView {
    /// Comment ID
    pub id: Uuid,

    /// Comment text
    pub text: String,

    /// Author's email
    pub email: String,

    /// When the comment was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Typed HTTP client for the Pinboard API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client against a server base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// The server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token, once authenticated
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The underlying HTTP client
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(req.bearer_auth(token))
    }

    /// Turns a non-success response into `ClientError::Api`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Registers a new account and stores the issued token
    pub async fn register(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: TokenBody = Self::check(response).await?.json().await?;
        self.token = Some(body.token);

        Ok(())
    }

    /// Logs in and stores the issued token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: TokenBody = Self::check(response).await?.json().await?;
        self.token = Some(body.token);

        Ok(())
    }

    /// Lists the caller's boards
    pub async fn list_boards(&self) -> Result<Vec<BoardSummary>, ClientError> {
        let response = self
            .authed(self.http.get(self.url("/boards")))?
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Creates a board owned by the caller
    pub async fn create_board(&self, name: &str) -> Result<BoardSummary, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/boards")))?
            .json(&json!({ "name": name }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetches the full board snapshot
    pub async fn fetch_board(&self, board_id: Uuid) -> Result<BoardDetail, ClientError> {
        let response = self
            .authed(self.http.get(self.url(&format!("/boards/{}", board_id))))?
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Invites a user to a board by email
    pub async fn invite_member(&self, board_id: Uuid, email: &str) -> Result<(), ClientError> {
        let response = self
            .authed(
                self.http
                    .post(self.url(&format!("/boards/{}/members", board_id))),
            )?
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Appends a list to a board
    pub async fn create_list(&self, board_id: Uuid, name: &str) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.post(self.url("/lists")))?
            .json(&json!({ "board_id": board_id, "name": name }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Deletes a list
    pub async fn delete_list(&self, list_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.delete(self.url(&format!("/lists/{}", list_id))))?
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Reorders a board's lists to the given order
    pub async fn reorder_lists(
        &self,
        board_id: Uuid,
        ordered_list_ids: &[Uuid],
    ) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.put(self.url("/lists/reorder")))?
            .json(&json!({ "boardId": board_id, "orderedListIds": ordered_list_ids }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Appends a card to a list
    pub async fn create_card(&self, list_id: Uuid, content: &str) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.post(self.url("/cards")))?
            .json(&json!({ "list_id": list_id, "content": content }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Deletes a card
    pub async fn delete_card(&self, card_id: Uuid) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.delete(self.url(&format!("/cards/{}", card_id))))?
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Moves a card to a list and position
    pub async fn move_card(
        &self,
        card_id: Uuid,
        new_list_id: Uuid,
        new_position: i32,
    ) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.put(self.url("/cards/move")))?
            .json(&json!({
                "cardId": card_id,
                "newListId": new_list_id,
                "newPosition": new_position,
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Fetches a card with its comments
    pub async fn card_details(&self, card_id: Uuid) -> Result<CardDetails, ClientError> {
        let response = self
            .authed(
                self.http
                    .get(self.url(&format!("/cards/{}/details", card_id))),
            )?
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Applies a partial update to a card's details
    ///
    /// Only keys present in `fields` are sent; a JSON null clears
    /// description or due date.
    pub async fn update_card_details(
        &self,
        card_id: Uuid,
        fields: serde_json::Value,
    ) -> Result<(), ClientError> {
        let response = self
            .authed(
                self.http
                    .put(self.url(&format!("/cards/{}/details", card_id))),
            )?
            .json(&fields)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Adds a comment to a card
    pub async fn add_comment(&self, card_id: Uuid, text: &str) -> Result<CommentView, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/comments")))?
            .json(&json!({ "card_id": card_id, "text": text }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/boards"), "http://localhost:8080/boards");
    }

    #[test]
    fn test_unauthenticated_calls_fail_fast() {
        let client = ApiClient::new("http://localhost:8080");
        let result = client.authed(client.http.get("http://localhost:8080/boards"));
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }
}
