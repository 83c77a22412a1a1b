//! User directory API.

use serde_json::Value;
use std::sync::Arc;

use crate::{
    client::HelperClientInner,
    error::{Error, Result},
    models::{User, UserId},
};

/// Fields requested from the user directory.
pub const USER_FIELDS: &str = "userId,email,handle,firstName,lastName";

/// API for user lookups.
pub struct UserApi {
    client: Arc<HelperClientInner>,
}

impl UserApi {
    pub(crate) fn new(client: Arc<HelperClientInner>) -> Self {
        Self { client }
    }

    /// Look up users by ID.
    ///
    /// Returns `result.content` as sent by the server, normally an array of
    /// user records in server order. An empty `ids` still issues the request,
    /// with an empty filter.
    pub async fn by_ids<I>(&self, ids: I) -> Result<Value>
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        let ids: Vec<UserId> = ids.into_iter().map(Into::into).collect();
        let url = self
            .client
            .api
            .users_url(USER_FIELDS, &filter_query(&ids))?;

        self.client
            .get_authed(url, &failure_context(&ids), None)
            .await
    }

    /// Look up users by ID and decode them into [`User`] records.
    ///
    /// A payload that is not an array of user records is a lookup failure.
    pub async fn records<I>(&self, ids: I) -> Result<Vec<User>>
    where
        I: IntoIterator,
        I::Item: Into<UserId>,
    {
        let ids: Vec<UserId> = ids.into_iter().map(Into::into).collect();
        let content = self.by_ids(ids.iter()).await?;

        serde_json::from_value(content)
            .map_err(|e| Error::lookup(failure_context(&ids), None, None).with_source(e.into()))
    }
}

/// `id=a OR id=b OR ...`, in input order, duplicates kept.
pub fn filter_query(ids: &[UserId]) -> String {
    ids.iter()
        .map(|id| format!("id={}", id))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn failure_context(ids: &[UserId]) -> String {
    let list = ids.iter().map(UserId::as_str).collect::<Vec<_>>().join(",");
    format!("Failed to get users by ids: {}", list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{client, FakeTokens, FakeTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn filter_of(url: &url::Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "filter")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_filter_query_order() {
        let ids: Vec<UserId> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(filter_query(&ids), "id=a OR id=b OR id=c");
    }

    #[test]
    fn test_filter_query_keeps_duplicates() {
        let ids: Vec<UserId> = vec![7.into(), 7.into()];
        assert_eq!(filter_query(&ids), "id=7 OR id=7");
    }

    #[test]
    fn test_filter_query_empty() {
        assert_eq!(filter_query(&[]), "");
    }

    #[tokio::test]
    async fn test_by_ids_request() {
        let transport = FakeTransport::answering(
            200,
            r#"{"result":{"success":true,"content":[{"userId":1,"handle":"a"}]}}"#,
        );
        let client = client(FakeTokens::ok("tok"), transport.clone());

        let users = client.users().by_ids([1, 2]).await.unwrap();
        assert_eq!(users, json!([{"userId": 1, "handle": "a"}]));

        let url = transport.last().url;
        assert_eq!(url.path(), "/v3/users");
        assert_eq!(filter_of(&url), "id=1 OR id=2");
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "fields" && v == USER_FIELDS));
    }

    #[tokio::test]
    async fn test_empty_ids_still_calls() {
        let transport =
            FakeTransport::answering(200, r#"{"result":{"success":true,"content":[]}}"#);
        let client = client(FakeTokens::ok("tok"), transport.clone());

        let users = client.users().by_ids(Vec::<UserId>::new()).await.unwrap();
        assert_eq!(users, json!([]));
        assert_eq!(transport.calls(), 1);
        assert_eq!(filter_of(&transport.last().url), "");
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope() {
        let transport = FakeTransport::answering(200, r#"{"result":{"success":false}}"#);
        let client = client(FakeTokens::ok("tok"), transport);

        let err = client.users().by_ids(["11", "22"]).await.unwrap_err();
        assert!(err.is_lookup_failure());
        assert_eq!(err.to_string(), "Failed to get users by ids: 11,22.");
    }

    #[tokio::test]
    async fn test_server_message_included() {
        let transport = FakeTransport::answering(
            400,
            r#"{"result":{"success":false,"content":{"message":"X"}}}"#,
        );
        let client = client(FakeTokens::ok("tok"), transport);

        let err = client.users().by_ids(["11"]).await.unwrap_err();
        assert!(err.to_string().contains("X"));
        assert_eq!(err.server_message(), Some("X"));
    }

    #[tokio::test]
    async fn test_token_failure() {
        let transport = FakeTransport::answering(200, "{}");
        let client = client(FakeTokens::failing("denied"), transport.clone());

        let err = client.users().by_ids(["11"]).await.unwrap_err();
        assert!(err.is_token_failure());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_records() {
        let transport = FakeTransport::answering(
            200,
            r#"{"result":{"success":true,"content":[
                {"userId":305384,"email":"a@b.c","handle":"heffan","firstName":"F","lastName":"L"}
            ]}}"#,
        );
        let client = client(FakeTokens::ok("tok"), transport);

        let users = client.users().records([305384]).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, UserId::new("305384"));
        assert_eq!(users[0].handle.as_deref(), Some("heffan"));
    }

    #[tokio::test]
    async fn test_records_wrong_shape() {
        let transport = FakeTransport::answering(
            200,
            r#"{"result":{"success":true,"content":{"unexpected":true}}}"#,
        );
        let client = client(FakeTokens::ok("tok"), transport);

        let err = client.users().records([1]).await.unwrap_err();
        assert!(err.is_lookup_failure());
    }
}
