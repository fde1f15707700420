//! OAuth2 authorization code flow for pCloud.

use reqwest::{Client, Url};
use tracing::debug;

use crate::client::decode_response;
use crate::endpoint::ApiEndpoint;
use crate::error::Result;
use crate::models::TokenResponse;

/// pCloud OAuth2 authorization page.
const AUTHORIZE_URL: &str = "https://my.pcloud.com/oauth2/authorize";

/// Build the URL the user opens to authorize the app.
///
/// # Arguments
/// * `client_id` - The OAuth client id of the app
/// * `redirect_uri` - Where pCloud sends the user back with the code
pub fn build_authorization_url(client_id: &str, redirect_uri: Option<&str>) -> Url {
    let mut url = Url::parse(AUTHORIZE_URL).expect("Invalid authorize URL");
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code");
        if let Some(uri) = redirect_uri.filter(|uri| !uri.is_empty()) {
            query.append_pair("redirect_uri", uri);
        }
    }
    url
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code_for_token(
    client_id: &str,
    client_secret: &str,
    code: &str,
    endpoint: ApiEndpoint,
) -> Result<String> {
    exchange_code_for_token_at(endpoint.base_url(), client_id, client_secret, code).await
}

/// Same as [`exchange_code_for_token`], against an explicit API base URL.
pub async fn exchange_code_for_token_at(
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<String> {
    let token = exchange_code_at(base_url, client_id, client_secret, code).await?;
    Ok(token.access_token)
}

/// Exchange an authorization code and return the whole token payload.
///
/// Besides the token, pCloud reports the account's `locationid`, which
/// tells which [`ApiEndpoint`] the token is valid for.
pub async fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    endpoint: ApiEndpoint,
) -> Result<TokenResponse> {
    exchange_code_at(endpoint.base_url(), client_id, client_secret, code).await
}

/// Same as [`exchange_code`], against an explicit API base URL.
pub async fn exchange_code_at(
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenResponse> {
    let url = format!("{}/oauth2_token", base_url.trim_end_matches('/'));
    debug!(%url, client_id, "Exchanging authorization code");

    let response = Client::new()
        .get(&url)
        .query(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
        ])
        .send()
        .await?;

    decode_response(response).await?.into_parsed()
}
