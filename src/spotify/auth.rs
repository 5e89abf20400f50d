use chrono::Utc;
use reqwest::{Client, header::AUTHORIZATION};

use crate::{
    config::Config,
    error::UpstreamError,
    types::{Token, TokenResponse},
    utils,
};

use super::check_status;

/// Exchanges an authorization code for an access token and a refresh token.
///
/// Completes the authorization-code grant started by `/login`. The client
/// authenticates with HTTP Basic credentials built from the configured client
/// id and secret, and the `redirect_uri` must be the exact value used when the
/// authorization URL was built.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `config` - Credentials and the token endpoint URL
/// * `code` - Authorization code received on `/callback`
///
/// # Returns
///
/// - `Ok(Token)` - Access token, refresh token, scope and expiry
/// - `Err(UpstreamError)` - Network failure, non-2xx answer or malformed body
///
/// # Notes
///
/// The code is single-use and expires after a few minutes, so the exchange
/// happens immediately inside the callback request.
pub async fn exchange_code(
    client: &Client,
    config: &Config,
    code: &str,
) -> Result<Token, UpstreamError> {
    request_token(
        client,
        config,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
        ],
    )
    .await
}

/// Exchanges a refresh token for a new access token.
///
/// Spotify may or may not rotate the refresh token; when it does not, the
/// returned [`Token`] carries `None` and the configured one stays valid.
///
/// # Example
///
/// ```
/// let token = refresh_token(&client, &config, "AQC...").await?;
/// println!("expires in {}s", token.expires_in);
/// ```
pub async fn refresh_token(
    client: &Client,
    config: &Config,
    refresh_token: &str,
) -> Result<Token, UpstreamError> {
    request_token(
        client,
        config,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

async fn request_token(
    client: &Client,
    config: &Config,
    form: &[(&str, &str)],
) -> Result<Token, UpstreamError> {
    let response = client
        .post(&config.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(&config.client_id, &config.client_secret),
        )
        .form(form)
        .send()
        .await?;

    let json = check_status(response).await?.json::<TokenResponse>().await?;

    Ok(Token {
        access_token: json.access_token,
        refresh_token: json.refresh_token,
        scope: json.scope,
        expires_in: json.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
