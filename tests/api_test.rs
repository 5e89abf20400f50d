use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, redirect::Policy};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use spotify_showcase::{
    config::Config,
    error::UpstreamError,
    server::{self, AppState, TokenSlot},
    spotify::SpotifyApi,
    types::{CurrentlyPlaying, SpotifyAlbum, SpotifyArtist, SpotifyTrack, Token},
};

/// In-memory stand-in for Spotify with one canned result per operation.
struct FakeSpotify {
    access_token: Result<String, UpstreamError>,
    exchange: Result<Token, UpstreamError>,
    now_playing: Result<Option<CurrentlyPlaying>, UpstreamError>,
    top_tracks: Result<Vec<Option<SpotifyTrack>>, UpstreamError>,
    pause: Result<(), UpstreamError>,
    play: Result<(), UpstreamError>,
    played: StdMutex<Vec<String>>,
}

impl Default for FakeSpotify {
    fn default() -> Self {
        FakeSpotify {
            access_token: Ok("access".to_string()),
            exchange: Ok(Token {
                access_token: "fresh-access".to_string(),
                refresh_token: Some("long-lived-refresh".to_string()),
                scope: "user-top-read".to_string(),
                expires_in: 3600,
                obtained_at: 1_700_000_000,
            }),
            now_playing: Ok(Some(playing("track", Some(track("Current Song"))))),
            top_tracks: Ok(vec![Some(track("Top One")), None, Some(track("Top Two"))]),
            pause: Ok(()),
            play: Ok(()),
            played: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(&self, _code: &str) -> Result<Token, UpstreamError> {
        self.exchange.clone()
    }

    async fn refresh_access_token(&self) -> Result<String, UpstreamError> {
        self.access_token.clone()
    }

    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, UpstreamError> {
        assert_eq!(access_token, "access");
        self.now_playing.clone()
    }

    async fn top_tracks(
        &self,
        access_token: &str,
    ) -> Result<Vec<Option<SpotifyTrack>>, UpstreamError> {
        assert_eq!(access_token, "access");
        self.top_tracks.clone()
    }

    async fn pause(&self, _access_token: &str) -> Result<(), UpstreamError> {
        self.pause.clone()
    }

    async fn play(&self, _access_token: &str, track_uri: &str) -> Result<(), UpstreamError> {
        self.played.lock().unwrap().push(track_uri.to_string());
        self.play.clone()
    }
}

fn track(name: &str) -> SpotifyTrack {
    SpotifyTrack {
        name: Some(name.to_string()),
        artists: vec![
            SpotifyArtist {
                name: "Artist A".to_string(),
            },
            SpotifyArtist {
                name: "Artist B".to_string(),
            },
        ],
        album: Some(SpotifyAlbum {
            name: Some("Album".to_string()),
            images: vec![],
        }),
        external_urls: None,
        uri: Some(format!("spotify:track:{}", name.to_lowercase().replace(' ', ""))),
        duration_ms: Some(240_000),
    }
}

fn playing(kind: &str, item: Option<SpotifyTrack>) -> CurrentlyPlaying {
    CurrentlyPlaying {
        is_playing: true,
        progress_ms: Some(12_345),
        currently_playing_type: Some(kind.to_string()),
        item,
    }
}

fn spotify_error(status: StatusCode, reason: &str) -> UpstreamError {
    let body = json!({
        "error": { "status": status.as_u16(), "message": "Player command failed", "reason": reason }
    });
    UpstreamError::from_body(status, &body.to_string())
}

fn test_config() -> Config {
    let mut config = Config::new("client", "secret", "http://127.0.0.1/callback");
    config.refresh_token = Some("refresh".to_string());
    config.cors_origin = "https://portfolio.example".to_string();
    config
}

struct TestServer {
    base: String,
    http: Client,
    token_slot: TokenSlot,
    fake: Arc<FakeSpotify>,
}

async fn spawn(fake: FakeSpotify) -> TestServer {
    spawn_with_config(fake, test_config()).await
}

async fn spawn_with_config(fake: FakeSpotify, config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let fake = Arc::new(fake);
    let state = AppState::new(Arc::new(config), fake.clone());
    let token_slot = TokenSlot::default();

    tokio::spawn(server::serve(listener, state, token_slot.clone()));

    TestServer {
        base: format!("http://{}", addr),
        http: Client::builder().redirect(Policy::none()).build().unwrap(),
        token_slot,
        fake,
    }
}

impl TestServer {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.get(path).await;
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

fn assert_cors(res: &reqwest::Response) {
    let headers = res.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://portfolio.example"
    );
    assert_eq!(headers["access-control-allow-methods"], "GET");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn test_preflight_returns_empty_ok_with_cors() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server
        .http
        .request(Method::OPTIONS, format!("{}/spotify", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(&res);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unusable_origin_is_not_widened() {
    let mut config = test_config();
    config.cors_origin = "https://portfolio\u{7f}.example".to_string();
    let server = spawn_with_config(FakeSpotify::default(), config).await;

    let res = server.get("/spotify").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.headers()["access-control-allow-methods"], "GET");
}

#[tokio::test]
async fn test_non_get_is_rejected() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server
        .http
        .post(format!("{}/spotify", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET");
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Method Not Allowed" }));
}

#[tokio::test]
async fn test_token_failure_is_fatal() {
    let server = spawn(FakeSpotify {
        access_token: Err(UpstreamError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid refresh token"}"#,
        )),
        ..Default::default()
    })
    .await;

    let res = server.get("/spotify").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&res);

    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "An internal server error occurred.",
            "error": "Failed to get access token from Spotify."
        })
    );
}

#[tokio::test]
async fn test_overview_shape() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server.get("/spotify").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_cors(&res);
    assert_eq!(
        res.headers()["cache-control"],
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(res.headers()["content-type"], "application/json");

    let text = res.text().await.unwrap();
    // Pretty-printed body
    assert!(text.contains("\n  \"now_playing\""));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        body["now_playing"],
        json!({
            "is_playing": true,
            "track": {
                "name": "Current Song",
                "artist": "Artist A, Artist B",
                "album": "Album",
                "uri": "spotify:track:currentsong"
            },
            "progress_ms": 12345,
            "duration_ms": 240000
        })
    );

    let names: Vec<&str> = body["top_tracks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Top One", "Top Two"]);
}

#[tokio::test]
async fn test_controls_follow_forwarded_proto_host_and_path() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server
        .http
        .get(format!("{}/api/spotify", server.base))
        .header("x-forwarded-proto", "https")
        .header("host", "portfolio.example")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();

    assert_eq!(
        body["controls"],
        json!({
            "stop_playback_url": "https://portfolio.example/api/spotify?action=stop",
            "play_track_base_url": "https://portfolio.example/api/spotify?action=play&track_uri="
        })
    );

    let (_, body) = server.get_json("/spotify").await;
    let stop_url = body["controls"]["stop_playback_url"].as_str().unwrap();
    assert_eq!(stop_url, format!("{}/spotify?action=stop", server.base));
}

#[tokio::test]
async fn test_nothing_playing() {
    let server = spawn(FakeSpotify {
        now_playing: Ok(None),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["now_playing"],
        json!({ "is_playing": false, "message": "Nothing is currently playing." })
    );
}

#[tokio::test]
async fn test_episode_is_reported_without_track() {
    let server = spawn(FakeSpotify {
        now_playing: Ok(Some(playing("episode", Some(track("Podcast Episode"))))),
        ..Default::default()
    })
    .await;

    let (_, body) = server.get_json("/spotify").await;
    assert_eq!(
        body["now_playing"],
        json!({
            "is_playing": true,
            "type": "episode",
            "message": "Currently playing episode, not a track."
        })
    );
}

#[tokio::test]
async fn test_ad_without_item_is_null() {
    let server = spawn(FakeSpotify {
        now_playing: Ok(Some(playing("ad", None))),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["now_playing"], Value::Null);
    assert_eq!(body["top_tracks"][0]["name"], "Top One");
}

#[tokio::test]
async fn test_top_tracks_failure_is_isolated() {
    let server = spawn(FakeSpotify {
        top_tracks: Err(UpstreamError::Transport("connection reset".into())),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["now_playing"]["track"]["name"], "Current Song");
    assert_eq!(
        body["top_tracks"],
        json!({ "error": "Could not fetch top tracks." })
    );
}

#[tokio::test]
async fn test_now_playing_failure_is_isolated() {
    let server = spawn(FakeSpotify {
        now_playing: Err(spotify_error(StatusCode::SERVICE_UNAVAILABLE, "UNKNOWN")),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["now_playing"],
        json!({ "error": "Could not fetch currently playing status." })
    );
    assert_eq!(body["top_tracks"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stop_without_device() {
    let server = spawn(FakeSpotify {
        pause: Err(spotify_error(StatusCode::NOT_FOUND, "NO_ACTIVE_DEVICE")),
        ..Default::default()
    })
    .await;

    let res = server.get("/spotify?action=stop").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_cors(&res);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "message": "No active Spotify device found to stop." })
    );
}

#[tokio::test]
async fn test_stop_when_already_paused() {
    let server = spawn(FakeSpotify {
        pause: Err(spotify_error(StatusCode::FORBIDDEN, "PLAYER_COMMAND_FAILED")),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify?action=stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Playback is likely already stopped or command failed."
    );
}

#[tokio::test]
async fn test_stop_other_failure_passes_status_and_details() {
    let server = spawn(FakeSpotify {
        pause: Err(spotify_error(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")),
        ..Default::default()
    })
    .await;

    let (status, body) = server.get_json("/spotify?action=stop").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "Failed to stop playback.");
    assert_eq!(body["details"]["reason"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_play_requires_premium() {
    let server = spawn(FakeSpotify {
        play: Err(spotify_error(StatusCode::FORBIDDEN, "PREMIUM_REQUIRED")),
        ..Default::default()
    })
    .await;

    let (status, body) = server
        .get_json("/spotify?action=play&track_uri=spotify:track:abc")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Spotify Premium is required to control playback remotely."
    );
    assert_eq!(
        *server.fake.played.lock().unwrap(),
        vec!["spotify:track:abc".to_string()]
    );
}

#[tokio::test]
async fn test_play_success_and_missing_uri() {
    let server = spawn(FakeSpotify::default()).await;

    let (status, body) = server
        .get_json("/spotify?action=play&track_uri=spotify%3Atrack%3Aabc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Attempting to play track: spotify:track:abc" })
    );

    // Without a track URI the request falls through to the overview
    let (status, body) = server.get_json("/spotify?action=play").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("controls").is_some());
    assert_eq!(server.fake.played.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_play_no_active_device() {
    let server = spawn(FakeSpotify {
        play: Err(spotify_error(StatusCode::NOT_FOUND, "NO_ACTIVE_DEVICE")),
        ..Default::default()
    })
    .await;

    let (status, body) = server
        .get_json("/api/spotify?action=play&track_uri=spotify:track:abc")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "No active Spotify device found to play on. Start playing on a device first!"
    );
}

#[tokio::test]
async fn test_login_redirects_to_spotify() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server.get("/login").await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let location = res.headers()["location"].to_str().unwrap();
    let url = reqwest::Url::parse(location).unwrap();
    assert_eq!(url.host_str(), Some("accounts.spotify.com"));

    let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["client_id"], "client");
    assert_eq!(query["redirect_uri"], "http://127.0.0.1/callback");
    assert!(query["scope"].contains("user-modify-playback-state"));
}

#[tokio::test]
async fn test_callback_error_parameter() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server.get("/callback?error=access_denied").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let html = res.text().await.unwrap();
    assert!(html.contains("Callback Error"));
    assert!(html.contains("access_denied"));

    let res = server
        .get("/callback?error=%3Cscript%3E&code=ignored")
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let html = res.text().await.unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(server.token_slot.lock().await.is_none());
}

#[tokio::test]
async fn test_callback_without_code() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server.get("/callback").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(
        res.text()
            .await
            .unwrap()
            .contains("No authorization code received from Spotify.")
    );
}

#[tokio::test]
async fn test_callback_success_shows_refresh_token() {
    let server = spawn(FakeSpotify::default()).await;

    let res = server.get("/api/callback?code=abc").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("long-lived-refresh"));
    assert!(html.contains("fresh-access"));
    assert!(html.contains("SPOTIFY_REFRESH_TOKEN"));
    assert!(html.contains("expires 2023-11-14 22:53:20 UTC"));

    let token = server.token_slot.lock().await.clone().unwrap();
    assert_eq!(token.refresh_token.as_deref(), Some("long-lived-refresh"));
}

#[tokio::test]
async fn test_callback_with_out_of_range_expiry() {
    let server = spawn(FakeSpotify {
        exchange: Ok(Token {
            access_token: "fresh-access".to_string(),
            refresh_token: Some("long-lived-refresh".to_string()),
            scope: "user-top-read".to_string(),
            expires_in: u64::MAX,
            obtained_at: 1_700_000_000,
        }),
        ..Default::default()
    })
    .await;

    let res = server.get("/callback?code=abc").await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    assert!(html.contains("long-lived-refresh"));
    assert!(html.contains("expires ): fresh-access"));
}

#[tokio::test]
async fn test_callback_exchange_failure() {
    let server = spawn(FakeSpotify {
        exchange: Err(UpstreamError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
        )),
        ..Default::default()
    })
    .await;

    let res = server.get("/callback?code=expired").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = res.text().await.unwrap();
    assert!(html.contains("Error Getting Token"));
    assert!(html.contains("invalid_grant: Invalid authorization code"));
}

#[tokio::test]
async fn test_health() {
    let server = spawn(FakeSpotify::default()).await;

    let (status, body) = server.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// Upstream whose token refresh panics mid-request.
struct PanickingSpotify;

#[async_trait]
impl SpotifyApi for PanickingSpotify {
    async fn exchange_code(&self, _code: &str) -> Result<Token, UpstreamError> {
        unimplemented!()
    }

    async fn refresh_access_token(&self) -> Result<String, UpstreamError> {
        panic!("token cache poisoned")
    }

    async fn currently_playing(
        &self,
        _access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, UpstreamError> {
        unimplemented!()
    }

    async fn top_tracks(
        &self,
        _access_token: &str,
    ) -> Result<Vec<Option<SpotifyTrack>>, UpstreamError> {
        unimplemented!()
    }

    async fn pause(&self, _access_token: &str) -> Result<(), UpstreamError> {
        unimplemented!()
    }

    async fn play(&self, _access_token: &str, _track_uri: &str) -> Result<(), UpstreamError> {
        unimplemented!()
    }
}

#[tokio::test]
async fn test_handler_panic_becomes_internal_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(Arc::new(test_config()), Arc::new(PanickingSpotify));
    tokio::spawn(server::serve(listener, state, TokenSlot::default()));

    let res = reqwest::get(format!("http://{}/api/spotify", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "An internal server error occurred.",
            "error": "token cache poisoned"
        })
    );

    // The server keeps serving after the panic
    let res = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
