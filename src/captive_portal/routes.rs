//! HTTP 路由表
//!
//! 与具体 HTTP 服务器无关，设备端由 `handlers` 注册到 `EspHttpServer`。

use std::borrow::Cow;

use http::{Method, StatusCode};
use serde::Serialize;

use super::form::{Credentials, FormError, MAX_FORM_LEN};
use super::html;
use super::store::CredentialStore;
use crate::config::PORTAL_URL;

const TEXT_HTML: &str = "text/html";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// `MAX_FORM_LEN` 加一，读取请求体时用来判断是否超长
pub const BODY_READ_LIMIT: usize = MAX_FORM_LEN + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub location: Option<&'static str>,
    pub body: Cow<'static, [u8]>,
}

impl Response {
    fn new(status: StatusCode, content_type: &'static str, body: impl Into<Cow<'static, [u8]>>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            location: None,
            body: body.into(),
        }
    }

    fn redirect(location: &'static str) -> Self {
        Self {
            status: StatusCode::FOUND,
            content_type: None,
            location: Some(location),
            body: Cow::Borrowed(&[]),
        }
    }

    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type", content_type));
        }
        if let Some(location) = self.location {
            headers.push(("Location", location));
        }
        headers
    }
}

pub struct Route {
    pub path: &'static str,
    pub respond: fn() -> Response,
}

fn index() -> Response {
    Response::new(StatusCode::OK, TEXT_HTML, html::index_html())
}

// 系统联网检测请求一律重定向到配网页，触发手机弹出 Captive Portal
fn to_portal() -> Response {
    Response::redirect(PORTAL_URL)
}

pub static GET_ROUTES: &[Route] = &[
    Route { path: "/", respond: index },
    // Android
    Route { path: "/generate_204", respond: to_portal },
    Route { path: "/gen_204", respond: to_portal },
    // iOS/macOS
    Route { path: "/hotspot-detect.html", respond: to_portal },
    Route { path: "/library/test/success.html", respond: to_portal },
    // Windows
    Route { path: "/connecttest.txt", respond: to_portal },
    Route { path: "/ncsi.txt", respond: to_portal },
    Route { path: "/redirect", respond: to_portal },
];

pub fn route(method: &Method, path: &str) -> Option<Response> {
    if *method != Method::GET {
        return None;
    }
    // 忽略查询字符串
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    GET_ROUTES
        .iter()
        .find(|route| route.path == path)
        .map(|route| (route.respond)())
}

pub struct Outcome {
    pub response: Response,
    pub saved: Option<Credentials>,
}

/// 处理 `POST /configure`
pub fn configure<S: CredentialStore>(body: &[u8], store: &mut S) -> Outcome {
    let credentials = match Credentials::from_form(body) {
        Ok(credentials) => credentials,
        Err(e) => {
            log::warn!("Rejected configure request: {}", e);
            let status = match e {
                FormError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                FormError::NotUtf8 | FormError::MissingField(_) => StatusCode::BAD_REQUEST,
            };
            return Outcome {
                response: Response::new(status, TEXT_PLAIN, e.to_string().into_bytes()),
                saved: None,
            };
        }
    };

    log::info!("Received config: {:?}", credentials);

    if let Err(e) = store.save(&credentials) {
        log::error!("Failed to save credentials: {:?}", e);
        return Outcome {
            response: Response::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                TEXT_PLAIN,
                &b"failed to save configuration"[..],
            ),
            saved: None,
        };
    }

    Outcome {
        response: Response::new(StatusCode::OK, TEXT_HTML, html::SAVED_HTML.as_bytes()),
        saved: Some(credentials),
    }
}

#[derive(Serialize)]
struct Status<'a> {
    version: &'a str,
    configured: bool,
    ssid: Option<&'a str>,
}

/// 处理 `GET /api/status`，不返回密码
pub fn status<S: CredentialStore>(store: &S) -> Response {
    let saved = store
        .load()
        .map_err(|e| log::error!("Failed to load credentials: {:?}", e))
        .ok()
        .flatten();

    let status = Status {
        version: env!("CARGO_PKG_VERSION"),
        configured: saved.is_some(),
        ssid: saved.as_ref().map(|c| c.ssid.as_str()),
    };

    match serde_json::to_vec(&status) {
        Ok(json) => Response::new(StatusCode::OK, APPLICATION_JSON, json),
        Err(e) => {
            log::error!("Failed to encode status: {}", e);
            Response::new(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, &b"status unavailable"[..])
        }
    }
}

/// 路由未命中时的响应
pub fn not_found() -> Response {
    Response::new(StatusCode::NOT_FOUND, TEXT_PLAIN, &b"not found"[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captive_portal::store::MemoryStore;

    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        type Error = &'static str;

        fn load(&self) -> Result<Option<Credentials>, Self::Error> {
            Err("flash unavailable")
        }

        fn save(&mut self, _: &Credentials) -> Result<(), Self::Error> {
            Err("flash unavailable")
        }
    }

    #[test]
    fn root_serves_page_verbatim() {
        for _ in 0..3 {
            let resp = route(&Method::GET, "/").unwrap();
            assert_eq!(resp.status, StatusCode::OK);
            assert_eq!(resp.headers(), vec![("Content-Type", "text/html")]);
            assert_eq!(&*resp.body, html::INDEX_HTML.as_bytes());
        }
    }

    #[test]
    fn root_ignores_query_string() {
        let resp = route(&Method::GET, "/?lang=en").unwrap();
        assert_eq!(&*resp.body, html::index_html());
    }

    #[test]
    fn probes_redirect_to_portal() {
        for path in ["/generate_204", "/hotspot-detect.html", "/connecttest.txt"] {
            let resp = route(&Method::GET, path).unwrap();
            assert_eq!(resp.status, StatusCode::FOUND);
            assert_eq!(resp.headers(), vec![("Location", "http://192.168.4.1/")]);
            assert!(resp.body.is_empty());
        }
    }

    #[test]
    fn unknown_routes_and_methods_miss() {
        assert!(route(&Method::GET, "/favicon.ico").is_none());
        assert!(route(&Method::POST, "/").is_none());
        assert_eq!(not_found().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn configure_saves_and_confirms() {
        let mut store = MemoryStore::new();
        let outcome = configure(b"ssid=lab&password=secret", &mut store);

        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(&*outcome.response.body, html::SAVED_HTML.as_bytes());
        let expected = Credentials {
            ssid: "lab".into(),
            password: "secret".into(),
        };
        assert_eq!(outcome.saved.as_ref(), Some(&expected));
        assert_eq!(store.load().unwrap(), Some(expected));
    }

    #[test]
    fn configure_rejects_bad_forms() {
        let mut store = MemoryStore::new();

        let outcome = configure(b"ssid=lab", &mut store);
        assert_eq!(outcome.response.status, StatusCode::BAD_REQUEST);
        assert_eq!(&*outcome.response.body, b"missing form field `password`");
        assert!(outcome.saved.is_none());

        // 设备端截断到 BODY_READ_LIMIT 的请求体与完整的超长请求体得到同样的回复
        let truncated = configure(&[b'x'; BODY_READ_LIMIT], &mut store);
        let full = configure(&vec![b'x'; 8 * BODY_READ_LIMIT], &mut store);
        for outcome in [&truncated, &full] {
            assert_eq!(outcome.response.status, StatusCode::PAYLOAD_TOO_LARGE);
            assert_eq!(&*outcome.response.body, b"form body exceeds 1024 bytes");
        }

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn configure_reports_store_failure() {
        let outcome = configure(b"ssid=lab&password=secret", &mut BrokenStore);
        assert_eq!(outcome.response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(outcome.saved.is_none());
    }

    #[test]
    fn status_never_leaks_password() {
        let mut store = MemoryStore::new();
        let resp = status(&store);
        let json: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(json["configured"], false);
        assert!(json["ssid"].is_null());

        configure(b"ssid=lab&password=secret", &mut store);
        let resp = status(&store);
        assert_eq!(resp.content_type, Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(json["configured"], true);
        assert_eq!(json["ssid"], "lab");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(!String::from_utf8_lossy(&resp.body).contains("secret"));
    }

    #[test]
    fn status_survives_store_failure() {
        let resp = status(&BrokenStore);
        assert_eq!(resp.status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(json["configured"], false);
    }
}
