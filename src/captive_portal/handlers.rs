//! HTTP 路由处理器

use std::sync::{Arc, Mutex};

use esp_idf_svc::{
    http::{
        server::{EspHttpConnection, EspHttpServer, Request},
        Method,
    },
    io::{Read, Write},
    nvs::EspDefaultNvs,
};
use tokio::sync::mpsc;

use super::routes::{self, Response, BODY_READ_LIMIT};
use super::store::NvsStore;
use super::{html, PortalEvent};

type Store = Arc<Mutex<NvsStore<EspDefaultNvs>>>;

/// 注册所有 HTTP 路由
pub fn register_routes(
    server: &mut EspHttpServer<'_>,
    store: Store,
    events: mpsc::Sender<PortalEvent>,
) -> anyhow::Result<()> {
    // 主页和各系统的 Captive Portal 检测端点
    for route in routes::GET_ROUTES {
        server.fn_handler::<anyhow::Error, _>(route.path, Method::Get, move |req| {
            send(req, &(route.respond)())
        })?;
    }

    // 设备状态 API
    let store_status = store.clone();
    server.fn_handler::<anyhow::Error, _>("/api/status", Method::Get, move |req| {
        let resp = {
            let store = store_status
                .lock()
                .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
            routes::status(&*store)
        };
        send(req, &resp)
    })?;

    // 表单提交
    server.fn_handler::<anyhow::Error, _>(html::FORM_ACTION, Method::Post, move |req| {
        handle_configure(req, &store, &events)
    })?;

    Ok(())
}

fn send(req: Request<&mut EspHttpConnection<'_>>, resp: &Response) -> anyhow::Result<()> {
    let mut out = req.into_response(
        resp.status.as_u16(),
        resp.status.canonical_reason(),
        &resp.headers(),
    )?;
    out.write_all(&resp.body)?;
    Ok(())
}

fn handle_configure(
    mut req: Request<&mut EspHttpConnection<'_>>,
    store: &Store,
    events: &mpsc::Sender<PortalEvent>,
) -> anyhow::Result<()> {
    let body = read_body(&mut req)?;

    let outcome = {
        let mut store = store
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        routes::configure(&body, &mut *store)
    };

    send(req, &outcome.response)?;

    if let Some(credentials) = outcome.saved {
        if let Err(e) = events.try_send(PortalEvent::Configured(credentials)) {
            log::error!("Failed to send configured event: {}", e);
        }
    }

    Ok(())
}

// 最多读取 BODY_READ_LIMIT 字节，剩余部分不再读取；routes::configure 只判定是否超长
fn read_body(req: &mut Request<&mut EspHttpConnection<'_>>) -> anyhow::Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut buf = [0u8; 256];
    while body.len() < BODY_READ_LIMIT {
        let len = req.read(&mut buf)?;
        if len == 0 {
            break;
        }
        body.extend_from_slice(&buf[..len]);
    }
    body.truncate(BODY_READ_LIMIT);
    Ok(body)
}
