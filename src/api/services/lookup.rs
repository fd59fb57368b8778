use std::borrow::Cow;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use tracing::trace;

use crate::errors::{IpGeoError, Result};
use crate::pipeline::{InputSource, LookupPipeline};

/// 响应头策略，启动时构造一次
#[derive(Debug, Clone)]
pub struct HttpPolicy {
    /// `Access-Control-Allow-Origin`，`None` 表示不发送
    pub origin: Option<HeaderValue>,
    /// `Last-Modified`（仅成功响应）
    pub last_modified: Option<HeaderValue>,
    pub input: InputSource,
}

impl HttpPolicy {
    /// 空的 `origin_policy` 表示不发送 CORS 头
    pub fn new(
        origin_policy: &str,
        last_modified: Option<DateTime<Utc>>,
        input: InputSource,
    ) -> Result<Self> {
        let origin = if origin_policy.is_empty() {
            None
        } else {
            Some(HeaderValue::from_str(origin_policy).map_err(|e| {
                IpGeoError::config(format!(
                    "invalid origin policy '{}': {}",
                    origin_policy, e
                ))
            })?)
        };

        let last_modified = last_modified
            .map(|t| HeaderValue::from_str(&http_date(t)))
            .transpose()
            .map_err(|e| IpGeoError::config(format!("invalid Last-Modified value: {}", e)))?;

        Ok(Self {
            origin,
            last_modified,
            input,
        })
    }
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            origin: Some(HeaderValue::from_static("*")),
            last_modified: None,
            input: InputSource::Query,
        }
    }
}

/// RFC 7231 HTTP-date
pub fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub struct LookupService;

impl LookupService {
    pub async fn handle_lookup(
        req: HttpRequest,
        pipeline: web::Data<Arc<LookupPipeline>>,
        policy: web::Data<HttpPolicy>,
    ) -> HttpResponse {
        let ip_text = Self::extract_ip_text(&req, policy.input);

        let mut builder = HttpResponse::build(StatusCode::OK);
        builder.insert_header(header::ContentType::json());
        if let Some(ref origin) = policy.origin {
            builder.insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone()));
        }

        match pipeline.handle(&ip_text) {
            Ok(body) => {
                if let Some(ref last_modified) = policy.last_modified {
                    builder.insert_header((header::LAST_MODIFIED, last_modified.clone()));
                }
                builder.body(body)
            }
            Err(e) => {
                trace!("Lookup for {:?} failed: {}", ip_text, e);
                let status =
                    StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                builder.status(status);
                builder.body(e.to_json(policy.input))
            }
        }
    }

    /// 取出请求中的 IP 文本，缺失时返回空串
    fn extract_ip_text(req: &HttpRequest, input: InputSource) -> Cow<'_, str> {
        match input {
            InputSource::Query => {
                Self::extract_query_param(req.query_string(), "ip").unwrap_or(Cow::Borrowed(""))
            }
            InputSource::Path => {
                let path = req.path();
                let path = path.strip_prefix('/').unwrap_or(path);
                urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
            }
        }
    }

    /// 从 query string 提取指定参数值
    #[inline]
    fn extract_query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
        for part in query.split('&') {
            if let Some(value) = part.strip_prefix(key).and_then(|s| s.strip_prefix('=')) {
                // urlencoding::decode 返回 Cow，未编码时零分配
                return urlencoding::decode(value).ok();
            }
        }
        None
    }
}

pub fn lookup_routes() -> actix_web::Scope {
    web::scope("")
        .route("/{path}*", web::get().to(LookupService::handle_lookup))
        .route("/{path}*", web::head().to(LookupService::handle_lookup))
}
