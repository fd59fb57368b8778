//! Request logging middleware
//!
//! Logs remote address, method, URI, status and latency of every request.
//! Enabled with `--verbose`; adds noticeable overhead at high request rates.

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::info;

/// Access log middleware factory
#[derive(Clone, Default)]
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessLogService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogService {
            service: Rc::new(service),
        }))
    }
}

pub struct AccessLogService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AccessLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let start = Instant::now();

        let remote = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "-".to_string());
        let method = req.method().clone();
        let uri = req.uri().to_string();

        Box::pin(async move {
            let result = srv.call(req).await;
            let status = match &result {
                Ok(response) => response.status().as_u16(),
                Err(_) => 500,
            };

            info!(
                target: "ipgeo::access",
                "{} {} {} {} {:.3}ms",
                remote,
                method,
                uri,
                status,
                start.elapsed().as_secs_f64() * 1000.0
            );

            result
        })
    }
}
