/// Access gate middleware
///
/// Guards a scope or resource with a fixed `AuthPolicy` and stores the
/// resulting `Authorized` in request extensions, where handlers pick it up
/// through `web::ReqData<Authorized>`. Policies that depend on the request
/// target (`SelfOnly`, `MemberOf`) are checked inside the handler instead.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{AccessGate, AuthPolicy};
use crate::middleware::authorize::authorize;

pub struct GateMiddleware {
    gate: AccessGate,
    policy: Rc<AuthPolicy>,
}

impl GateMiddleware {
    pub fn new(gate: AccessGate, policy: AuthPolicy) -> Self {
        Self {
            gate,
            policy: Rc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GateMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = GateMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(GateMiddlewareService {
            service: Rc::new(service),
            gate: self.gate.clone(),
            policy: self.policy.clone(),
        }))
    }
}

pub struct GateMiddlewareService<S> {
    service: Rc<S>,
    gate: AccessGate,
    policy: Rc<AuthPolicy>,
}

impl<S, B> Service<ServiceRequest> for GateMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authorize(req.request(), &self.gate, &self.policy) {
            Ok(authorized) => {
                req.extensions_mut().insert(authorized);
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err::<ServiceResponse<B>, Error>(e.into()) }),
        }
    }
}
