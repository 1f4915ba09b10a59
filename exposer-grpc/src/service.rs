//! The `Exposer` gRPC service (§4.4): the four operations wired onto
//! [`exposer_core::Registry`]/[`exposer_core::Authenticator`].
//!
//! A member name alone is not enough to resolve a DATUM vs. a zero-parameter
//! CALLABLE distinctly in every case, so each handler below follows the
//! per-operation resolution rules spelled out in §4.4 rather than sharing
//! one generic "resolve and dispatch" path: `InvokeCallable` passes the
//! request's `parameterTypeNames` through to `resolve` for overload pinning;
//! `WriteDatum` resolves with no parameter types and rejects a CALLABLE
//! target before authenticating.

use std::pin::Pin;
use std::sync::Arc;

use exposer_core::{dispatcher, Authenticator, MemberKind, Registry};
use futures_core::Stream;
use tokio_stream::StreamExt;
use tonic::{Request, Response, Status, Streaming};

use crate::interceptor::extract_credentials;
use crate::pb::exposer_server::Exposer;
use crate::pb::{
    DescribeRequest, DescribeResponse, InvokeRequest, InvokeResponse, WriteRequest, WriteResponse,
};
use crate::status::to_status;
use crate::wire::{from_wire, member_info, to_wire};

/// The `Exposer` service implementation (§4.4).
pub struct ExposerService {
    registry: Arc<Registry>,
    authenticator: Arc<Authenticator>,
}

impl ExposerService {
    pub fn new(registry: Arc<Registry>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            registry,
            authenticator,
        }
    }
}

#[tonic::async_trait]
impl Exposer for ExposerService {
    async fn invoke_callable(
        &self,
        request: Request<InvokeRequest>,
    ) -> Result<Response<InvokeResponse>, Status> {
        let credentials = extract_credentials(request.metadata());
        let request = request.into_inner();

        let parameter_type_names: Vec<&str> =
            request.parameter_type_names.iter().map(String::as_str).collect();
        let resolution = self
            .registry
            .resolve(&request.container_name, &request.member_name, &parameter_type_names)
            .map_err(to_status)?;

        let member = match &resolution {
            exposer_core::Resolution::Found(m) => m.clone(),
            exposer_core::Resolution::Ambiguous(candidates) => candidates
                .first()
                .cloned()
                .ok_or_else(|| Status::invalid_argument("ambiguous invocation with no candidates"))?,
        };

        self.authenticator
            .authenticate(&member, &credentials)
            .await
            .map_err(to_status)?;

        let args: Vec<exposer_core::DynamicValue> =
            request.arguments.into_iter().map(from_wire).collect();
        let result = dispatcher::invoke(resolution, args).await.map_err(to_status)?;

        Ok(Response::new(InvokeResponse {
            result: Some(to_wire(&result)),
        }))
    }

    async fn write_datum(
        &self,
        request: Request<WriteRequest>,
    ) -> Result<Response<WriteResponse>, Status> {
        let credentials = extract_credentials(request.metadata());
        let request = request.into_inner();

        let resolution = self
            .registry
            .resolve(&request.container_name, &request.datum_name, &[])
            .map_err(to_status)?;
        let member = match resolution {
            exposer_core::Resolution::Found(m) => m,
            exposer_core::Resolution::Ambiguous(_) => {
                return Err(Status::invalid_argument("write target resolved ambiguously"))
            }
        };

        if member.kind != MemberKind::Datum {
            return Err(to_status(exposer_core::DispatchError::WrongKindForWrite));
        }

        self.authenticator
            .authenticate(&member, &credentials)
            .await
            .map_err(to_status)?;

        let value = from_wire(request.value.unwrap_or(crate::pb::DynamicValue { kind: None }));
        let previous = dispatcher::write(&member, value).map_err(to_status)?;

        Ok(Response::new(WriteResponse {
            previous_value: Some(to_wire(&previous)),
        }))
    }

    async fn describe_all(
        &self,
        _request: Request<DescribeRequest>,
    ) -> Result<Response<DescribeResponse>, Status> {
        let members = exposer_core::describe_all(&self.registry)
            .iter()
            .map(member_info)
            .collect();
        Ok(Response::new(DescribeResponse { members }))
    }

    type InvokeCallableStreamStream =
        Pin<Box<dyn Stream<Item = Result<InvokeResponse, Status>> + Send + 'static>>;

    /// Bidi streaming (§4.4): credentials are read once at stream open and
    /// reused for every inbound message (§9 open question 2 — documented
    /// as-is, no per-message refresh). A per-message error is emitted on the
    /// stream without tearing it down; a fatal error (failure to read the
    /// next inbound message) ends the stream.
    async fn invoke_callable_stream(
        &self,
        request: Request<Streaming<InvokeRequest>>,
    ) -> Result<Response<Self::InvokeCallableStreamStream>, Status> {
        let credentials = extract_credentials(request.metadata());
        let mut inbound = request.into_inner();
        let registry = Arc::clone(&self.registry);
        let authenticator = Arc::clone(&self.authenticator);

        let outbound = async_stream::try_stream! {
            while let Some(next) = inbound.next().await {
                let request = next?;
                let parameter_type_names: Vec<&str> =
                    request.parameter_type_names.iter().map(String::as_str).collect();

                let resolved = registry.resolve(
                    &request.container_name,
                    &request.member_name,
                    &parameter_type_names,
                );
                let resolution = match resolved {
                    Ok(resolution) => resolution,
                    Err(err) => {
                        yield InvokeResponse { result: Some(to_wire(&serde_json::json!({"error": err.to_string()}))) };
                        continue;
                    }
                };

                let member = match &resolution {
                    exposer_core::Resolution::Found(m) => m.clone(),
                    exposer_core::Resolution::Ambiguous(candidates) => match candidates.first() {
                        Some(m) => m.clone(),
                        None => {
                            yield InvokeResponse { result: Some(to_wire(&serde_json::json!({"error": "ambiguous invocation with no candidates"}))) };
                            continue;
                        }
                    },
                };

                if let Err(err) = authenticator.authenticate(&member, &credentials).await {
                    yield InvokeResponse { result: Some(to_wire(&serde_json::json!({"error": err.to_string()}))) };
                    continue;
                }

                let args: Vec<exposer_core::DynamicValue> =
                    request.arguments.into_iter().map(from_wire).collect();
                match dispatcher::invoke(resolution, args).await {
                    Ok(result) => yield InvokeResponse { result: Some(to_wire(&result)) },
                    Err(err) => yield InvokeResponse { result: Some(to_wire(&serde_json::json!({"error": err.to_string()}))) },
                }
            }
        };

        Ok(Response::new(Box::pin(outbound)))
    }
}
